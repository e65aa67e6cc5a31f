//! Configuration loading for the hunter server.
//! Reads hunter.toml from the current directory or path in HUNTER_CONFIG env var.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub design: DesignConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3003 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Root of the Protein-Hunter checkout (contains boltz_ph/ and chai_ph/).
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
    #[serde(default = "default_gpu_id")]
    pub gpu_id: u32,
    #[serde(default = "default_python")]
    pub python: String,
    /// Chai output roots probed in order. Which layout a given
    /// Protein-Hunter build writes is still unconfirmed upstream, so the
    /// list stays configurable.
    #[serde(default = "default_chai_result_dirs")]
    pub chai_result_dirs: Vec<String>,
}

fn default_install_dir() -> PathBuf { PathBuf::from("Protein-Hunter") }
fn default_gpu_id() -> u32 { 0 }
fn default_python() -> String { "python".to_string() }
fn default_chai_result_dirs() -> Vec<String> {
    vec!["results_chai".to_string(), "outputs".to_string()]
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            gpu_id: default_gpu_id(),
            python: default_python(),
            chai_result_dirs: default_chai_result_dirs(),
        }
    }
}

mod tests;

impl Config {
    /// Load configuration from hunter.toml.
    /// Checks HUNTER_CONFIG env var first, then the current directory;
    /// a missing file yields the defaults. HUNTER_HOST, HUNTER_PORT and
    /// GPU_ID env vars override their file counterparts.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("HUNTER_CONFIG").unwrap_or_else(|_| "hunter.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("No config file at {path}, using defaults");
            Self::default()
        };

        if let Ok(host) = std::env::var("HUNTER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("HUNTER_PORT") {
            config.server.port = port.parse()?;
        }
        if let Ok(gpu_id) = std::env::var("GPU_ID") {
            config.design.gpu_id = gpu_id.parse()?;
        }

        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
