//! hunterd — Protein design job server.
//! Entry point for the server binary.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hunter_engine::boltz::BoltzBackend;
use hunter_engine::chai::ChaiBackend;
use hunter_engine::{DesignEngine, DesignGate};
use hunter_server::{config, rpc, tools};

#[derive(Parser)]
#[command(name = "hunterd", about = "Protein design job server", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve requests over stdin/stdout.
    Stdio,
    /// Serve requests over HTTP.
    Http {
        /// Host to bind (overrides hunter.toml).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides hunter.toml).
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the stdio transport; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hunter_server=debug,hunter_engine=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Config::load()?;

    info!("hunterd starting up");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Design install dir: {} (GPU {})",
        config.design.install_dir.display(),
        config.design.gpu_id
    );

    let gate = DesignGate::new();
    let boltz = Arc::new(
        DesignEngine::new(BoltzBackend::new(), &config.design.install_dir, gate.clone())
            .with_python(&config.design.python),
    );
    let chai = Arc::new(
        DesignEngine::new(
            ChaiBackend::new(config.design.chai_result_dirs.clone()),
            &config.design.install_dir,
            gate.clone(),
        )
        .with_python(&config.design.python),
    );

    let registry = Arc::new(tools::build_default_registry(boltz, chai, config.design.gpu_id));

    match cli.command {
        Command::Stdio => rpc::stdio::serve(registry).await?,
        Command::Http { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let state = rpc::http::AppState { registry, gate };
            let router = rpc::http::build_router(state);

            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            info!("hunterd listening on http://{host}:{port}");
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
