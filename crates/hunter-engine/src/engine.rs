//! The shared orchestration pipeline for external design jobs.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use hunter_common::{HunterError, Result};

use crate::backend::{DesignBackend, MarkerState};
use crate::gate::DesignGate;
use crate::progress::ProgressMeter;
use crate::progress::ProgressSink;

/// Drives one design family end to end: command construction, gated
/// spawn, progress streaming, exit handling, and artifact recovery.
pub struct DesignEngine<B: DesignBackend> {
    backend: B,
    install_dir: PathBuf,
    python: String,
    gate: DesignGate,
}

impl<B: DesignBackend> DesignEngine<B> {
    pub fn new(backend: B, install_dir: impl Into<PathBuf>, gate: DesignGate) -> Self {
        Self {
            backend,
            install_dir: install_dir.into(),
            python: "python".to_string(),
            gate,
        }
    }

    /// Override the interpreter used to launch the design scripts.
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn install_dir(&self) -> &std::path::Path {
        &self.install_dir
    }

    /// Run one design job to completion.
    ///
    /// Progress pairs go to `sink` while the process runs; the final
    /// `total/total` report is sent unconditionally after exit. Holds the
    /// global gate from before the spawn until the artifact is resolved.
    pub async fn run(
        &self,
        request: &B::Request,
        sink: Option<&dyn ProgressSink>,
    ) -> Result<B::Artifacts> {
        // A missing install root is a deployment problem, not a job
        // failure: fail before the gate is ever touched.
        if !self.install_dir.exists() {
            return Err(HunterError::Config(format!(
                "Protein-Hunter directory not found at {}. Please ensure it's properly installed.",
                self.install_dir.display()
            )));
        }

        let script = self.install_dir.join(self.backend.script());
        let args = self.backend.args(request);
        let inner_units = self.backend.inner_units(request);
        let total_units = self.backend.total_units(request);

        // One design job at a time across both families; the guard drops
        // on every return path below.
        let _permit = self.gate.acquire().await;

        info!(
            family = self.backend.family(),
            total_units, "Starting design job"
        );
        let mut meter = ProgressMeter::new(sink, total_units);
        meter.report(0).await;

        let mut child = Command::new(&self.python)
            .arg(&script)
            .args(&args)
            .current_dir(&self.install_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("child stderr was not captured"))?;

        // Drain stderr on the side so a chatty process can never wedge on
        // a full pipe; the contents are only consulted on failure.
        let stderr_task = tokio::spawn(async move {
            let mut stderr = stderr;
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut state = MarkerState::default();
        while let Some(line) = lines.next_line().await? {
            if self.backend.observe_line(&line, &mut state) {
                meter.report(state.outer * inner_units + state.inner).await;
            }
        }

        let status = child.wait().await?;

        // Callers always get a definitive completion signal, even when
        // the marker grammar under-counted.
        meter.finish().await;

        let stderr_buf = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            warn!(family = self.backend.family(), code, "Design process failed");
            return Err(HunterError::ProcessFailed {
                code,
                stderr: String::from_utf8_lossy(&stderr_buf).to_string(),
            });
        }

        debug!(
            family = self.backend.family(),
            "Design process completed, resolving artifacts"
        );
        self.backend.resolve_artifacts(&self.install_dir, request)
    }
}
