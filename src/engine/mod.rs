//! Engine bootstrap
//!
//! The proxy engine is an external collaborator. This module defines the
//! hand-off seam and a process-backed implementation that feeds the rendered
//! configuration to an engine binary over stdin.

pub mod document;

use std::process::Stdio;
use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

use crate::common::{AdapterError, Result};
use crate::config::defaults::{ENGINE_ARGS, ENGINE_BIN};
use crate::synth::SynthesizedConfig;

/// A proxy engine that runs a synthesized configuration
#[allow(async_fn_in_trait)]
pub trait Engine {
    /// Load `config` and start serving
    async fn start(&mut self, config: &SynthesizedConfig) -> Result<()>;

    /// Resolve when the engine stops on its own
    ///
    /// Returns an error if it stopped because of a failure.
    async fn wait(&mut self) -> Result<()>;

    /// Stop the engine
    async fn close(&mut self) -> Result<()>;
}

/// Engine running as a child process
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl ProcessEngine {
    /// Create an engine running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Command line this engine runs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::new(ENGINE_BIN, ENGINE_ARGS.iter().map(|s| s.to_string()).collect())
    }
}

impl Engine for ProcessEngine {
    async fn start(&mut self, config: &SynthesizedConfig) -> Result<()> {
        let document = serde_json::to_vec_pretty(&document::render(config))?;
        debug!("Engine document:\n{}", String::from_utf8_lossy(&document));

        info!("Starting engine: {}", self.command_line());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AdapterError::Engine(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AdapterError::Engine("engine stdin is not available".to_string()))?;

        // Closing stdin marks the end of the document.
        let written = async {
            stdin.write_all(&document).await?;
            stdin.shutdown().await
        }
        .await;
        drop(stdin);

        if let Err(e) = written {
            let _ = child.kill().await;
            return Err(AdapterError::Engine(format!(
                "failed to hand configuration to {}: {}",
                self.program, e
            )));
        }

        self.child = Some(child);
        Ok(())
    }

    async fn wait(&mut self) -> Result<()> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| AdapterError::Engine("engine is not running".to_string()))?;

        let status = child.wait().await?;
        self.child = None;

        if status.success() {
            info!("Engine exited");
            Ok(())
        } else {
            Err(AdapterError::Engine(format!("engine exited with {}", status)))
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            info!("Stopping engine");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop engine: {}", e);
                return Err(e.into());
            }
        }
        Ok(())
    }
}
