//! Process launching
//!
//! The dispatcher hands a fully assembled command line to a
//! [`ProcessLauncher`]. The default [`TokioLauncher`] connects the child's
//! standard streams to ours and kills the child if the caller cancels.

use crate::errors::{DockerError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How the child's standard input is connected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdinMode {
    /// Share this process's standard input with the child
    #[default]
    Inherit,
    /// Give the child an empty standard input
    Null,
}

/// A fully resolved command line, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// The executable followed by its arguments
    pub argv: Vec<OsString>,
    /// Working directory for the child, if it differs from ours
    pub cwd: Option<PathBuf>,
    pub stdin: StdinMode,
}

impl LaunchRequest {
    /// Lossy string view of the command line, for logging and assertions
    pub fn argv_lossy(&self) -> Vec<String> {
        self.argv
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Spawns external processes on behalf of the dispatcher
#[async_trait]
pub trait ProcessLauncher: Send + Sync + std::fmt::Debug {
    /// Run the command to completion.
    ///
    /// Returns [`DockerError::Cancelled`] if `cancel` fires while the process
    /// runs, and [`DockerError::ExecFailed`] for a non-zero exit.
    async fn launch(&self, request: LaunchRequest, cancel: &CancellationToken) -> Result<()>;
}

/// Default launcher built on `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    async fn launch(&self, request: LaunchRequest, cancel: &CancellationToken) -> Result<()> {
        let (program, args) = request.argv.split_first().ok_or_else(|| {
            DockerError::spawn(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command line",
            ))
        })?;

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        match request.stdin {
            StdinMode::Inherit => command.stdin(Stdio::inherit()),
            StdinMode::Null => command.stdin(Stdio::null()),
        };
        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(DockerError::spawn)?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(DockerError::spawn)?;
                if status.success() {
                    Ok(())
                } else {
                    Err(DockerError::ExecFailed { code: status.code() })
                }
            }
            _ = cancel.cancelled() => {
                debug!("Cancellation requested, killing child process");
                // The child may already have exited; either way reap it.
                let _ = child.kill().await;
                Err(DockerError::Cancelled)
            }
        }
    }
}
