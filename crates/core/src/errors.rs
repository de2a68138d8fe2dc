//! Error types and handling
//!
//! Every builder and the dispatcher return [`DockerError`]. Errors are always
//! handed back to the immediate caller; nothing in this crate retries or
//! swallows them.
//!
//! A dry run is reported through the error channel as [`DockerError::DryRun`],
//! which carries the full argument vector for inspection.

use crate::dry_run::DryRunResult;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced while assembling or executing a container CLI invocation
#[derive(Error, Debug, Clone)]
pub enum DockerError {
    /// A required field was blank or invalid when the builder was executed
    #[error("missing required parameter: {message}")]
    MissingParameter { message: String },

    /// A host path could not be made absolute
    #[error("failed to get absolute path for '{path}': {reason}")]
    AbsolutePath { path: String, reason: String },

    /// The build file could not be expressed relative to the build context
    #[error("unable to make a relative path from '{context}' to '{build_file}'")]
    PathResolution { context: String, build_file: String },

    /// The container CLI executable could not be located on the search path
    #[error("unable to locate {program} executable, and this is not a dry run")]
    ToolNotFound { program: String },

    /// Login was asked to pass a password explicitly but none was supplied
    #[error("missing password for login to {host}")]
    MissingCredential { host: String },

    /// The caller's cancellation signal fired before or during execution
    #[error("operation cancelled")]
    Cancelled,

    /// The external process could not be started
    #[error("failed to start process: {0}")]
    Spawn(#[source] Arc<std::io::Error>),

    /// The external process exited unsuccessfully
    #[error("{}", exit_status_message(.code))]
    ExecFailed { code: Option<i32> },

    /// Tool configuration could not be loaded or parsed
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Dry run mode intercepted execution; carries what would have run
    #[error("{0}")]
    DryRun(DryRunResult),
}

impl DockerError {
    /// Build a [`DockerError::MissingParameter`] from any displayable message
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingParameter {
            message: message.into(),
        }
    }

    /// Wrap an I/O error raised while starting or waiting on a process
    pub fn spawn(err: std::io::Error) -> Self {
        Self::Spawn(Arc::new(err))
    }

    /// Returns the dry run outcome if this error is one
    pub fn dry_run(&self) -> Option<&DryRunResult> {
        match self {
            Self::DryRun(result) => Some(result),
            _ => None,
        }
    }

    /// Whether this error is a dry run outcome rather than a failure
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun(_))
    }

    /// Consume the error, yielding the dry run outcome if it is one
    pub fn into_dry_run(self) -> std::result::Result<DryRunResult, Self> {
        match self {
            Self::DryRun(result) => Ok(result),
            other => Err(other),
        }
    }
}

impl From<DryRunResult> for DockerError {
    fn from(result: DryRunResult) -> Self {
        Self::DryRun(result)
    }
}

fn exit_status_message(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("command exited with status {}", code),
        None => "command terminated by signal".to_string(),
    }
}

/// Convenience type alias for Results with DockerError
pub type Result<T> = std::result::Result<T, DockerError>;

/// Trim `value`, failing with [`DockerError::MissingParameter`] if nothing is left
pub(crate) fn required(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DockerError::missing(format!("missing {}", what)));
    }
    Ok(trimmed.to_string())
}
