//! Core library for the stevedore container CLI wrapper
//!
//! Typed builders for `docker` (or any compatible CLI) invocations. Each
//! builder lowers its configuration into a fixed-order argument vector and
//! dispatches through a shared [`DockerRef`], which applies dry-run
//! interception, privilege elevation and cancellation.
//!
//! ```rust
//! use stevedore_core::{DockerRef, Subcommand};
//!
//! let docker = DockerRef::docker().dry();
//! let args = docker.run("nginx:latest").detached().publish_port(8080, 80).args().unwrap();
//! assert_eq!(args, ["run", "-d", "-p", "8080:80", "nginx:latest"]);
//! ```

pub mod build;
pub mod config;
pub mod docker;
pub mod dry_run;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod login;
pub mod management;
pub mod paths;
pub mod privilege;
pub mod process;
pub mod run;

pub use config::{ElevationMode, ToolConfig};
pub use docker::{DockerCommand, DockerRef, Subcommand};
pub use dry_run::DryRunResult;
pub use errors::{DockerError, Result};
pub use exec::ExecMode;
pub use login::PasswordSource;
pub use privilege::Elevation;
pub use process::{LaunchRequest, ProcessLauncher, StdinMode, TokioLauncher};
pub use run::{ExitBehavior, RestartPolicy};

/// Get the version of the core library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
