//! Container CLI reference and command dispatch
//!
//! [`DockerRef`] is the single chokepoint every subcommand builder funnels
//! through. It resolves the CLI executable (once), applies dry run and
//! privilege elevation policy, and hands the final command line to a
//! [`ProcessLauncher`].

use crate::config::ToolConfig;
use crate::dry_run::DryRunResult;
use crate::errors::{DockerError, Result};
use crate::privilege::Elevation;
use crate::process::{LaunchRequest, ProcessLauncher, StdinMode, TokioLauncher};
use once_cell::sync::OnceCell;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const REDACTED: &str = "********";

/// Reference to a container CLI (Docker by default).
///
/// Cheap to clone; clones share the resolved executable path and the
/// elevation decision.
#[derive(Debug, Clone)]
pub struct DockerRef {
    program: String,
    dry_run: bool,
    exe_path: Arc<OnceCell<PathBuf>>,
    elevation: Elevation,
    launcher: Arc<dyn ProcessLauncher>,
}

impl Default for DockerRef {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

impl DockerRef {
    /// Reference the `docker` CLI with default settings
    pub fn docker() -> Self {
        Self::default()
    }

    /// Reference a CLI by program name or path, keeping other defaults
    pub fn new(program: impl Into<String>) -> Self {
        Self::from_config(&ToolConfig {
            program: program.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            program: config.program.clone(),
            dry_run: config.dry_run,
            exe_path: Arc::new(OnceCell::new()),
            elevation: Elevation::new(config.elevation, config.admin_group.clone()),
            launcher: Arc::new(TokioLauncher),
        }
    }

    /// Enable dry run mode for every command dispatched through this reference
    pub fn dry(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Replace the elevation policy
    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    /// Replace the process launcher
    pub fn with_launcher(mut self, launcher: Arc<dyn ProcessLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Program name as configured, e.g. `docker`
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn elevation(&self) -> &Elevation {
        &self.elevation
    }

    /// Name shown in dry run renderings: the file name of the configured
    /// program, so `/usr/local/bin/docker` still renders as `docker`.
    pub fn display_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }

    /// Locate the CLI executable on the search path.
    ///
    /// The first successful lookup is cached for the lifetime of this
    /// reference and its clones. Concurrent first lookups are harmless; one
    /// result wins.
    pub fn executable(&self) -> Result<&Path> {
        self.exe_path
            .get_or_try_init(|| {
                let path = which::which(&self.program).map_err(|e| {
                    debug!("Container CLI '{}' not found: {}", self.program, e);
                    DockerError::ToolNotFound {
                        program: self.program.clone(),
                    }
                })?;
                debug!("Resolved container CLI '{}' to {}", self.program, path.display());
                Ok(path)
            })
            .map(PathBuf::as_path)
    }

    /// Prepare an arbitrary CLI invocation. All builders use this.
    pub fn command<I, S>(&self, args: I) -> DockerCommand<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DockerCommand {
            docker: self,
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            stdin: StdinMode::Inherit,
        }
    }
}

/// One prepared invocation of the container CLI
#[derive(Debug, Clone)]
pub struct DockerCommand<'a> {
    docker: &'a DockerRef,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: StdinMode,
}

impl<'a> DockerCommand<'a> {
    /// Run the CLI from `dir` instead of the caller's working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, mode: StdinMode) -> Self {
        self.stdin = mode;
        self
    }

    /// Tool-level arguments, without executable or elevation prefix
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn stdin_mode(&self) -> StdinMode {
        self.stdin
    }

    /// Resolve the full command line: elevation token (if any), executable
    /// path, then the tool arguments.
    pub fn launch_request(&self) -> Result<LaunchRequest> {
        let exe = self.docker.executable()?;
        let mut argv: Vec<OsString> = Vec::with_capacity(self.args.len() + 2);
        if let Some(token) = self.docker.elevation.prefix() {
            argv.push(token.into());
        }
        argv.push(exe.as_os_str().to_owned());
        argv.extend(self.args.iter().map(OsString::from));
        Ok(LaunchRequest {
            argv,
            cwd: self.cwd.clone(),
            stdin: self.stdin,
        })
    }

    /// Execute the command.
    ///
    /// In dry run mode this always fails with [`DockerError::DryRun`]. A
    /// cancellation that has already fired is reported before anything else
    /// happens, so no process is started for an abandoned operation.
    #[instrument(skip(self, cancel), fields(program = %self.docker.program))]
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(DockerError::Cancelled);
        }
        if self.docker.dry_run {
            debug!(args = ?redact(&self.args), "Dry run, not executing");
            return Err(DryRunResult::new(self.docker.display_name(), self.args.clone()).into());
        }

        let request = self.launch_request()?;
        let prefix_len = request.argv.len() - self.args.len();
        debug!(
            prefix = ?&request.argv_lossy()[..prefix_len],
            args = ?redact(&self.args),
            cwd = ?request.cwd,
            "Executing container CLI command"
        );
        self.docker.launcher.launch(request, cancel).await
    }
}

/// Hide the value following `-p` in a `login` invocation
fn redact(args: &[String]) -> Vec<String> {
    let is_login = args.first().map(String::as_str) == Some("login");
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            out.push(REDACTED.to_string());
            hide_next = false;
            continue;
        }
        if is_login && (arg == "-p" || arg == "--password") {
            hide_next = true;
        }
        out.push(arg.clone());
    }
    out
}

/// Shared execution surface of every subcommand builder.
///
/// Implementors only lower their configuration into an argument vector;
/// dispatch is common.
#[allow(async_fn_in_trait)]
pub trait Subcommand {
    /// The CLI reference this builder dispatches through
    fn docker(&self) -> &DockerRef;

    /// Lower the configuration into the ordered argument vector, surfacing
    /// any error deferred during configuration.
    fn args(&self) -> Result<Vec<String>>;

    /// The prepared invocation for this configuration
    fn command(&self) -> Result<DockerCommand<'_>> {
        Ok(self.docker().command(self.args()?))
    }

    /// Validate, lower and execute
    async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        self.command()?.run(cancel).await
    }
}
