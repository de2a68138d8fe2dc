use crate::commands;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stevedore_core::{DockerRef, ElevationMode, ToolConfig};
use tokio_util::sync::CancellationToken;

/// Log format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log level options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Informational messages and above
    Info,
    /// Debug messages and above
    Debug,
    /// All messages including trace
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// When to prefix invocations with sudo
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ElevationOption {
    /// Elevate unless the current user is in the CLI's admin group
    Auto,
    /// Never elevate
    Never,
    /// Always elevate
    Always,
}

impl From<ElevationOption> for ElevationMode {
    fn from(option: ElevationOption) -> Self {
        match option {
            ElevationOption::Auto => ElevationMode::Auto,
            ElevationOption::Never => ElevationMode::Never,
            ElevationOption::Always => ElevationMode::Always,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    about = "Typed front end for the docker CLI",
    long_about = "Typed front end for the docker CLI\n\nValidates arguments, assembles docker command lines in a fixed order, elevates with sudo when needed, and can print the command instead of running it.",
    color = clap::ColorChoice::Auto
)]
pub struct Cli {
    /// Print the docker command line instead of running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Container CLI to invoke (name or path, can be set via STEVEDORE_DOCKER env var)
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub docker: Option<String>,

    /// Privilege elevation policy (can be set via STEVEDORE_ELEVATION env var)
    #[arg(long, global = true, value_enum)]
    pub elevation: Option<ElevationOption>,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log format (text or json, defaults to text, can be set via STEVEDORE_LOG_FORMAT env var)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// Container CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build an image from a context directory
    Build {
        /// Image name and tag
        #[arg(short = 't', long = "tag", value_name = "IMAGE")]
        image: String,

        /// Build context directory
        #[arg(default_value = ".")]
        context: PathBuf,

        /// Alternate build file
        #[arg(short = 'f', long = "file", value_name = "PATH")]
        build_file: Option<PathBuf>,

        /// Build argument (KEY=VALUE, repeatable)
        #[arg(long = "build-arg", value_name = "KEY=VALUE", value_parser = commands::parse_key_val)]
        build_args: Vec<(String, String)>,

        /// Image label (KEY=VALUE, repeatable)
        #[arg(long = "label", value_name = "KEY=VALUE", value_parser = commands::parse_key_val)]
        labels: Vec<(String, String)>,

        /// Stamp the image with a buildTimestamp label
        #[arg(long)]
        timestamp: bool,
    },

    /// Run a container from an image
    Run {
        /// Container name
        #[arg(long)]
        name: Option<String>,

        /// Host name inside the container
        #[arg(long)]
        hostname: Option<String>,

        /// Working directory inside the container
        #[arg(short = 'w', long = "workdir", value_name = "PATH")]
        workdir: Option<String>,

        /// Run in the background
        #[arg(short = 'd', long)]
        detach: bool,

        /// Keep STDIN open and allocate a terminal
        #[arg(short = 'i', long = "interactive")]
        interactive: bool,

        /// Give extended privileges to the container
        #[arg(long)]
        privileged: bool,

        /// Mount the root file system read-only
        #[arg(long)]
        read_only: bool,

        /// Remove the container when it exits
        #[arg(long = "rm", conflicts_with_all = ["restart", "restart_retries"])]
        remove: bool,

        /// Restart policy (no, on-failure[:N], unless-stopped, always)
        #[arg(long, value_name = "POLICY")]
        restart: Option<String>,

        /// Restart on failure at most N times
        #[arg(long, value_name = "N", conflicts_with = "restart")]
        restart_retries: Option<u32>,

        /// Network to connect to
        #[arg(long)]
        network: Option<String>,

        /// Environment variable (KEY=VALUE, repeatable)
        #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = commands::parse_key_val)]
        env: Vec<(String, String)>,

        /// Published port (HOST:CONTAINER, repeatable)
        #[arg(short = 'p', long = "publish", value_name = "HOST:CONTAINER", value_parser = commands::parse_port)]
        ports: Vec<(u16, u16)>,

        /// Bind mount (HOST_PATH:CONTAINER_PATH, repeatable)
        #[arg(short = 'v', long = "volume", value_name = "HOST:CONTAINER", value_parser = commands::parse_mount)]
        volumes: Vec<(PathBuf, String)>,

        /// Image to run
        image: String,

        /// Command and arguments for the container
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Execute a command in a running container
    Exec {
        /// Run in the background
        #[arg(short = 'd', long, conflicts_with = "tty")]
        detach: bool,

        /// Allocate a terminal
        #[arg(short = 't', long)]
        tty: bool,

        /// Give extended privileges to the command
        #[arg(long)]
        privileged: bool,

        /// User to run as (USER or USER:GROUP)
        #[arg(short = 'u', long, value_name = "USER[:GROUP]")]
        user: Option<String>,

        /// Working directory inside the container
        #[arg(short = 'w', long = "workdir", value_name = "PATH")]
        workdir: Option<String>,

        /// Target container
        container: String,

        /// Command and arguments to execute
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Log in to a registry
    Login {
        /// Registry user name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Registry password. Without it the docker CLI prompts on standard input.
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Fail unless a password is supplied with --password
        #[arg(long)]
        require_password: bool,

        /// Registry host
        host: String,
    },

    /// Remove an image
    Rmi {
        /// Remove even if containers still use the image
        #[arg(short = 'f', long)]
        force: bool,

        image: String,
    },

    /// Remove a container
    Rm {
        /// Remove a running container
        #[arg(short = 'f', long)]
        force: bool,

        container: String,
    },

    /// Start a stopped container
    Start { container: String },

    /// Stop a running container
    Stop { container: String },

    /// Pull an image from its registry
    Pull { image: String },

    /// Tag an image with an additional name
    Tag { source: String, target: String },

    /// Push an image to its registry
    Push { image: String },
}

impl Cli {
    /// Resolve the tool configuration: defaults, then the --config file,
    /// then STEVEDORE_* variables, then command line flags.
    pub fn tool_config(&self) -> Result<ToolConfig> {
        let base = match &self.config {
            Some(path) => ToolConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => ToolConfig::default(),
        };
        let mut config = base.with_env()?;
        if let Some(program) = &self.docker {
            config.program = program.clone();
        }
        if let Some(elevation) = self.elevation {
            config.elevation = elevation.into();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        Ok(config)
    }

    pub async fn dispatch(self) -> Result<()> {
        let log_format = self.log_format.map(|format| match format {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        });
        let log_level = self.log_level.as_str();
        // Environment filters win over the flag's default.
        let filter = (std::env::var_os(stevedore_core::logging::ENV_LOG).is_none()
            && std::env::var_os("RUST_LOG").is_none())
        .then(|| format!("stevedore={},stevedore_core={}", log_level, log_level));
        stevedore_core::logging::init_with_filter(log_format, filter.as_deref())?;
        tracing::debug!("CLI initialized with log level: {}", log_level);

        let config = self.tool_config()?;
        tracing::debug!(?config, "Resolved tool configuration");
        let docker = DockerRef::from_config(&config);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Interrupt received, cancelling");
                trigger.cancel();
            }
        });

        let result = match self.command {
            Commands::Build {
                image,
                context,
                build_file,
                build_args,
                labels,
                timestamp,
            } => {
                let args = commands::build::BuildArgs {
                    image,
                    context,
                    build_file,
                    build_args,
                    labels,
                    timestamp,
                };
                commands::build::execute_build(&docker, args, &cancel).await
            }
            Commands::Run {
                name,
                hostname,
                workdir,
                detach,
                interactive,
                privileged,
                read_only,
                remove,
                restart,
                restart_retries,
                network,
                env,
                ports,
                volumes,
                image,
                args,
            } => {
                let args = commands::run::RunArgs {
                    image,
                    args,
                    name,
                    hostname,
                    workdir,
                    detach,
                    interactive,
                    privileged,
                    read_only,
                    remove,
                    restart,
                    restart_retries,
                    network,
                    env,
                    ports,
                    volumes,
                };
                commands::run::execute_run(&docker, args, &cancel).await
            }
            Commands::Exec {
                detach,
                tty,
                privileged,
                user,
                workdir,
                container,
                command,
            } => {
                let args = commands::exec::ExecArgs {
                    container,
                    command,
                    detach,
                    tty,
                    privileged,
                    user,
                    workdir,
                };
                commands::exec::execute_exec(&docker, args, &cancel).await
            }
            Commands::Login {
                username,
                password,
                require_password,
                host,
            } => {
                let args = commands::login::LoginArgs {
                    host,
                    username,
                    password,
                    require_password,
                };
                commands::login::execute_login(&docker, args, &cancel).await
            }
            Commands::Rmi { force, image } => {
                commands::manage::remove_image(&docker, &image, force, &cancel).await
            }
            Commands::Rm { force, container } => {
                commands::manage::remove_container(&docker, &container, force, &cancel).await
            }
            Commands::Start { container } => {
                commands::manage::start(&docker, &container, &cancel).await
            }
            Commands::Stop { container } => {
                commands::manage::stop(&docker, &container, &cancel).await
            }
            Commands::Pull { image } => commands::manage::pull(&docker, &image, &cancel).await,
            Commands::Tag { source, target } => {
                commands::manage::tag(&docker, &source, &target, &cancel).await
            }
            Commands::Push { image } => commands::manage::push(&docker, &image, &cancel).await,
        };

        commands::finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_global_flags_default_values() {
        let cli = Cli::parse_from(["stevedore", "pull", "alpine"]);
        assert!(!cli.dry_run);
        assert!(cli.docker.is_none());
        assert!(cli.elevation.is_none());
        assert!(cli.config.is_none());
        assert!(matches!(cli.log_level, LogLevel::Info));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "stevedore",
            "stop",
            "web",
            "--dry-run",
            "--docker",
            "podman",
            "--elevation",
            "never",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.docker.as_deref(), Some("podman"));
        assert_eq!(cli.elevation, Some(ElevationOption::Never));
    }

    #[test]
    fn test_run_trailing_args_keep_hyphens() {
        let cli = Cli::parse_from(["stevedore", "run", "-d", "alpine", "ls", "-la"]);
        match cli.command {
            Commands::Run {
                detach, image, args, ..
            } => {
                assert!(detach);
                assert_eq!(image, "alpine");
                assert_eq!(args, vec!["ls", "-la"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_flags_are_rejected() {
        assert!(Cli::try_parse_from(["stevedore", "run", "--rm", "--restart", "always", "img"]).is_err());
        assert!(Cli::try_parse_from(["stevedore", "exec", "-d", "-t", "c1", "sh"]).is_err());
        assert!(Cli::try_parse_from(["stevedore", "exec", "c1"]).is_err());
    }

    #[test]
    #[serial]
    fn test_flags_override_env_and_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("stevedore.toml");
        std::fs::write(&path, "program = \"nerdctl\"\nelevation = \"always\"\n").unwrap();
        std::env::set_var(stevedore_core::config::ENV_PROGRAM, "podman");

        let cli = Cli::parse_from([
            "stevedore",
            "--config",
            path.to_str().unwrap(),
            "--elevation",
            "never",
            "pull",
            "alpine",
        ]);
        let config = cli.tool_config();
        std::env::remove_var(stevedore_core::config::ENV_PROGRAM);
        let config = config.unwrap();

        assert_eq!(config.program, "podman");
        assert_eq!(config.elevation, ElevationMode::Never);
        assert!(!config.dry_run);
    }
}
