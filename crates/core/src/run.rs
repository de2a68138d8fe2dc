//! `docker run`
//!
//! Argument order is fixed:
//! `run [--name=] [-h host] [-w workdir] [-d] [-it] [--privileged] [--read-only]
//! [--rm | --restart=policy] [--network=] [-e k=v]... [-p host:container]...
//! [-v hostpath:containerpath]... <image> [args...]`

use crate::docker::{DockerRef, Subcommand};
use crate::errors::{required, DockerError, Result};
use crate::paths;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Restart policy for a running container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart. This is the default.
    #[default]
    Never,
    /// Restart when the container exits non-zero, optionally capped
    OnFailure { max_retries: Option<u32> },
    /// Restart until explicitly stopped
    UnlessStopped,
    /// Always restart
    Always,
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "no"),
            Self::OnFailure { max_retries: None } => write!(f, "on-failure"),
            Self::OnFailure {
                max_retries: Some(n),
            } => write!(f, "on-failure:{}", n),
            Self::UnlessStopped => write!(f, "unless-stopped"),
            Self::Always => write!(f, "always"),
        }
    }
}

impl FromStr for RestartPolicy {
    type Err = DockerError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || DockerError::missing(format!("unknown restart policy '{}'", s));
        match s {
            "no" => Ok(Self::Never),
            "on-failure" => Ok(Self::OnFailure { max_retries: None }),
            "unless-stopped" => Ok(Self::UnlessStopped),
            "always" => Ok(Self::Always),
            other => {
                let retries = other.strip_prefix("on-failure:").ok_or_else(unknown)?;
                match retries.parse::<u32>() {
                    Ok(n) if n >= 1 => Ok(Self::OnFailure {
                        max_retries: Some(n),
                    }),
                    _ => Err(unknown()),
                }
            }
        }
    }
}

fn invalid_retries(retries: u32) -> DockerError {
    DockerError::missing(format!("invalid retries '{}'", retries))
}

/// What happens when the container exits.
///
/// Removal and restarting are mutually exclusive, so they share one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitBehavior {
    Restart(RestartPolicy),
    Remove,
}

impl Default for ExitBehavior {
    fn default() -> Self {
        Self::Restart(RestartPolicy::Never)
    }
}

impl DockerRef {
    /// Run a container from `image`
    pub fn run(&self, image: &str) -> DockerRun<'_> {
        let mut run = DockerRun {
            docker: self,
            err: None,
            image: String::new(),
            args: Vec::new(),
            name: None,
            hostname: None,
            working_dir: None,
            network: None,
            detached: false,
            interactive: false,
            privileged: false,
            read_only: false,
            exit: ExitBehavior::default(),
            env: Vec::new(),
            ports: Vec::new(),
            mounts: Vec::new(),
        };
        match required(image, "image") {
            Ok(image) => run.image = image,
            Err(err) => run.err = Some(err),
        }
        run
    }
}

/// Builder for a `docker run` invocation
#[derive(Debug, Clone)]
pub struct DockerRun<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    image: String,
    args: Vec<String>,
    name: Option<String>,
    hostname: Option<String>,
    working_dir: Option<String>,
    network: Option<String>,
    detached: bool,
    interactive: bool,
    privileged: bool,
    read_only: bool,
    exit: ExitBehavior,
    env: Vec<String>,
    ports: Vec<String>,
    mounts: Vec<String>,
}

impl<'a> DockerRun<'a> {
    fn fail(mut self, err: DockerError) -> Self {
        self.err.get_or_insert(err);
        self
    }

    /// Command and arguments passed to the container after the image
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the container name
    pub fn name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Set the host name inside the container
    pub fn hostname(mut self, host: &str) -> Self {
        match required(host, "host name") {
            Ok(host) => {
                self.hostname = Some(host);
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Working directory for the entry point, rendered with forward slashes
    pub fn working_directory(mut self, container_path: impl AsRef<Path>) -> Self {
        self.working_dir = Some(paths::to_slash(container_path.as_ref()));
        self
    }

    /// Run detached, printing the container ID instead of streaming logs
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    /// Keep STDIN open and allocate a terminal
    pub fn interactive_terminal(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Run in privileged mode. Only use this when an image requires it.
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    /// Mount the container's root file system read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Remove the container when it exits. Replaces any restart policy.
    pub fn remove_after_exit(mut self) -> Self {
        self.exit = ExitBehavior::Remove;
        self
    }

    /// Set a restart policy. Any policy other than [`RestartPolicy::Never`]
    /// replaces remove-after-exit.
    ///
    /// `OnFailure` with zero retries is rejected at execution.
    pub fn restart(mut self, policy: RestartPolicy) -> Self {
        if let RestartPolicy::OnFailure {
            max_retries: Some(0),
        } = policy
        {
            return self.fail(invalid_retries(0));
        }
        if policy != RestartPolicy::Never || self.exit != ExitBehavior::Remove {
            self.exit = ExitBehavior::Restart(policy);
        }
        self
    }

    /// Set a restart policy from its CLI spelling, e.g. `unless-stopped`
    pub fn set_restart_policy(self, policy: &str) -> Self {
        match policy.parse::<RestartPolicy>() {
            Ok(policy) => self.restart(policy),
            Err(err) => self.fail(err),
        }
    }

    /// Restart on failure at most `retries` times
    pub fn restart_retries(self, retries: u32) -> Self {
        self.restart(RestartPolicy::OnFailure {
            max_retries: Some(retries),
        })
    }

    /// Connect the container to a named network
    pub fn connect_network(mut self, network: &str) -> Self {
        match required(network, &format!("network '{}'", network)) {
            Ok(network) => {
                self.network = Some(network);
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Set an environment variable in the container
    pub fn env_var(mut self, key: &str, value: &str) -> Self {
        self.env.push(format!("{}={}", key.trim(), value.trim()));
        self
    }

    /// Publish a container port on the host. Ports need not match.
    pub fn publish_port(mut self, host: u16, container: u16) -> Self {
        if host == 0 || container == 0 {
            return self.fail(DockerError::missing(format!(
                "invalid port value '{}:{}'",
                host, container
            )));
        }
        self.ports.push(format!("{}:{}", host, container));
        self
    }

    /// Bind mount a host path into the container.
    ///
    /// The host path is made absolute now; the container path is rendered
    /// with forward slashes.
    pub fn volume_mount(mut self, host_path: impl AsRef<Path>, container_path: impl AsRef<Path>) -> Self {
        let host_path = host_path.as_ref();
        if host_path.as_os_str().is_empty() {
            return self.fail(DockerError::missing("missing host path for bind mount"));
        }
        match paths::absolute(host_path) {
            Ok(abs) => {
                self.mounts.push(format!(
                    "{}:{}",
                    abs.display(),
                    paths::to_slash(container_path.as_ref())
                ));
                self
            }
            Err(e) => self.fail(DockerError::AbsolutePath {
                path: host_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn exit_behavior(&self) -> ExitBehavior {
        self.exit
    }
}

impl Subcommand for DockerRun<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut args = vec!["run".to_string()];
        if let Some(name) = &self.name {
            args.push(format!("--name={}", name));
        }
        if let Some(host) = &self.hostname {
            args.push("-h".to_string());
            args.push(host.clone());
        }
        if let Some(dir) = &self.working_dir {
            args.push("-w".to_string());
            args.push(dir.clone());
        }
        if self.detached {
            args.push("-d".to_string());
        }
        if self.interactive {
            args.push("-it".to_string());
        }
        if self.privileged {
            args.push("--privileged".to_string());
        }
        if self.read_only {
            args.push("--read-only".to_string());
        }
        match self.exit {
            ExitBehavior::Remove => args.push("--rm".to_string()),
            ExitBehavior::Restart(RestartPolicy::Never) => {}
            ExitBehavior::Restart(policy) => args.push(format!("--restart={}", policy)),
        }
        if let Some(network) = &self.network {
            args.push(format!("--network={}", network));
        }
        for env in &self.env {
            args.push("-e".to_string());
            args.push(env.clone());
        }
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(port.clone());
        }
        for mount in &self.mounts {
            args.push("-v".to_string());
            args.push(mount.clone());
        }
        args.push(self.image.clone());
        args.extend(self.args.iter().cloned());
        Ok(args)
    }
}
