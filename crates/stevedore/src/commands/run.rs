//! Run command implementation

use std::path::PathBuf;
use stevedore_core::{DockerRef, Result, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Arguments for the run command
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub image: String,
    /// Command and arguments after the image
    pub args: Vec<String>,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub workdir: Option<String>,
    pub detach: bool,
    pub interactive: bool,
    pub privileged: bool,
    pub read_only: bool,
    pub remove: bool,
    /// Restart policy in its CLI spelling
    pub restart: Option<String>,
    pub restart_retries: Option<u32>,
    pub network: Option<String>,
    pub env: Vec<(String, String)>,
    pub ports: Vec<(u16, u16)>,
    pub volumes: Vec<(PathBuf, String)>,
}

#[instrument(skip(docker, cancel), fields(image = %args.image))]
pub async fn execute_run(docker: &DockerRef, args: RunArgs, cancel: &CancellationToken) -> Result<()> {
    let mut run = docker.run(&args.image).with_args(args.args);
    if let Some(name) = &args.name {
        run = run.name(name);
    }
    if let Some(hostname) = &args.hostname {
        run = run.hostname(hostname);
    }
    if let Some(workdir) = &args.workdir {
        run = run.working_directory(workdir);
    }
    if args.detach {
        run = run.detached();
    }
    if args.interactive {
        run = run.interactive_terminal();
    }
    if args.privileged {
        run = run.privileged();
    }
    if args.read_only {
        run = run.read_only();
    }
    if let Some(policy) = &args.restart {
        run = run.set_restart_policy(policy);
    }
    if let Some(retries) = args.restart_retries {
        run = run.restart_retries(retries);
    }
    if args.remove {
        run = run.remove_after_exit();
    }
    if let Some(network) = &args.network {
        run = run.connect_network(network);
    }
    for (key, value) in &args.env {
        run = run.env_var(key, value);
    }
    for (host, container) in &args.ports {
        run = run.publish_port(*host, *container);
    }
    for (host, container) in &args.volumes {
        run = run.volume_mount(host, container);
    }
    run.run(cancel).await
}
