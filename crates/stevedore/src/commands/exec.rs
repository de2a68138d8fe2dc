//! Exec command implementation

use stevedore_core::{DockerRef, Result, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Arguments for the exec command
#[derive(Debug, Clone)]
pub struct ExecArgs {
    pub container: String,
    pub command: Vec<String>,
    pub detach: bool,
    pub tty: bool,
    pub privileged: bool,
    /// `USER` or `USER:GROUP`
    pub user: Option<String>,
    pub workdir: Option<String>,
}

#[instrument(skip(docker, cancel), fields(container = %args.container))]
pub async fn execute_exec(
    docker: &DockerRef,
    args: ExecArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut exec = docker.exec(&args.container, args.command);
    if args.detach {
        exec = exec.detached();
    } else if args.tty {
        exec = exec.interactive_terminal();
    }
    if args.privileged {
        exec = exec.privileged();
    }
    if let Some(user) = &args.user {
        exec = match user.split_once(':') {
            Some((user, group)) => exec.user(user, Some(group)),
            None => exec.user(user, None),
        };
    }
    if let Some(workdir) = &args.workdir {
        exec = exec.working_directory(workdir);
    }
    exec.run(cancel).await
}
