//! `docker exec`
//!
//! Argument order: `exec [-d | -i [-t]] [--privileged] [-u user[:group]]
//! [-w workdir] <container> <cmd> [args...]`

use crate::docker::{DockerRef, Subcommand};
use crate::errors::{required, DockerError, Result};
use crate::paths;
use std::path::Path;

/// How the exec session is attached.
///
/// Detached and interactive are mutually exclusive; each setter replaces the
/// whole mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Run in the background
    Detached,
    /// Keep STDIN open, optionally with a pseudo terminal
    Interactive { tty: bool },
}

impl Default for ExecMode {
    fn default() -> Self {
        Self::Interactive { tty: false }
    }
}

impl DockerRef {
    /// Execute `command` inside the running `container`
    pub fn exec<I, S>(&self, container: &str, command: I) -> DockerExec<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut exec = DockerExec {
            docker: self,
            err: None,
            container: String::new(),
            command: command.into_iter().map(Into::into).collect(),
            mode: ExecMode::default(),
            privileged: false,
            user: None,
            working_dir: None,
        };
        match required(container, "container name") {
            Ok(container) => exec.container = container,
            Err(err) => exec.err = Some(err),
        }
        if exec.err.is_none() && exec.command.is_empty() {
            exec.err = Some(DockerError::missing("missing command to execute"));
        }
        exec
    }
}

/// Builder for a `docker exec` invocation
#[derive(Debug, Clone)]
pub struct DockerExec<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    container: String,
    command: Vec<String>,
    mode: ExecMode,
    privileged: bool,
    user: Option<String>,
    working_dir: Option<String>,
}

impl<'a> DockerExec<'a> {
    /// Run the command in the background. Turns off interactive mode.
    pub fn detached(mut self) -> Self {
        self.mode = ExecMode::Detached;
        self
    }

    /// Keep STDIN open and allocate a terminal. Turns off detached mode.
    pub fn interactive_terminal(mut self) -> Self {
        self.mode = ExecMode::Interactive { tty: true };
        self
    }

    /// Keep STDIN open without a terminal. This is the default.
    pub fn interactive(mut self) -> Self {
        self.mode = ExecMode::Interactive { tty: false };
        self
    }

    /// Give extended privileges to the command
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    /// Run as `user`, optionally with `group`
    pub fn user(mut self, user: &str, group: Option<&str>) -> Self {
        match required(user, "user") {
            Ok(user) => {
                let group = group.map(str::trim).filter(|g| !g.is_empty());
                self.user = Some(match group {
                    Some(group) => format!("{}:{}", user, group),
                    None => user,
                });
            }
            Err(err) => {
                self.err.get_or_insert(err);
            }
        }
        self
    }

    /// Working directory inside the container, rendered with forward slashes
    pub fn working_directory(mut self, container_path: impl AsRef<Path>) -> Self {
        self.working_dir = Some(paths::to_slash(container_path.as_ref()));
        self
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }
}

impl Subcommand for DockerExec<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut args = vec!["exec".to_string()];
        match self.mode {
            ExecMode::Detached => args.push("-d".to_string()),
            ExecMode::Interactive { tty } => {
                args.push("-i".to_string());
                if tty {
                    args.push("-t".to_string());
                }
            }
        }
        if self.privileged {
            args.push("--privileged".to_string());
        }
        if let Some(user) = &self.user {
            args.push("-u".to_string());
            args.push(user.clone());
        }
        if let Some(dir) = &self.working_dir {
            args.push("-w".to_string());
            args.push(dir.clone());
        }
        args.push(self.container.clone());
        args.extend(self.command.iter().cloned());
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_exec_default_is_interactive() {
        let docker = DockerRef::docker().dry();
        let err = docker
            .exec("some-container", ["echo", "Hello!"])
            .run(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "dry run: docker exec -i some-container echo Hello!");
    }

    #[test]
    fn test_mode_transitions() {
        let docker = DockerRef::docker().dry();
        let exec = docker.exec("c1", ["echo", "hi"]);
        assert_eq!(exec.args().unwrap().join(" "), "exec -i c1 echo hi");

        let exec = exec.detached();
        assert_eq!(exec.args().unwrap().join(" "), "exec -d c1 echo hi");

        let exec = exec.interactive_terminal();
        assert_eq!(exec.mode(), ExecMode::Interactive { tty: true });
        assert_eq!(exec.args().unwrap().join(" "), "exec -i -t c1 echo hi");

        let exec = exec.detached();
        assert_eq!(exec.args().unwrap().join(" "), "exec -d c1 echo hi");

        let exec = exec.interactive();
        assert_eq!(exec.args().unwrap().join(" "), "exec -i c1 echo hi");
    }

    #[test]
    fn test_full_ordering() {
        let docker = DockerRef::docker().dry();
        let args = docker
            .exec("web-1", ["sh", "-c", "ls -la"])
            .working_directory("/srv/app")
            .user("www-data", Some("www-data"))
            .privileged()
            .interactive_terminal()
            .args()
            .unwrap();
        assert_eq!(
            args,
            vec![
                "exec",
                "-i",
                "-t",
                "--privileged",
                "-u",
                "www-data:www-data",
                "-w",
                "/srv/app",
                "web-1",
                "sh",
                "-c",
                "ls -la"
            ]
        );
    }

    #[test]
    fn test_user_without_group() {
        let docker = DockerRef::docker().dry();
        let args = docker.exec("c1", ["id"]).user("1000", Some("  ")).args().unwrap();
        assert_eq!(args.join(" "), "exec -i -u 1000 c1 id");
    }

    #[test]
    fn test_validation() {
        let docker = DockerRef::docker().dry();
        let err = docker.exec(" ", ["id"]).args().unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter: missing container name");

        let err = docker.exec("c1", Vec::<String>::new()).args().unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter: missing command to execute");

        let err = docker.exec("c1", ["id"]).user("", None).args().unwrap_err();
        assert!(matches!(err, DockerError::MissingParameter { .. }));
    }
}
