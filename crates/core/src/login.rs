//! `docker login`
//!
//! By default the secret is not passed on the command line: the CLI prompts
//! for it on the inherited standard input. Supplying a password switches to
//! `-p <password>`.

use crate::docker::{DockerCommand, DockerRef, Subcommand};
use crate::errors::{required, DockerError, Result};
use crate::process::StdinMode;
use std::fmt;

/// Where the registry secret comes from
#[derive(Clone, Default, PartialEq, Eq)]
pub enum PasswordSource {
    /// The CLI reads the secret from standard input
    #[default]
    Stdin,
    /// Passed with `-p`; `None` until a non-blank password is supplied
    Explicit(Option<String>),
}

impl fmt::Debug for PasswordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("Stdin"),
            Self::Explicit(None) => f.write_str("Explicit(None)"),
            Self::Explicit(Some(_)) => f.write_str("Explicit(********)"),
        }
    }
}

impl DockerRef {
    /// Log in to the registry at `host`
    pub fn login(&self, host: &str) -> DockerLogin<'_> {
        let (host, err) = match required(host, "host") {
            Ok(host) => (host, None),
            Err(err) => (String::new(), Some(err)),
        };
        DockerLogin {
            docker: self,
            err,
            host,
            username: None,
            password: PasswordSource::default(),
        }
    }
}

/// Builder for a `docker login` invocation
#[derive(Debug, Clone)]
pub struct DockerLogin<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    host: String,
    username: Option<String>,
    password: PasswordSource,
}

impl<'a> DockerLogin<'a> {
    /// A blank username is ignored
    pub fn username(mut self, username: &str) -> Self {
        let username = username.trim();
        if !username.is_empty() {
            self.username = Some(username.to_string());
        }
        self
    }

    /// Pass `password` with `-p`. A blank password leaves the current mode
    /// unchanged.
    pub fn password(mut self, password: &str) -> Self {
        let password = password.trim();
        if !password.is_empty() {
            self.password = PasswordSource::Explicit(Some(password.to_string()));
        }
        self
    }

    /// Let the CLI read the secret from standard input
    pub fn password_stdin(mut self) -> Self {
        self.password = PasswordSource::Stdin;
        self
    }

    /// Require a password on the command line without supplying one yet.
    /// Running without a later [`password`](Self::password) fails with
    /// [`DockerError::MissingCredential`].
    pub fn password_mode(mut self) -> Self {
        if !matches!(self.password, PasswordSource::Explicit(_)) {
            self.password = PasswordSource::Explicit(None);
        }
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn password_source(&self) -> &PasswordSource {
        &self.password
    }
}

impl Subcommand for DockerLogin<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut args = vec!["login".to_string()];
        if let Some(username) = &self.username {
            args.push("-u".to_string());
            args.push(username.clone());
        }
        match &self.password {
            PasswordSource::Stdin => {}
            PasswordSource::Explicit(Some(password)) => {
                args.push("-p".to_string());
                args.push(password.clone());
            }
            PasswordSource::Explicit(None) => {
                return Err(DockerError::MissingCredential {
                    host: self.host.clone(),
                })
            }
        }
        args.push(self.host.clone());
        Ok(args)
    }

    /// The CLI prompts on stdin unless the password is on the command line.
    fn command(&self) -> Result<DockerCommand<'_>> {
        let stdin = match self.password {
            PasswordSource::Stdin => StdinMode::Inherit,
            PasswordSource::Explicit(_) => StdinMode::Null,
        };
        Ok(self.docker.command(self.args()?).stdin(stdin))
    }
}
