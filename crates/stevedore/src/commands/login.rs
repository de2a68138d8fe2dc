//! Login command implementation

use stevedore_core::{DockerRef, Result, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Arguments for the login command
#[derive(Clone)]
pub struct LoginArgs {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Fail instead of prompting when no password is given
    pub require_password: bool,
}

impl std::fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginArgs")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("require_password", &self.require_password)
            .finish()
    }
}

#[instrument(skip(docker, cancel))]
pub async fn execute_login(
    docker: &DockerRef,
    args: LoginArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut login = docker.login(&args.host);
    if let Some(username) = &args.username {
        login = login.username(username);
    }
    if args.require_password {
        login = login.password_mode();
    }
    if let Some(password) = &args.password {
        login = login.password(password);
    }
    login.run(cancel).await
}
