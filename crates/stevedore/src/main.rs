use anyhow::Result;
use clap::Parser;
use stevedore_core::DockerError;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = cli::Cli::parse();

    match parsed.dispatch().await {
        Ok(()) => Ok(()),
        Err(err) => {
            // Mirror the container CLI's exit status.
            if let Some(DockerError::ExecFailed { code: Some(code) }) =
                err.downcast_ref::<DockerError>()
            {
                std::process::exit(*code);
            }
            Err(err)
        }
    }
}
