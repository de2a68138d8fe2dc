//! Build command implementation

use std::path::PathBuf;
use stevedore_core::{DockerRef, Result, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Arguments for the build command
#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub image: String,
    pub context: PathBuf,
    pub build_file: Option<PathBuf>,
    pub build_args: Vec<(String, String)>,
    pub labels: Vec<(String, String)>,
    /// Add a buildTimestamp label with the current time
    pub timestamp: bool,
}

#[instrument(skip(docker, cancel))]
pub async fn execute_build(
    docker: &DockerRef,
    args: BuildArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut build = docker.build(&args.image, &args.context);
    if let Some(build_file) = &args.build_file {
        build = build.build_file(build_file);
    }
    for (key, value) in &args.build_args {
        build = build.build_arg(key, value);
    }
    for (key, value) in &args.labels {
        build = build.label(key, value);
    }
    if args.timestamp {
        build = build.label_build_timestamp();
    }
    build.run(cancel).await
}
