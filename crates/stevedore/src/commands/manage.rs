//! Image and container management commands

use stevedore_core::{DockerRef, Result, Subcommand};
use tokio_util::sync::CancellationToken;

pub async fn remove_image(
    docker: &DockerRef,
    image: &str,
    force: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let rmi = docker.remove_image(image);
    if force {
        rmi.force().run(cancel).await
    } else {
        rmi.run(cancel).await
    }
}

pub async fn remove_container(
    docker: &DockerRef,
    container: &str,
    force: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let rm = docker.remove_container(container);
    if force {
        rm.force().run(cancel).await
    } else {
        rm.run(cancel).await
    }
}

pub async fn start(docker: &DockerRef, container: &str, cancel: &CancellationToken) -> Result<()> {
    docker.start(container).run(cancel).await
}

pub async fn stop(docker: &DockerRef, container: &str, cancel: &CancellationToken) -> Result<()> {
    docker.stop(container).run(cancel).await
}

pub async fn pull(docker: &DockerRef, image: &str, cancel: &CancellationToken) -> Result<()> {
    docker.pull(image).run(cancel).await
}

pub async fn tag(
    docker: &DockerRef,
    source: &str,
    target: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    docker.tag(source, target).run(cancel).await
}

pub async fn push(docker: &DockerRef, image: &str, cancel: &CancellationToken) -> Result<()> {
    docker.push(image).run(cancel).await
}
