//! Image and container management: `rmi`, `rm`, `start`, `stop`, `pull`,
//! `tag` and `push`.
//!
//! Every identifier is trimmed and must be non-blank. A blank identifier is
//! reported when the builder runs.

use crate::docker::{DockerRef, Subcommand};
use crate::errors::{required, DockerError, Result};

impl DockerRef {
    /// Remove an image from the local store.
    ///
    /// Use [`DockerRemoveImage::force`] to remove images still referenced by
    /// containers.
    pub fn remove_image(&self, image: &str) -> DockerRemoveImage<'_> {
        let (image, err) = split(required(image, "image name/hash"));
        DockerRemoveImage {
            docker: self,
            err,
            image,
            force: false,
        }
    }

    /// Remove a container. Use [`DockerRemoveContainer::force`] to remove a
    /// running container.
    pub fn remove_container(&self, name: &str) -> DockerRemoveContainer<'_> {
        let (name, err) = split(required(name, "container name"));
        DockerRemoveContainer {
            docker: self,
            err,
            name,
            force: false,
        }
    }

    pub fn start(&self, name: &str) -> DockerStart<'_> {
        DockerStart::new(self, name)
    }

    pub fn stop(&self, name: &str) -> DockerStop<'_> {
        DockerStop::new(self, name)
    }

    /// Pull `image:tag` from its registry
    pub fn pull(&self, image: &str) -> DockerPull<'_> {
        DockerPull::new(self, image)
    }

    /// Push `image:tag` to its registry
    pub fn push(&self, image: &str) -> DockerPush<'_> {
        DockerPush::new(self, image)
    }

    /// Give the image `current` the additional name `new`
    pub fn tag(&self, current: &str, new: &str) -> DockerTag<'_> {
        let (current, err) = split(required(current, "source image"));
        let (new, new_err) = split(required(new, "target image"));
        DockerTag {
            docker: self,
            err: err.or(new_err),
            current,
            new,
        }
    }
}

fn split(value: Result<String>) -> (String, Option<DockerError>) {
    match value {
        Ok(value) => (value, None),
        Err(err) => (String::new(), Some(err)),
    }
}

/// Builder for `docker rmi`
#[derive(Debug, Clone)]
pub struct DockerRemoveImage<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    image: String,
    force: bool,
}

impl DockerRemoveImage<'_> {
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

impl Subcommand for DockerRemoveImage<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut args = vec!["rmi".to_string()];
        if self.force {
            args.push("-f".to_string());
        }
        args.push(self.image.clone());
        Ok(args)
    }
}

/// Builder for `docker rm`
#[derive(Debug, Clone)]
pub struct DockerRemoveContainer<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    name: String,
    force: bool,
}

impl DockerRemoveContainer<'_> {
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

impl Subcommand for DockerRemoveContainer<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut args = vec!["rm".to_string()];
        if self.force {
            args.push("-f".to_string());
        }
        args.push(self.name.clone());
        Ok(args)
    }
}

/// Builder for `docker tag`
#[derive(Debug, Clone)]
pub struct DockerTag<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    current: String,
    new: String,
}

impl Subcommand for DockerTag<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        Ok(vec!["tag".to_string(), self.current.clone(), self.new.clone()])
    }
}

// Verbs that take exactly one identifier and no options.
macro_rules! single_target {
    ($(#[$meta:meta])* $name:ident, $verb:literal, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<'a> {
            docker: &'a DockerRef,
            target: Result<String>,
        }

        impl<'a> $name<'a> {
            fn new(docker: &'a DockerRef, target: &str) -> Self {
                Self {
                    docker,
                    target: required(target, $what),
                }
            }
        }

        impl Subcommand for $name<'_> {
            fn docker(&self) -> &DockerRef {
                self.docker
            }

            fn args(&self) -> Result<Vec<String>> {
                let target = self.target.clone()?;
                Ok(vec![$verb.to_string(), target])
            }
        }
    };
}

single_target!(
    /// Builder for `docker start`
    DockerStart,
    "start",
    "container name"
);
single_target!(
    /// Builder for `docker stop`
    DockerStop,
    "stop",
    "container name"
);
single_target!(
    /// Builder for `docker pull`
    DockerPull,
    "pull",
    "image"
);
single_target!(
    /// Builder for `docker push`
    DockerPush,
    "push",
    "image"
);

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    async fn render<S: Subcommand>(cmd: S) -> String {
        let err = cmd.run(&CancellationToken::new()).await.unwrap_err();
        assert!(err.is_dry_run(), "expected a dry run, got {err:?}");
        err.to_string()
    }

    #[tokio::test]
    async fn test_remove_image() {
        let docker = DockerRef::docker().dry();
        assert_eq!(
            render(docker.remove_image("some-image:latest")).await,
            "dry run: docker rmi some-image:latest"
        );
        assert_eq!(
            render(docker.remove_image("some-image:latest").force()).await,
            "dry run: docker rmi -f some-image:latest"
        );
    }

    #[tokio::test]
    async fn test_remove_container() {
        let docker = DockerRef::docker().dry();
        assert_eq!(
            render(docker.remove_container("some-container")).await,
            "dry run: docker rm some-container"
        );
        assert_eq!(
            render(docker.remove_container(" some-container ").force()).await,
            "dry run: docker rm -f some-container"
        );
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let docker = DockerRef::docker().dry();
        assert_eq!(
            render(docker.start("some-container")).await,
            "dry run: docker start some-container"
        );
        assert_eq!(
            render(docker.stop("some-container")).await,
            "dry run: docker stop some-container"
        );
    }

    #[tokio::test]
    async fn test_pull_tag_push() {
        let docker = DockerRef::docker().dry();
        assert_eq!(
            render(docker.pull("some-host.com/my-image:1")).await,
            "dry run: docker pull some-host.com/my-image:1"
        );
        assert_eq!(
            render(docker.tag("some-host.com/my-image:1", "some-host.com/my-image:latest")).await,
            "dry run: docker tag some-host.com/my-image:1 some-host.com/my-image:latest"
        );
        assert_eq!(
            render(docker.push("some-host.com/my-image:latest")).await,
            "dry run: docker push some-host.com/my-image:latest"
        );
    }

    #[test]
    fn test_blank_identifiers_are_rejected() {
        let docker = DockerRef::docker().dry();
        let errors = [
            docker.remove_image(" ").force().args().unwrap_err(),
            docker.remove_container("").args().unwrap_err(),
            docker.start("\t").args().unwrap_err(),
            docker.stop("").args().unwrap_err(),
            docker.pull("").args().unwrap_err(),
            docker.push(" ").args().unwrap_err(),
            docker.tag("img:1", " ").args().unwrap_err(),
            docker.tag("", "img:2").args().unwrap_err(),
        ];
        for err in errors {
            assert!(
                matches!(err, DockerError::MissingParameter { .. }),
                "unexpected error: {err:?}"
            );
        }
        assert_eq!(
            docker.tag("", "").args().unwrap_err().to_string(),
            "missing required parameter: missing source image"
        );
    }

    #[tokio::test]
    async fn test_blank_identifier_wins_over_cancellation_check() {
        let docker = DockerRef::docker().dry();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = docker.stop("").run(&cancel).await.unwrap_err();
        assert!(matches!(err, DockerError::MissingParameter { .. }));
    }
}
