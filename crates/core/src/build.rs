//! `docker build`
//!
//! Argument order is fixed:
//! `build -t <image> [-f <buildfile>] [--build-arg k=v]... [--label k=v]... .`
//!
//! When the context is a directory the CLI runs from inside it, so the
//! positional context is always `.` and `-f` is rewritten relative to the
//! context.

use crate::docker::{DockerCommand, DockerRef, Subcommand};
use crate::errors::{required, DockerError, Result};
use crate::paths;
use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use std::path::{Path, PathBuf};

/// Label key stamped by [`DockerBuild::label_build_timestamp`]
pub const BUILD_TIMESTAMP_LABEL: &str = "buildTimestamp";

impl DockerRef {
    /// Build an image tagged `image` from `context`.
    ///
    /// An empty `context`, or one that is not a directory, builds from the
    /// caller's current working directory.
    pub fn build(&self, image: &str, context: impl AsRef<Path>) -> DockerBuild<'_> {
        let mut build = DockerBuild {
            docker: self,
            err: None,
            image: String::new(),
            context: context.as_ref().to_path_buf(),
            build_file: None,
            build_args: Vec::new(),
            labels: Vec::new(),
        };
        match required(image, "image") {
            Ok(image) => build.image = image,
            Err(err) => build.err = Some(err),
        }
        build
    }
}

/// Builder for a `docker build` invocation
#[derive(Debug, Clone)]
pub struct DockerBuild<'a> {
    docker: &'a DockerRef,
    err: Option<DockerError>,
    image: String,
    context: PathBuf,
    build_file: Option<PathBuf>,
    build_args: Vec<String>,
    labels: Vec<String>,
}

impl<'a> DockerBuild<'a> {
    /// Set a build argument. These are distinct from environment variables.
    pub fn build_arg(mut self, key: &str, value: &str) -> Self {
        self.build_args.push(format!("{}={}", key, value));
        self
    }

    /// Use a build file other than `Dockerfile` in the context root
    pub fn build_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.build_file = (!path.as_os_str().is_empty()).then(|| path.to_path_buf());
        self
    }

    /// Set a metadata label on the built image
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.push(format!("{}={}", key, value));
        self
    }

    /// Label the image with the current time as `buildTimestamp`
    pub fn label_build_timestamp(self) -> Self {
        self.label_timestamp_at(Local::now())
    }

    /// Label the image with the given time as `buildTimestamp`
    pub fn label_timestamp_at<Tz: TimeZone>(self, at: DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.label(BUILD_TIMESTAMP_LABEL, &stamp)
    }

    /// The image tag, trimmed
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The directory the CLI runs from, if the context is a directory
    fn context_dir(&self) -> Option<&Path> {
        let ctx = self.context.as_path();
        (!ctx.as_os_str().is_empty() && ctx.is_dir()).then_some(ctx)
    }
}

impl Subcommand for DockerBuild<'_> {
    fn docker(&self) -> &DockerRef {
        self.docker
    }

    fn args(&self) -> Result<Vec<String>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut args = vec!["build".to_string(), "-t".to_string(), self.image.clone()];

        if let Some(build_file) = &self.build_file {
            let rendered = match self.context_dir() {
                Some(ctx) => paths::relative_to(ctx, build_file)
                    .ok_or_else(|| DockerError::PathResolution {
                        context: ctx.display().to_string(),
                        build_file: build_file.display().to_string(),
                    })?
                    .display()
                    .to_string(),
                None => build_file.display().to_string(),
            };
            args.push("-f".to_string());
            args.push(rendered);
        }

        for arg in &self.build_args {
            args.push("--build-arg".to_string());
            args.push(arg.clone());
        }
        for label in &self.labels {
            args.push("--label".to_string());
            args.push(label.clone());
        }

        args.push(".".to_string());
        Ok(args)
    }

    fn command(&self) -> Result<DockerCommand<'_>> {
        let command = self.docker.command(self.args()?);
        Ok(match self.context_dir() {
            Some(ctx) => command.current_dir(ctx),
            None => command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    async fn dry_render(build: DockerBuild<'_>) -> String {
        build
            .run(&CancellationToken::new())
            .await
            .unwrap_err()
            .to_string()
    }

    #[tokio::test]
    async fn test_build() {
        let docker = DockerRef::docker().dry();
        assert_eq!(
            dry_render(docker.build("some-image:latest", ".")).await,
            "dry run: docker build -t some-image:latest ."
        );
        assert_eq!(docker.build(" some-image:latest ", ".").image(), "some-image:latest");
    }

    #[tokio::test]
    async fn test_build_without_context() {
        let docker = DockerRef::docker().dry();
        let build = docker.build("some-image:latest", "");
        assert!(build.command().unwrap().working_dir().is_none());
        assert_eq!(
            dry_render(build).await,
            "dry run: docker build -t some-image:latest ."
        );
    }

    #[tokio::test]
    async fn test_build_in_context_directory() {
        let tmp = TempDir::new().unwrap();
        let docker = DockerRef::docker().dry();
        let build = docker.build("some-image:latest", tmp.path());
        assert_eq!(build.command().unwrap().working_dir(), Some(tmp.path()));
        assert_eq!(
            dry_render(build).await,
            "dry run: docker build -t some-image:latest ."
        );
    }

    #[tokio::test]
    async fn test_build_file_relative_to_context() {
        let tmp = TempDir::new().unwrap();
        let ctx = tmp.path().join("ctx");
        std::fs::create_dir(&ctx).unwrap();
        let docker = DockerRef::docker().dry();
        let build = docker
            .build("some-image:latest", &ctx)
            .build_file(ctx.join("Dockerfile"));
        assert_eq!(
            dry_render(build).await,
            "dry run: docker build -t some-image:latest -f Dockerfile ."
        );
    }

    #[test]
    fn test_build_file_outside_directory_context() {
        let tmp = TempDir::new().unwrap();
        let ctx = tmp.path().join("ctx");
        std::fs::create_dir(&ctx).unwrap();
        let docker = DockerRef::docker().dry();
        let args = docker
            .build("img", &ctx)
            .build_file(tmp.path().join("build").join("Dockerfile"))
            .args()
            .unwrap();
        let expected = Path::new("..").join("build").join("Dockerfile");
        assert_eq!(args[3], "-f");
        assert_eq!(args[4], expected.display().to_string());
    }

    #[test]
    fn test_build_file_kept_verbatim_without_directory_context() {
        let docker = DockerRef::docker().dry();
        let args = docker
            .build("img", "")
            .build_file("docker/Dockerfile.dev")
            .args()
            .unwrap();
        assert_eq!(args, vec!["build", "-t", "img", "-f", "docker/Dockerfile.dev", "."]);
    }

    #[tokio::test]
    async fn test_build_args_in_call_order() {
        let docker = DockerRef::docker().dry();
        let build = docker
            .build("some-image:latest", ".")
            .build_arg("c", "d")
            .build_arg("a", "b");
        assert_eq!(
            dry_render(build).await,
            "dry run: docker build -t some-image:latest --build-arg c=d --build-arg a=b ."
        );
    }

    #[tokio::test]
    async fn test_labels_in_call_order() {
        let docker = DockerRef::docker().dry();
        let build = docker
            .build("some-image:latest", ".")
            .label("c", "d")
            .label("a", "b");
        assert_eq!(
            dry_render(build).await,
            "dry run: docker build -t some-image:latest --label c=d --label a=b ."
        );
    }

    #[test]
    fn test_full_ordering() {
        let tmp = TempDir::new().unwrap();
        let docker = DockerRef::docker().dry();
        let args = docker
            .build("img:1", tmp.path())
            .label("team", "core")
            .build_arg("VERSION", "1.2")
            .build_file(tmp.path().join("Containerfile"))
            .args()
            .unwrap();
        assert_eq!(
            args,
            vec![
                "build",
                "-t",
                "img:1",
                "-f",
                "Containerfile",
                "--build-arg",
                "VERSION=1.2",
                "--label",
                "team=core",
                "."
            ]
        );
    }

    #[test]
    fn test_label_timestamp_format() {
        let docker = DockerRef::docker().dry();
        let at = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 5)
            .unwrap();
        let args = docker.build("img", ".").label_timestamp_at(at).args().unwrap();
        assert_eq!(args[4], "buildTimestamp=2024-03-01T12:30:05+02:00");

        let utc = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 5).unwrap();
        let args = docker.build("img", ".").label_timestamp_at(utc).args().unwrap();
        assert_eq!(args[4], "buildTimestamp=2024-03-01T10:30:05Z");
    }

    #[test]
    fn test_label_build_timestamp_is_rfc3339() {
        let docker = DockerRef::docker().dry();
        let args = docker.build("img", ".").label_build_timestamp().args().unwrap();
        assert_eq!(args[3], "--label");
        let stamp = args[4].strip_prefix("buildTimestamp=").unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "not RFC 3339: {}", stamp);
        assert_eq!(args.last().map(String::as_str), Some("."));
    }

    #[tokio::test]
    async fn test_blank_image_fails_at_execution() {
        let docker = DockerRef::docker().dry();
        let build = docker.build("   ", ".").label("a", "b");
        let err = build.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DockerError::MissingParameter { .. }));
        assert_eq!(err.to_string(), "missing required parameter: missing image");
    }

    #[tokio::test]
    async fn test_dry_run_is_repeatable() {
        let docker = DockerRef::docker().dry();
        let build = docker.build("img", ".").build_arg("k", "v");
        let cancel = CancellationToken::new();
        let first = build.run(&cancel).await.unwrap_err().to_string();
        let second = build.run(&cancel).await.unwrap_err().to_string();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cancelled_build_reports_cancellation() {
        let docker = DockerRef::docker().dry();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = docker.build("img", ".").run(&cancel).await.unwrap_err();
        assert!(matches!(err, DockerError::Cancelled));
    }
}
