//! Dry run interception
//!
//! When a [`DockerRef`](crate::docker::DockerRef) is in dry run mode, no process
//! is launched. Execution instead fails with a [`DryRunResult`] that records
//! exactly what would have run.

use std::fmt;

/// Immutable snapshot of an invocation that was intercepted by dry run mode.
///
/// The rendering is a literal join of the arguments with single spaces; it is
/// not shell-escaped and never includes a privilege elevation prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunResult {
    program: String,
    args: Vec<String>,
}

impl DryRunResult {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments that would have been passed to the container CLI
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Name of the container CLI that would have been invoked
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The invocation without the `dry run: ` marker, e.g. `docker pull alpine`
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for DryRunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dry run: {}", self.command_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_with_single_spaces() {
        let result = DryRunResult::new("docker", vec!["do".to_string(), "command".to_string()]);
        assert_eq!(result.to_string(), "dry run: docker do command");
    }

    #[test]
    fn test_render_does_not_escape_spaces() {
        let result = DryRunResult::new(
            "docker",
            vec!["exec".to_string(), "c1".to_string(), "echo hi there".to_string()],
        );
        assert_eq!(result.to_string(), "dry run: docker exec c1 echo hi there");
        assert_eq!(result.args().len(), 3);
    }

    #[test]
    fn test_render_without_args() {
        let result = DryRunResult::new("podman", Vec::new());
        assert_eq!(result.to_string(), "dry run: podman");
        assert_eq!(result.program(), "podman");
    }
}
