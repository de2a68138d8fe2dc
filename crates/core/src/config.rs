//! Tool configuration
//!
//! Selects which container CLI to drive and how to elevate it. Values are
//! layered with the precedence: explicit override > environment > config
//! file > default.

use crate::errors::{DockerError, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Environment variable naming the container CLI program
pub const ENV_PROGRAM: &str = "STEVEDORE_DOCKER";
/// Environment variable selecting the elevation mode
pub const ENV_ELEVATION: &str = "STEVEDORE_ELEVATION";
/// Environment variable enabling dry run mode
pub const ENV_DRY_RUN: &str = "STEVEDORE_DRY_RUN";

pub const DEFAULT_PROGRAM: &str = "docker";
pub const DEFAULT_ADMIN_GROUP: &str = "docker";

/// How privilege elevation is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    /// Elevate only when the user is not in the administrative group
    #[default]
    Auto,
    /// Never elevate
    Never,
    /// Always elevate
    Always,
}

impl ElevationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Never => "never",
            Self::Always => "always",
        }
    }
}

impl FromStr for ElevationMode {
    type Err = DockerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            _ => Err(DockerError::Config {
                message: format!(
                    "unknown elevation mode '{}'. Supported modes: auto, never, always",
                    s
                ),
            }),
        }
    }
}

impl std::fmt::Display for ElevationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings for a [`DockerRef`](crate::docker::DockerRef)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    /// Executable name or path of the container CLI
    pub program: String,
    /// Group whose members may use the CLI without elevation
    pub admin_group: String,
    pub elevation: ElevationMode,
    pub dry_run: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            admin_group: DEFAULT_ADMIN_GROUP.to_string(),
            elevation: ElevationMode::Auto,
            dry_run: false,
        }
    }
}

impl ToolConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| DockerError::Config {
            message: format!("failed to parse configuration: {}", e),
        })
    }

    /// Load a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| DockerError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply `STEVEDORE_*` environment overrides on top of this configuration
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(program) = lookup(ENV_PROGRAM).filter(|v| !v.trim().is_empty()) {
            self.program = program.trim().to_string();
        }
        if let Some(mode) = lookup(ENV_ELEVATION).filter(|v| !v.trim().is_empty()) {
            self.elevation = mode.parse()?;
        }
        if let Some(flag) = lookup(ENV_DRY_RUN) {
            self.dry_run = parse_flag(&flag);
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
