//! Configuration file loading and environment overrides

use serial_test::serial;
use stevedore_core::config::{ENV_DRY_RUN, ENV_ELEVATION, ENV_PROGRAM};
use stevedore_core::{DockerError, DockerRef, ElevationMode, Subcommand, ToolConfig};
use tempfile::TempDir;

fn clear_env() {
    for key in [ENV_PROGRAM, ENV_ELEVATION, ENV_DRY_RUN] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_file_then_env() -> anyhow::Result<()> {
    clear_env();
    let tmp = TempDir::new()?;
    let path = tmp.path().join("stevedore.toml");
    std::fs::write(
        &path,
        "program = \"podman\"\nadminGroup = \"podman\"\nelevation = \"never\"\n",
    )?;

    let config = ToolConfig::from_file(&path)?.with_env()?;
    assert_eq!(config.program, "podman");
    assert_eq!(config.admin_group, "podman");
    assert_eq!(config.elevation, ElevationMode::Never);
    assert!(!config.dry_run);

    std::env::set_var(ENV_PROGRAM, "nerdctl");
    std::env::set_var(ENV_DRY_RUN, "true");
    let config = ToolConfig::from_file(&path)?.with_env()?;
    clear_env();

    assert_eq!(config.program, "nerdctl");
    assert_eq!(config.elevation, ElevationMode::Never);
    assert!(config.dry_run);

    let docker = DockerRef::from_config(&config);
    assert!(docker.is_dry_run());
    let rendered = docker.pull("alpine").args()?.join(" ");
    assert_eq!(rendered, "pull alpine");
    Ok(())
}

#[test]
#[serial]
fn test_missing_file_is_config_error() {
    clear_env();
    let tmp = TempDir::new().unwrap();
    let err = ToolConfig::from_file(&tmp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, DockerError::Config { .. }));
    assert!(err.to_string().starts_with("configuration error: failed to read"));
}

#[test]
#[serial]
fn test_invalid_env_elevation_is_rejected() {
    clear_env();
    std::env::set_var(ENV_ELEVATION, "sometimes");
    let result = ToolConfig::default().with_env();
    clear_env();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("unknown elevation mode 'sometimes'"));
}
