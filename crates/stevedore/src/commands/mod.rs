//! Command implementations
//!
//! Each module maps parsed CLI arguments onto one core builder and runs it.

pub mod build;
pub mod exec;
pub mod login;
pub mod manage;
pub mod run;

use anyhow::Result;
use std::path::PathBuf;
use stevedore_core::DockerError;

/// Turn a builder outcome into the CLI's outcome.
///
/// A dry run is a success: its rendering goes to stdout.
pub fn finish(result: stevedore_core::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(DockerError::DryRun(dry_run)) => {
            println!("{}", dry_run);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Parse `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse `HOST:CONTAINER` port pairs
pub fn parse_port(s: &str) -> std::result::Result<(u16, u16), String> {
    let (host, container) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid port mapping '{}', expected HOST:CONTAINER", s))?;
    let port = |value: &str| {
        value
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("invalid port '{}' in '{}': {}", value, s, e))
    };
    Ok((port(host)?, port(container)?))
}

/// Parse `HOST_PATH:CONTAINER_PATH`, splitting on the last `:` so Windows
/// drive letters survive in the host path.
pub fn parse_mount(s: &str) -> std::result::Result<(PathBuf, String), String> {
    match s.rsplit_once(':') {
        Some((host, container)) if !host.is_empty() && !container.is_empty() => {
            Ok((PathBuf::from(host), container.to_string()))
        }
        _ => Err(format!(
            "invalid bind mount '{}', expected HOST_PATH:CONTAINER_PATH",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("URL=http://x?a=b").unwrap(),
            ("URL".to_string(), "http://x?a=b".to_string())
        );
        assert_eq!(parse_key_val("EMPTY=").unwrap().1, "");
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=value").is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080:80").unwrap(), (8080, 80));
        assert!(parse_port("8080").is_err());
        assert!(parse_port("http:80").is_err());
        assert!(parse_port("70000:80").is_err());
        // Zero parses here; the run builder rejects it.
        assert_eq!(parse_port("0:80").unwrap(), (0, 80));
    }

    #[test]
    fn test_parse_mount() {
        assert_eq!(
            parse_mount("./data:/var/lib/data").unwrap(),
            (PathBuf::from("./data"), "/var/lib/data".to_string())
        );
        assert_eq!(
            parse_mount(r"C:\data:/data").unwrap(),
            (PathBuf::from(r"C:\data"), "/data".to_string())
        );
        assert!(parse_mount("/data").is_err());
        assert!(parse_mount(":/data").is_err());
    }

    #[test]
    fn test_finish_treats_dry_run_as_success() {
        let dry = stevedore_core::DryRunResult::new("docker", vec!["ps".to_string()]);
        assert!(finish(Err(dry.into())).is_ok());
        assert!(finish(Err(DockerError::Cancelled)).is_err());
    }
}
