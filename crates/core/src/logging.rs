//! Logging setup
//!
//! Text or JSON output through `tracing-subscriber`, always on stderr so that
//! stdout stays free for command output (including dry-run renderings).
//!
//! ## Environment Variables
//!
//! * `STEVEDORE_LOG` - filter directives, e.g. `stevedore_core=debug`
//! * `RUST_LOG` - fallback when `STEVEDORE_LOG` is unset
//! * `STEVEDORE_LOG_FORMAT` - `json` for JSON lines, anything else for text

use anyhow::Result;
use std::{io, sync::Once};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_LOG: &str = "STEVEDORE_LOG";
pub const ENV_LOG_FORMAT: &str = "STEVEDORE_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Initialize logging with an optional format (`"text"` or `"json"`).
///
/// Safe to call more than once; only the first call installs a subscriber.
///
/// ```rust
/// use stevedore_core::logging;
///
/// logging::init(None).expect("Failed to initialize logging");
/// ```
pub fn init(format: Option<&str>) -> Result<()> {
    init_with_filter(format, None)
}

/// Like [`init`], with explicit filter directives taking precedence over the
/// environment.
pub fn init_with_filter(format: Option<&str>, filter: Option<&str>) -> Result<()> {
    INIT.call_once(|| {
        let filter = create_env_filter(filter);

        let env_format = std::env::var(ENV_LOG_FORMAT).ok();
        let effective_format = format.or(env_format.as_deref()).unwrap_or("text");

        // A host application may already own the global subscriber.
        let installed = match effective_format {
            "json" => tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(span_events_for_format(effective_format))
                        .with_writer(io::stderr),
                )
                .with(filter)
                .try_init(),
            _ => tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_writer(io::stderr),
                )
                .with(filter)
                .try_init(),
        };

        if installed.is_ok() {
            tracing::debug!("Logging initialized with format: {}", effective_format);
        }
    });

    Ok(())
}

/// Build the filter: explicit directives, then `STEVEDORE_LOG`, then
/// `RUST_LOG`, then `info`.
fn create_env_filter(directives: Option<&str>) -> EnvFilter {
    let directives = directives
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_LOG).ok());
    match directives {
        Some(directives) => EnvFilter::try_new(&directives).unwrap_or_else(|_| {
            eprintln!("Invalid log filter '{}', using default '{}'", directives, DEFAULT_FILTER);
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// JSON output keeps span open/close events for tooling; text stays quiet.
fn span_events_for_format(format: &str) -> fmt::format::FmtSpan {
    use fmt::format::FmtSpan;
    match format {
        "json" => FmtSpan::NEW | FmtSpan::CLOSE,
        _ => FmtSpan::NONE,
    }
}

pub fn is_initialized() -> bool {
    INIT.is_completed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmt::format::FmtSpan;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_init_multiple_calls_safe() {
        assert!(init(None).is_ok());
        assert!(init(Some("json")).is_ok());
        assert!(init_with_filter(Some("text"), Some("debug")).is_ok());
        assert!(is_initialized());
    }

    #[test]
    #[serial]
    fn test_env_filter_precedence() {
        std::env::set_var(ENV_LOG, "stevedore_core=trace");
        let filter = create_env_filter(None);
        assert!(filter.to_string().contains("stevedore_core=trace"));

        let filter = create_env_filter(Some("warn"));
        assert_eq!(filter.to_string(), "warn");
        std::env::remove_var(ENV_LOG);
    }

    #[test]
    #[serial]
    fn test_invalid_filter_falls_back_to_info() {
        let filter = create_env_filter(Some("stevedore_core=loud"));
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_span_events_for_format() {
        assert_eq!(span_events_for_format("json"), FmtSpan::NEW | FmtSpan::CLOSE);
        assert_eq!(span_events_for_format("text"), FmtSpan::NONE);
    }
}
