//! Logging utilities.
//!
//! Provides consistent logging setup across devbench binaries. Log events go
//! to stderr so stdout only carries reports and generated text.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with an environment filter and a compact stderr layer.
///
/// `RUST_LOG` takes precedence over `default_filter` when set.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Map a `--log-level` flag value to a filter directive.
///
/// Unknown values fall back to `info`.
pub fn level_filter(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_known_levels() {
        assert_eq!(level_filter("debug"), "debug");
        assert_eq!(level_filter("WARN"), "warn");
        assert_eq!(level_filter("error"), "error");
        assert_eq!(level_filter("trace"), "trace");
    }

    #[test]
    fn test_level_filter_unknown_defaults_to_info() {
        assert_eq!(level_filter("verbose"), "info");
        assert_eq!(level_filter(""), "info");
    }
}
