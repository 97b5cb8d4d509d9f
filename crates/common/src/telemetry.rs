//! Logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Returns false when a
/// subscriber was already installed (e.g. by a test harness).
pub fn init_logging(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_a_no_op() {
        init_logging("debug");
        assert!(!init_logging("info"));
    }
}
