//! Logging initialization

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output, `arbor=debug` unless `RUST_LOG` says otherwise
    Development,
    /// JSON lines, `arbor=info` unless `RUST_LOG` says otherwise
    Production,
    /// Bare registry; tests install the capture layer instead
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call has an effect. Output goes to stderr so that command
/// output on stdout stays machine-readable.
pub fn init(profile: Profile) {
    // A subscriber installed elsewhere (the test capture) is left in place.
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter_or("arbor=debug"))
                .try_init();
        }
        Profile::Production => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter_or("arbor=info"))
                .try_init();
        }
        Profile::Test => {
            let _ = tracing_subscriber::registry().try_init();
        }
    });
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn test_profile_equality() {
        assert_ne!(Profile::Development, Profile::Production);
    }
}
