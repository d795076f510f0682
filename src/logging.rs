//! Tracing subscriber bootstrap.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the configuration provide one
pub const DEFAULT_LOG_FILTER: &str = "cosmoql=info";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `filter`; an unparseable `filter` falls back to
/// [`DEFAULT_LOG_FILTER`]. Returns false when a subscriber was already set.
pub fn init(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init("cosmoql=debug");
        assert!(!init(DEFAULT_LOG_FILTER));
    }
}
