use tracing_subscriber::EnvFilter;

use crate::constants::LOG_FILTER;

/// Install the fmt subscriber. `RUST_LOG` wins over `filter`, which wins over the default.
pub fn init_tracing(filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(LOG_FILTER)));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
