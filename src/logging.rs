// tracing bootstrap shared by both binaries

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,book_catalog=debug,tower_http=info";

/// Install the global subscriber. `RUST_LOG` overrides `DEFAULT_FILTER`.
/// A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
