//! Tracing subscriber setup shared by both binaries
//!
//! Structured `tracing` output through the fmt layer, filtered by
//! `RUST_LOG` or the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `level` applies to the lafz crates.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "lafz_server={level},lafz_common={level},lafz_align={level},tower_http=info"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
