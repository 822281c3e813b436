//! Metrics and log output.
//!
//! The crate logs through `tracing` and never installs a subscriber on its
//! own. Applications that have none can enable the `subscriber` feature and
//! call `init_tracing`:
//!
//! ```toml
//! gatekeeper = { version = "0.1", features = ["subscriber"] }
//! ```
//!
//! ```rust,ignore
//! gatekeeper::observability::init_tracing("gatekeeper=debug")?;
//! ```

mod metrics;

pub use metrics::Counter;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, or by
/// `default_directives` when `RUST_LOG` is unset.
#[cfg(feature = "subscriber")]
#[cfg_attr(docsrs, doc(cfg(feature = "subscriber")))]
pub fn init_tracing(default_directives: &str) -> crate::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| crate::Error::Config(format!("Failed to install tracing subscriber: {}", e)))
}
