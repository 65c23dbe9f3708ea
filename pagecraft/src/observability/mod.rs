//! Structured logging
//!
//! Pretty output in debug builds, JSON lines in release builds. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for debug builds
pub const DEBUG_FILTER: &str = "debug,pagecraft=trace,hyper=info,reqwest=info";

/// Default filter for release builds
pub const RELEASE_FILTER: &str = "info";

/// Initialize the global subscriber
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> anyhow::Result<()> {
/// pagecraft::observability::init()?;
/// tracing::info!("console started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    init_with_filter(default_filter())
}

/// Initialize the global subscriber with an explicit fallback filter
///
/// Used by the CLI to honour `--verbose`. `RUST_LOG` still takes precedence.
pub fn init_with_filter(fallback: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}

/// The build-dependent fallback filter
#[must_use]
pub const fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        DEBUG_FILTER
    } else {
        RELEASE_FILTER
    }
}

/// First few characters of a token, safe to log
#[must_use]
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}…")
}
