//! Tracing setup and helpers for keeping secrets out of log output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "completion_proxy=info,tower_http=info";

/// Number of leading characters of a secret that may appear in logs.
const VISIBLE_PREFIX: usize = 4;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Render a credential for logs: a short prefix followed by a mask.
/// Secrets too short to spare a prefix are masked entirely.
#[must_use]
pub fn redact_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= VISIBLE_PREFIX * 2 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{prefix}****")
}
