//! Configuration types.

use std::time::Duration;

/// Unsubscribe engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-attempt HTTP timeout. Each POST/GET gets its own budget.
    pub http_timeout: Duration,
    /// Maximum redirects to follow per request.
    pub max_redirects: usize,
    /// User-Agent sent on unsubscribe requests.
    pub user_agent: String,
    /// Allow requests to loopback/private hosts. Never enable outside
    /// tests — it disables the SSRF guard.
    pub allow_private_hosts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(10),
            max_redirects: 10,
            user_agent: concat!("unsub-engine/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_private_hosts: false,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Recognized: `UNSUB_HTTP_TIMEOUT_SECS`, `UNSUB_MAX_REDIRECTS`,
    /// `UNSUB_USER_AGENT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let http_timeout = std::env::var("UNSUB_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        let max_redirects = std::env::var("UNSUB_MAX_REDIRECTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_redirects);

        let user_agent =
            std::env::var("UNSUB_USER_AGENT").unwrap_or(defaults.user_agent);

        Self {
            http_timeout,
            max_redirects,
            user_agent,
            allow_private_hosts: false,
        }
    }
}
