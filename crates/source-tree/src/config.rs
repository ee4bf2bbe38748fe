//! Engine configuration.

use std::time::Duration;

/// Timeouts and HTTP identity used when fetching capability documents.
#[derive(Debug, Clone, PartialEq)]
pub struct WebdataConfig {
    /// Timeout for full capability documents
    pub capabilities_timeout: Duration,
    /// Timeout for single-dataset detail requests (WFS DescribeFeatureType)
    pub detail_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for WebdataConfig {
    fn default() -> Self {
        Self {
            capabilities_timeout: Duration::from_secs(30),
            detail_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("webdata-source-tree/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl WebdataConfig {
    /// Defaults overridden by `WEBDATA_*` environment variables.
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            capabilities_timeout: secs(
                "WEBDATA_CAPABILITIES_TIMEOUT_SECS",
                defaults.capabilities_timeout,
            ),
            detail_timeout: secs("WEBDATA_DETAIL_TIMEOUT_SECS", defaults.detail_timeout),
            connect_timeout: secs("WEBDATA_CONNECT_TIMEOUT_SECS", defaults.connect_timeout),
            user_agent: lookup("WEBDATA_USER_AGENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.user_agent),
        }
    }
}
