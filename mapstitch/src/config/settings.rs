//! Settings structs loaded from the configuration file.

use std::collections::BTreeMap;

use super::stitcher::StitcherConfig;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default idle connections kept per tile host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Default User-Agent string for tile requests.
/// Some tile servers (e.g. OpenStreetMap) reject requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("mapstitch/", env!("CARGO_PKG_VERSION"));

/// Default listen address for `mapstitch serve`.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default output size for size-driven requests without `w`/`h`.
pub const DEFAULT_WIDTH: u32 = 1500;
pub const DEFAULT_HEIGHT: u32 = 1000;

/// HTTP transport settings, applied once when the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
        }
    }
}

/// Everything read from `config.ini`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub stitch: StitcherConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
    /// Provider key → URL template, overriding the built-in registry
    pub providers: BTreeMap<String, String>,
}
