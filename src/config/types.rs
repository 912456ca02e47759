use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Lounge-Atlas
///
/// Every section is optional; an empty file yields the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub directory: DirectoryConfig,
}

/// Crawl pipeline behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Scheme and host of the upstream API (e.g., "https://next.loungebuddy.com")
    pub base_url: String,

    /// Pause after each airport request (milliseconds)
    pub airport_delay_ms: u64,

    /// Pause after each lounge request (milliseconds)
    pub lounge_delay_ms: u64,

    /// Skip items whose record is already stored
    pub skip_existing: bool,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Collapse lounge ids that appear under several airports before stage two
    pub dedupe_lounges: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://next.loungebuddy.com".to_string(),
            airport_delay_ms: 500,
            lounge_delay_ms: 100,
            skip_existing: true,
            request_timeout_secs: 30,
            dedupe_lounges: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the client
    pub name: String,

    /// Version of the client
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "lounge-atlas".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value ("name/version")
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// Record store layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Root directory holding both record kinds
    pub root: PathBuf,

    /// Subdirectory name for airport records
    pub airports_dir: String,

    /// Subdirectory name for lounge records
    pub lounges_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("db"),
            airports_dir: "iata".to_string(),
            lounges_dir: "lounges".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn airports_path(&self) -> PathBuf {
        self.root.join(&self.airports_dir)
    }

    pub fn lounges_path(&self) -> PathBuf {
        self.root.join(&self.lounges_dir)
    }
}

/// Query API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Lifetime of a cached payload (seconds)
    pub cache_ttl_secs: u64,

    /// Radius used by position search when the request omits one (kilometers)
    pub default_radius_km: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            cache_ttl_secs: 3600,
            default_radius_km: 50.0,
        }
    }
}

/// Airport directory source
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// JSON airport table to use instead of the bundled one
    pub path: Option<PathBuf>,
}
