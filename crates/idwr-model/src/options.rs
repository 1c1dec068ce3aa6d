//! Runtime configuration shared by the pipeline and its collaborators.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Pipeline configuration.
///
/// The network fields are consumed by the download collaborator only; the
/// parsers never read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdwrConfig {
    /// Directory where downloaded bulletins are cached.
    pub cache_dir: PathBuf,
    /// Directory holding the persisted stage tables.
    pub data_dir: PathBuf,
    /// Maximum number of HTTP requests per minute.
    pub rate_limit_per_minute: u32,
    /// User-Agent header for HTTP requests.
    pub user_agent: String,
    /// Timeout for HTTP requests in seconds.
    pub timeout_seconds: f64,
    /// Retry attempts for failed requests.
    pub retries: u32,
}

impl Default for IdwrConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            data_dir: PathBuf::from("data"),
            rate_limit_per_minute: 20,
            user_agent: format!("idwr/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30.0,
            retries: 3,
        }
    }
}

impl IdwrConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let config: IdwrConfig = toml::from_str("retries = 5\ndata_dir = \"/srv/idwr\"").unwrap();
        assert_eq!(config.retries, 5);
        assert_eq!(config.data_dir, PathBuf::from("/srv/idwr"));
        assert_eq!(config.rate_limit_per_minute, 20);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = IdwrConfig::new().with_cache_dir("/tmp/idwr");
        let json = serde_json::to_string(&config).unwrap();
        let round: IdwrConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(round, config);
    }
}
