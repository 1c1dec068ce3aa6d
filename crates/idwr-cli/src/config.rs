//! Configuration resolution.
//!
//! Precedence, lowest first: built-in defaults, `config.toml` in the
//! platform config directory, `IDWR_CACHE_DIR`/`IDWR_DATA_DIR`, and
//! command-line flags.
//! - Linux: ~/.config/idwr/config.toml
//! - macOS: ~/Library/Application Support/jp.idwr.idwr/config.toml
//! - Windows: %APPDATA%/idwr/idwr/config/config.toml

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use idwr_model::IdwrConfig;

const APP_QUALIFIER: &str = "jp";
const APP_ORG: &str = "idwr";
const APP_NAME: &str = "idwr";
const CONFIG_FILENAME: &str = "config.toml";

pub const CACHE_DIR_ENV: &str = "IDWR_CACHE_DIR";
pub const DATA_DIR_ENV: &str = "IDWR_DATA_DIR";

/// Path of the user config file, if the platform has a config directory.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Reads `path`, falling back to defaults when it is missing or invalid.
pub fn load_config_file(path: &Path) -> IdwrConfig {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                IdwrConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            IdwrConfig::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config file, using defaults");
            IdwrConfig::default()
        }
    }
}

/// Applies directory overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: IdwrConfig, lookup: F) -> IdwrConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        config.cache_dir = PathBuf::from(dir);
    }
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        config.data_dir = PathBuf::from(dir);
    }
    config
}

/// Full resolution for a CLI run.
pub fn resolve_config(data_dir: Option<&Path>) -> IdwrConfig {
    let config = match config_path() {
        Some(path) => load_config_file(&path),
        None => {
            tracing::warn!("could not determine config directory, using defaults");
            IdwrConfig::default()
        }
    };
    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    match data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_file(&dir.path().join(CONFIG_FILENAME));
        assert_eq!(config, IdwrConfig::default());
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "retries = \"many\"").unwrap();
        assert_eq!(load_config_file(&path), IdwrConfig::default());
    }

    #[test]
    fn file_values_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "data_dir = \"/srv/idwr\"\nrate_limit_per_minute = 10\n").unwrap();
        let config = load_config_file(&path);
        assert_eq!(config.data_dir, PathBuf::from("/srv/idwr"));
        assert_eq!(config.rate_limit_per_minute, 10);
    }

    #[test]
    fn environment_overrides_directories() {
        let config = apply_env_overrides(IdwrConfig::default(), |name| match name {
            DATA_DIR_ENV => Some("/tmp/data".to_string()),
            CACHE_DIR_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/tmp/data"));
        assert_eq!(config.cache_dir, IdwrConfig::default().cache_dir);
    }
}
