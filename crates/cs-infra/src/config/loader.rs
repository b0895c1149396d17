use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cs_core::config::AppConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load configuration from a TOML file
///
/// A missing file yields the defaults. Keys that are absent keep their
/// default value; unknown keys are ignored.
pub fn load_config(config_path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Default config location: `<config dir>/clipstack/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clipstack").join("config.toml"))
}
