//! Configuration and directory resolution for the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cs_core::config::AppConfig;
use cs_core::ports::{AppDirs, AppDirsPort};
use cs_infra::config::{default_config_path, load_config};
use cs_platform::DirsAppDirsAdapter;

/// Read the config file, `explicit` first, else the platform default.
///
/// No file at the resolved path means defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => return Ok(AppConfig::default()),
        },
    };
    load_config(&path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Where history and logs live: `storage.data_dir` when set, else the
/// platform data directory.
pub fn resolve_app_dirs(config: &AppConfig, dirs_port: &dyn AppDirsPort) -> Result<AppDirs> {
    if config.storage.has_custom_data_dir() {
        return Ok(AppDirs {
            data_root: expand_home(&config.storage.data_dir),
        });
    }
    dirs_port
        .get_app_dirs()
        .context("Failed to resolve the application data directory")
}

pub fn resolve_default_app_dirs(config: &AppConfig) -> Result<AppDirs> {
    resolve_app_dirs(config, &DirsAppDirsAdapter::new())
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
