use std::path::PathBuf;

use thiserror::Error;

/// Directories the application stores its state in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub data_root: PathBuf,
}

impl AppDirs {
    pub fn database_path(&self) -> PathBuf {
        self.data_root.join("history.db")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_root.join("logs")
    }
}

#[derive(Debug, Error)]
pub enum AppDirsError {
    #[error("local data directory is unavailable on this system")]
    DataLocalDirUnavailable,
}

pub trait AppDirsPort: Send + Sync {
    fn get_app_dirs(&self) -> Result<AppDirs, AppDirsError>;
}
