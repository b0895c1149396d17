//! Dependency injection: builds the engine from concrete adapters.

use std::path::Path;
use std::sync::Arc;

use cs_app::{EngineDeps, HistoryEngine, PersistenceGateway};
use cs_core::config::AppConfig;
use cs_core::ports::{AppDirs, HistoryRepositoryPort};
use cs_infra::db::pool::{init_db_pool, DbPool};
use cs_infra::db::DieselSqliteExecutor;
use cs_infra::fs::FsBlobStore;
use cs_infra::{DieselHistoryRepository, SystemClock};
use cs_platform::{NoSourceApplication, RsSystemClipboard};
use tokio::task::JoinHandle;
use tracing::info;

pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    #[error("Clipboard initialization failed: {0}")]
    ClipboardInit(String),
}

/// A wired engine plus the handles the binary manages directly.
pub struct AppRuntime {
    pub engine: HistoryEngine,
    pub clipboard: Arc<RsSystemClipboard>,
    pub persistence_worker: JoinHandle<()>,
}

/// Create the SQLite pool, creating the parent directory first.
fn create_db_pool(db_path: &Path) -> WiringResult<DbPool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            WiringError::DatabaseInit(format!("Failed to create DB directory: {}", e))
        })?;
    }

    let db_url = db_path
        .to_str()
        .ok_or_else(|| WiringError::DatabaseInit("Invalid database path".to_string()))?;

    init_db_pool(db_url)
        .map_err(|e| WiringError::DatabaseInit(format!("Failed to initialize DB: {}", e)))
}

fn create_history_repository(
    config: &AppConfig,
    app_dirs: &AppDirs,
) -> WiringResult<Arc<dyn HistoryRepositoryPort>> {
    let db_path = app_dirs.database_path();
    let pool = create_db_pool(&db_path)?;

    let repo = DieselHistoryRepository::new(
        DieselSqliteExecutor::new(pool),
        FsBlobStore::new(app_dirs.data_root.clone()),
        config.storage.inline_threshold_bytes,
    )
    .with_database_path(db_path);

    Ok(Arc::new(repo))
}

/// Wire every dependency and return the engine.
///
/// Must be called from within a tokio runtime; the persistence worker is
/// spawned here.
pub fn wire_dependencies(config: &AppConfig, app_dirs: &AppDirs) -> WiringResult<AppRuntime> {
    let repo = create_history_repository(config, app_dirs)?;

    let clipboard = RsSystemClipboard::new()
        .map(Arc::new)
        .map_err(|e| WiringError::ClipboardInit(format!("{:#}", e)))?;

    let (persistence, persistence_worker) = PersistenceGateway::spawn(repo);

    let engine = HistoryEngine::new(EngineDeps {
        clipboard: clipboard.clone(),
        source_app: Arc::new(NoSourceApplication),
        persistence,
        clock: Arc::new(SystemClock),
        capacity: config.history.capacity(),
    });

    info!(
        data_root = %app_dirs.data_root.display(),
        capacity = config.history.capacity(),
        "dependencies wired"
    );

    Ok(AppRuntime {
        engine,
        clipboard,
        persistence_worker,
    })
}
