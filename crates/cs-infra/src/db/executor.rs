use std::sync::Arc;

use diesel::SqliteConnection;

use crate::db::pool::DbPool;
use crate::db::ports::DbExecutor;

/// Runs closures on pooled connections. Cheap to clone.
#[derive(Clone)]
pub struct DieselSqliteExecutor {
    pool: Arc<DbPool>,
}

impl DieselSqliteExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

impl DbExecutor for DieselSqliteExecutor {
    fn run<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut conn = self.pool.get()?;
        f(&mut conn)
    }
}
