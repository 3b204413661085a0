/// Status store
///
/// Persists the monitored host set and each host's last known status in a
/// local LibSQL (SQLite) file, so a restarted service resumes with the same
/// hosts and states.
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repository;

pub use repository::{Database, DatabaseImpl};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

/// Connections kept by the store pool
const POOL_SIZE: usize = 4;

/// Open the store at `path`, creating the file and schema when missing
pub async fn open_database(path: &Path) -> Result<Arc<dyn Database>> {
    let path_str = path.to_string_lossy();
    let pool = pool::open_pool(&path_str, POOL_SIZE)
        .await
        .with_context(|| format!("failed to open status store at {}", path.display()))?;

    let conn = pool.get().await?;
    migrations::run_migrations(&conn).await?;
    drop(conn);

    Ok(Arc::new(DatabaseImpl::new_from_pool(pool)))
}
