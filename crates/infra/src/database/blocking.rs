//! Running rusqlite work off the async runtime

use std::sync::Arc;

use routinely_common::storage::SqliteConnection;
use routinely_domain::Result;
use tokio::task;

use super::manager::DbManager;
use crate::errors::map_join_error;

/// Run `op` on a pooled connection inside `spawn_blocking`.
pub(crate) async fn with_connection<T, F>(db: &Arc<DbManager>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || {
        let mut conn = db.get_connection()?;
        op(&mut conn)
    })
    .await
    .map_err(map_join_error)?
}
