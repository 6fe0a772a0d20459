//! Connection pool construction (spec §4.7: opened during startup, before
//! everything else that depends on it).

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::StoreError;

/// Open a Postgres connection pool. Read-only transactions are opened per
/// query (spec §4.3 "the gateway opens transactions in read-only mode"),
/// not at the pool level, so this pool is also usable for any write paths
/// (session/message append) the gateway owns.
///
/// # Errors
///
/// Returns [`StoreError::StoreUnavailable`] if the pool cannot be
/// established within the connect timeout.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .min_connections(2)
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .map_err(|e| StoreError::StoreUnavailable(e.to_string()))
}
