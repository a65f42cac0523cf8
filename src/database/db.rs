use std::{env, future::Future, sync::OnceLock, time::Duration};

use diesel_async::{
    pooled_connection::{
        deadpool::{Object, Pool},
        AsyncDieselConnectionManager,
    },
    AsyncPgConnection,
};
use dotenv::dotenv;

use crate::{bootstrap::settings, meltdown::*};

pub type PgPool = Pool<AsyncPgConnection>;
pub type PgPooledConnection = Object<AsyncPgConnection>;

static DB_POOL: OnceLock<PgPool> = OnceLock::new();

pub fn init_connection_pool() -> Result<(), MeltDown> {
    dotenv().ok();

    let url = env::var("DATABASE_URL").map_err(|e| MeltDown::new(MeltType::EnvironmentError, format!("DATABASE_URL environment variable not found: {}", e)))?;
    let max_size = settings().database.max_pool_size;

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
    let pool = Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| MeltDown::db_connection(format!("Failed to create pool for default database: {}", e)))?;

    DB_POOL
        .set(pool)
        .map_err(|_| MeltDown::new(MeltType::ConfigurationError, "Failed to initialize database pool: already initialized"))
}

pub async fn establish_connection() -> Result<PgPooledConnection, MeltDown> {
    connection_from(DB_POOL.get()).await
}

async fn connection_from(pool: Option<&PgPool>) -> Result<PgPooledConnection, MeltDown> {
    let pool = pool.ok_or_else(|| MeltDown::new(MeltType::DatabaseConnection, "Database pool not initialized"))?;

    pool.get().await.map_err(|e| MeltDown::db_connection(format!("Failed to get connection from default pool: {}", e)))
}

/// Runs a database operation under the configured request timeout.
pub async fn deadline<T, F>(operation: F) -> Result<T, MeltDown>
where
    F: Future<Output = Result<T, MeltDown>>,
{
    let secs = settings().database.request_timeout_secs;
    deadline_after(Duration::from_secs(secs), operation).await
}

pub async fn deadline_after<T, F>(limit: Duration, operation: F) -> Result<T, MeltDown>
where
    F: Future<Output = Result<T, MeltDown>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(MeltDown::timeout("Database operation exceeded the request timeout").with_context("timeout_ms", limit.as_millis().to_string())),
    }
}
