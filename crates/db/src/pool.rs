//! Postgres connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::DbError;

pub use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Type alias for the shared Postgres pool used across the whole application.
pub type DbPool = PgPool;

/// Create a new connection pool from the given connect options.
///
/// `max_connections` controls the pool ceiling. The first connection is
/// opened eagerly so an unreachable database fails startup.
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> Result<DbPool, DbError> {
    info!(
        host = options.get_host(),
        database = options.get_database().unwrap_or_default(),
        "Connecting to database (max_connections={})",
        max_connections
    );
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Run embedded SQLx migrations located in `./migrations` (relative to the
/// workspace root at build time).
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("Running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
