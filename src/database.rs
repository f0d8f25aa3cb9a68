use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

pub type Database = PgPool;

/// Opens the Postgres pool. Acquiring a connection is bounded by the same
/// timeout as a request, so an unreachable database surfaces as a transient
/// failure instead of a hung handler.
pub async fn create_database_connection(
    database_url: &str,
    config: &AppConfig,
) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.operation_timeout)
        .connect(database_url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "database connected"
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &Database) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("migrations applied");
    Ok(())
}
