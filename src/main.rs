use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod config;
mod database;
mod errors;
mod models;
mod routes;
mod store;

use config::AppConfig;
use errors::StartupError;
use routes::AppState;
use store::Stores;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // .env first so RUST_LOG and friends are visible to the subscriber
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("budgetfly=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let stores = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = database::create_database_connection(database_url, &config).await?;
            database::run_migrations(&pool).await?;
            Stores::postgres(pool, config.operation_timeout)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Stores::in_memory()
        }
    };

    let app = routes::router(AppState::new(stores, config.operation_timeout));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("server running at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
