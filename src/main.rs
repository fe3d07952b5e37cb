//! Server entry point: config, database, table provisioning, HTTP listener.

use std::sync::Arc;
use student_records::{
    app, ensure_database_exists, ensure_students_table, AppState, Config, PgStudentStore,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("student_records=info,tower_http=info")),
        )
        .init();

    // Request panics are turned into 500s by the router; this covers everything else.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "uncaught panic");
    }));

    let config = Config::from_env()?;

    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    ensure_students_table(&pool, &config.database_schema).await?;

    let store = PgStudentStore::new(pool, &config.database_schema);
    let state = AppState::new(Arc::new(store));

    let listener = TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
