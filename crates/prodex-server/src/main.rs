mod api;
mod scheduler;
mod worker;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(prodex_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = prodex_db::PoolConfig::from_app_config(&config);
    let pool = prodex_db::connect_pool(&config.database_url, pool_config).await?;
    prodex_db::run_migrations(&pool).await?;

    let scraper = Arc::new(prodex_scraper::ProductScraper::from_app_config(&config)?);

    let _scheduler = scheduler::build_scheduler(pool.clone(), Arc::clone(&config)).await?;
    tokio::spawn(worker::run(
        pool.clone(),
        Arc::clone(&scraper),
        config.worker_poll_interval_ms,
    ));

    let app = build_app(AppState { pool, scraper });

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
