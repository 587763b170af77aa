// src/main.rs

//! Service entry point: wires config, store, scheduler and HTTP server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;

use attachrss::config::Config;
use attachrss::error::Result;
use attachrss::feed::FeedPublisher;
use attachrss::fetch::HttpFetcher;
use attachrss::scheduler::Scheduler;
use attachrss::server;
use attachrss::store::{DedupStore, SqliteStore};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env();
    config.validate()?;

    let store: Arc<dyn DedupStore> = Arc::new(SqliteStore::connect(&config.database_url).await?);
    let fetcher = HttpFetcher::new(&config)?;
    let publisher = FeedPublisher::new(config.feed_path.clone());

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = Scheduler::new(config.clone(), fetcher, store, publisher)?;
    let scheduler_task = tokio::spawn(scheduler.run(stop_rx));

    let app = server::router(config.feed_path.clone());
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    log::info!("Serving feed on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(stop_tx))
        .await?;

    if let Err(e) = scheduler_task.await {
        log::error!("Scheduler task panicked: {e}");
    }

    Ok(())
}

/// Resolves on ctrl-c and flips the scheduler's stop signal so both
/// tasks wind down together.
async fn shutdown_signal(stop_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    log::info!("Shutdown requested");
    let _ = stop_tx.send(true);
}
