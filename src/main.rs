use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use daily_planner::services::init;
use daily_planner::{Config, GeoWeatherClient, Planner, SqliteStore, SystemClock};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "daily_planner=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn wait_for_signal() -> std::io::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = ctrl_c => res?,
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading LOG_FORMAT / RUST_LOG
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!("Starting daily planner");

    let pool = init::init_db(&config).await?;
    let store = Arc::new(SqliteStore::new(pool.clone()));
    let weather = Arc::new(GeoWeatherClient::new(&config.weather)?);
    let planner = Planner::load(store, weather, Arc::new(SystemClock), &config).await?;

    let settings = planner.settings().await;
    if !settings.is_configured() {
        tracing::warn!("Phone number and city are not both set; reminders stay idle until they are");
    }

    let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    let mut bg_handles = init::spawn_background_workers(planner.clone(), &config, shutdown_tx.clone());

    // Surface notifications in the log; this host has no other display.
    {
        let mut notifications = planner.subscribe_notifications();
        let mut shutdown_rx = shutdown_tx.subscribe();
        bg_handles.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    received = notifications.recv() => match received {
                        Ok(n) => tracing::info!(kind = n.kind.as_str(), "{}", n.message),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Notification listener skipped {} entries", skipped);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        }));
    }

    if let Err(e) = wait_for_signal().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, notifying background workers");
    let _ = shutdown_tx.send(());

    let shutdown_wait = Duration::from_secs(15);
    tracing::info!(
        "Waiting up to {}s for background workers to exit",
        shutdown_wait.as_secs()
    );
    let bg_wait = async {
        for h in bg_handles {
            let _ = h.await;
        }
    };
    if tokio::time::timeout(shutdown_wait, bg_wait).await.is_err() {
        tracing::warn!("Background workers did not exit in time");
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
