//! Startup helpers:
//! - database connection + migrations
//! - background worker spawn helpers

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::services::planner::Planner;

/// Open the SQLite database and run migrations.
///
/// The parent directory of the database file is created when missing.
pub async fn init_db(config: &Config) -> Result<sqlx::SqlitePool> {
    let db_url = &config.database.url;
    tracing::info!("Connecting to database: {}", db_url);

    let db_path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    let db_file_path = Path::new(db_path);

    if let Some(parent) = db_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }
    }

    let connect_options = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Spawn background workers:
/// - reminder poll: reminders, then the daily summary, once per interval
/// - weather refresh: one fetch per city change
///
/// Each worker listens for shutdown on `shutdown`. The returned handles let
/// the caller wait for them to finish.
pub fn spawn_background_workers(
    planner: Planner,
    config: &Config,
    shutdown: broadcast::Sender<()>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    // Reminder worker
    {
        let mut shutdown_rx = shutdown.subscribe();
        let planner = planner.clone();
        let period = Duration::from_secs(config.scheduler.reminder_poll_interval_seconds);
        handles.push(tokio::spawn(async move {
            // First tick completes immediately.
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Reminder worker shutting down");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                tracing::debug!("Polling reminders and daily summary");
                planner.run_schedulers().await;
            }
        }));
    }

    // Weather worker
    {
        let mut shutdown_rx = shutdown.subscribe();
        let mut city_rx = planner.subscribe_city();
        let planner = planner.clone();
        handles.push(tokio::spawn(async move {
            if city_rx.borrow_and_update().is_some() {
                spawn_weather_refresh(&planner);
            }

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Weather worker shutting down");
                        break;
                    }
                    changed = city_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if city_rx.borrow_and_update().is_some() {
                            spawn_weather_refresh(&planner);
                        }
                    }
                }
            }
        }));
    }

    handles
}

/// Fetches run detached so a slow lookup never delays the next city change.
/// Results for a city that is no longer current are dropped by the planner.
fn spawn_weather_refresh(planner: &Planner) {
    let planner = planner.clone();
    tokio::spawn(async move {
        planner.refresh_weather().await;
    });
}
