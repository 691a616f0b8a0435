use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch, RwLock};

use crate::config::Config;
use crate::db::{
    Event, EventForm, EventRepository, KeyValueStore, Notification, NotificationLogRepository,
    Settings, SettingsRepository, EVENT_COLORS,
};
use crate::error::{AppError, AppResult};
use crate::services::calendar::VisibleMonth;
use crate::services::clock::Clock;
use crate::services::daily_summary::DailySummaryScheduler;
use crate::services::notifications::NotificationLog;
use crate::services::reminders::ReminderScheduler;
use crate::services::validation::Validator;
use crate::services::weather::{fetch_weather, WeatherProvider, WeatherSnapshot};

/// What the weather panel should show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeatherState {
    pub snapshot: Option<WeatherSnapshot>,
    pub error: Option<String>,
    /// Stable code for `error`, e.g. `CITY_NOT_FOUND`.
    pub error_code: Option<&'static str>,
    pub loading: bool,
}

#[derive(Debug)]
struct PlannerState {
    events: Vec<Event>,
    notifications: NotificationLog,
    settings: Settings,
    weather: WeatherState,
    visible_month: VisibleMonth,
}

struct PlannerInner {
    state: RwLock<PlannerState>,
    store: Arc<dyn KeyValueStore>,
    weather: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
    validator: Validator,
    daily_summary: DailySummaryScheduler,
    city_tx: watch::Sender<Option<String>>,
    notification_tx: broadcast::Sender<Notification>,
}

/// Application controller: owns events, notifications, settings and the
/// current weather, and exposes the only mutation entry points.
///
/// Every mutation runs under one write lock and is persisted before it
/// becomes visible, so a failed store write leaves the in-memory state as it
/// was. Cloning a `Planner` is cheap and shares the same state.
#[derive(Clone)]
pub struct Planner {
    inner: Arc<PlannerInner>,
}

impl Planner {
    /// Load persisted state and build the planner. Corrupt records fall back
    /// to empty defaults.
    ///
    /// With a stored city the weather starts out loading and the daily summary
    /// waits on it: spawn the background workers or call `refresh_weather`.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        weather: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> AppResult<Self> {
        let phone = config
            .validation
            .phone_regex()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let events = EventRepository::load_all(store.as_ref()).await;
        let stored_notifications = NotificationLogRepository::load(store.as_ref()).await;
        let settings = SettingsRepository::load(store.as_ref()).await;
        let notifications =
            NotificationLog::from_entries(stored_notifications, config.notifications.log_capacity);

        tracing::info!(
            "Loaded {} event(s), {} notification(s); configured={}",
            events.len(),
            notifications.len(),
            settings.is_configured()
        );

        let (city_tx, _) = watch::channel(settings.city.clone());
        let (notification_tx, _) = broadcast::channel(64);
        let visible_month = VisibleMonth::containing(clock.now().date());
        // A configured city means a fetch is about to be requested.
        let weather_state = WeatherState {
            loading: settings.city.is_some(),
            ..WeatherState::default()
        };

        Ok(Self {
            inner: Arc::new(PlannerInner {
                state: RwLock::new(PlannerState {
                    events,
                    notifications,
                    settings,
                    weather: weather_state,
                    visible_month,
                }),
                store,
                weather,
                clock,
                validator: Validator::new(phone),
                daily_summary: DailySummaryScheduler::new(config.scheduler.daily_summary_time),
                city_tx,
                notification_tx,
            }),
        })
    }

    fn store(&self) -> &dyn KeyValueStore {
        self.inner.store.as_ref()
    }

    fn publish(&self, notifications: &[Notification]) {
        for n in notifications {
            // No subscribers is fine.
            let _ = self.inner.notification_tx.send(n.clone());
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn events(&self) -> Vec<Event> {
        self.inner.state.read().await.events.clone()
    }

    /// Notifications, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.state.read().await.notifications.list_by_recency()
    }

    pub async fn settings(&self) -> Settings {
        self.inner.state.read().await.settings.clone()
    }

    pub async fn weather(&self) -> WeatherState {
        self.inner.state.read().await.weather.clone()
    }

    pub async fn visible_month(&self) -> VisibleMonth {
        self.inner.state.read().await.visible_month
    }

    pub async fn events_in_visible_month(&self) -> Vec<Event> {
        let state = self.inner.state.read().await;
        state
            .visible_month
            .events(&state.events)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Notifications as they are emitted, for a presentation layer that
    /// wants pushes instead of polling.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notification_tx.subscribe()
    }

    /// Changes of the configured city; drives the weather worker.
    pub fn subscribe_city(&self) -> watch::Receiver<Option<String>> {
        self.inner.city_tx.subscribe()
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    /// Validate and store a new event. An event that is already due fires on
    /// the spot once the planner is configured.
    pub async fn add_event(&self, form: &EventForm) -> AppResult<Event> {
        let data = self.inner.validator.event(form)?;

        let event = {
            let mut state = self.inner.state.write().await;
            let event = Event {
                id: uuid::Uuid::new_v4().to_string(),
                title: data.title,
                date: data.date,
                time: data.time,
                message: data.message,
                phone_number: data.phone_number,
                notified: false,
                color: EVENT_COLORS[state.events.len() % EVENT_COLORS.len()].to_string(),
            };

            let mut events = state.events.clone();
            events.push(event.clone());
            EventRepository::save_all(self.store(), &events).await?;
            state.events = events;
            event
        };

        tracing::info!("Added event {} ({}) on {} {}", event.id, event.title, event.date, event.time);
        self.run_schedulers().await;
        Ok(event)
    }

    pub async fn set_phone_number(&self, raw: &str) -> AppResult<()> {
        let phone = self.inner.validator.phone_number(raw)?;

        let became_configured = {
            let mut state = self.inner.state.write().await;
            let was_configured = state.settings.is_configured();
            SettingsRepository::save_phone_number(self.store(), &phone).await?;
            state.settings.phone_number = Some(phone);
            !was_configured && state.settings.is_configured()
        };

        tracing::info!("Phone number updated");
        if became_configured {
            self.run_schedulers().await;
        }
        Ok(())
    }

    /// Store a new city, drop the old weather and request a fresh fetch.
    pub async fn set_city(&self, raw: &str) -> AppResult<()> {
        let city = self.inner.validator.city(raw)?;

        let became_configured = {
            let mut state = self.inner.state.write().await;
            let was_configured = state.settings.is_configured();
            SettingsRepository::save_city(self.store(), &city).await?;
            state.settings.city = Some(city.clone());
            state.weather = WeatherState {
                loading: true,
                ..WeatherState::default()
            };
            !was_configured && state.settings.is_configured()
        };

        tracing::info!("City set to {}", city);
        self.inner.city_tx.send_replace(Some(city));
        if became_configured {
            self.run_schedulers().await;
        }
        Ok(())
    }

    /// Remove one notification. Returns whether it existed.
    pub async fn dismiss_notification(&self, id: &str) -> AppResult<bool> {
        let mut state = self.inner.state.write().await;
        let mut log = state.notifications.clone();
        if !log.remove(id) {
            return Ok(false);
        }
        NotificationLogRepository::save(self.store(), log.entries()).await?;
        state.notifications = log;
        Ok(true)
    }

    pub async fn clear_all_notifications(&self) -> AppResult<()> {
        let mut state = self.inner.state.write().await;
        NotificationLogRepository::save(self.store(), &[]).await?;
        state.notifications.clear();
        tracing::info!("Cleared all notifications");
        Ok(())
    }

    pub async fn change_visible_month(&self, delta: i32) -> VisibleMonth {
        let mut state = self.inner.state.write().await;
        state.visible_month = state.visible_month.shifted(delta);
        state.visible_month
    }

    pub async fn go_to_today(&self) -> VisibleMonth {
        let today = self.inner.clock.now().date();
        let mut state = self.inner.state.write().await;
        state.visible_month = VisibleMonth::containing(today);
        state.visible_month
    }

    // ------------------------------------------------------------------
    // Schedulers
    // ------------------------------------------------------------------

    /// One poll: reminders, then the daily summary. Failures are logged and
    /// retried on the next poll.
    pub async fn run_schedulers(&self) {
        if let Err(e) = self.tick_reminders().await {
            tracing::warn!("Reminder check failed, will retry on next tick: {}", e);
        }
        if let Err(e) = self.tick_daily_summary().await {
            tracing::warn!("Daily summary check failed, will retry on next tick: {}", e);
        }
    }

    /// Fire reminders for every due event. Returns how many events were marked.
    ///
    /// The notification log is written before the events. If the event write
    /// fails, the reminders stay in the log but the events remain unnotified;
    /// the next tick marks them without emitting a second reminder.
    pub async fn tick_reminders(&self) -> AppResult<usize> {
        let mut state = self.inner.state.write().await;
        if !state.settings.is_configured() {
            return Ok(0);
        }

        let now = self.inner.clock.now();
        let mut events = state.events.clone();
        let mut log = state.notifications.clone();
        let before: Vec<String> = log.entries().iter().map(|n| n.id.clone()).collect();

        let fired = ReminderScheduler::run(&mut events, &mut log, now);
        tracing::debug!("Reminder tick at {}: {} due", now, fired.len());
        if fired.is_empty() {
            return Ok(0);
        }

        NotificationLogRepository::save(self.store(), log.entries()).await?;
        let emitted: Vec<Notification> = log
            .entries()
            .iter()
            .filter(|n| !before.contains(&n.id))
            .cloned()
            .collect();
        state.notifications = log;
        self.publish(&emitted);

        EventRepository::save_all(self.store(), &events).await?;
        state.events = events;

        Ok(fired.len())
    }

    /// Emit the daily digest if due. Returns whether one was emitted.
    ///
    /// While a weather fetch is in flight the digest is held back; the fetch
    /// outcome re-runs this check. A failed fetch yields a digest without the
    /// weather line.
    pub async fn tick_daily_summary(&self) -> AppResult<bool> {
        let mut state = self.inner.state.write().await;
        if !state.settings.is_configured() {
            return Ok(false);
        }
        if state.weather.loading {
            tracing::debug!("Daily summary deferred until weather lookup completes");
            return Ok(false);
        }

        let now = self.inner.clock.now();
        let Some(summary) = self.inner.daily_summary.evaluate(
            now,
            &state.settings,
            state.weather.snapshot.as_ref(),
            &state.events,
        ) else {
            return Ok(false);
        };

        let mut log = state.notifications.clone();
        log.append(summary.clone());
        NotificationLogRepository::save(self.store(), log.entries()).await?;
        state.notifications = log;
        state.settings.last_daily_summary_sent_at = Some(now);
        self.publish(std::slice::from_ref(&summary));
        tracing::info!("Daily summary emitted at {}", now);

        if let Err(e) = SettingsRepository::save_last_daily_summary_sent_at(self.store(), now).await {
            // Marker is set in memory; only a restart before the next
            // successful write could repeat today's summary.
            tracing::warn!("Failed to persist daily summary marker: {}", e);
        }

        Ok(true)
    }

    // ------------------------------------------------------------------
    // Weather
    // ------------------------------------------------------------------

    /// Geocode and fetch the forecast for the current city. No lock is held
    /// while the lookups run. The outcome is applied only if the city has not
    /// changed in the meantime.
    pub async fn refresh_weather(&self) {
        let city = {
            let mut state = self.inner.state.write().await;
            let Some(city) = state.settings.city.clone() else {
                return;
            };
            state.weather.loading = true;
            city
        };

        tracing::info!("Fetching weather for {}", city);
        let result = fetch_weather(self.inner.weather.as_ref(), &city).await;

        if self.apply_weather_result(&city, result).await {
            // The digest may have been waiting on this lookup.
            if let Err(e) = self.tick_daily_summary().await {
                tracing::warn!("Daily summary check after weather update failed: {}", e);
            }
        }
    }

    /// Install a fetch outcome for `requested_city`. Returns `false` when the
    /// result is stale and was discarded.
    pub async fn apply_weather_result(
        &self,
        requested_city: &str,
        result: AppResult<WeatherSnapshot>,
    ) -> bool {
        let mut state = self.inner.state.write().await;
        if state.settings.city.as_deref() != Some(requested_city) {
            tracing::debug!("Discarding weather for {}; city has changed", requested_city);
            return false;
        }

        state.weather = match result {
            Ok(snapshot) => {
                tracing::info!(
                    "Weather for {}: {}, {}..{}",
                    requested_city,
                    snapshot.description,
                    snapshot.min_temp,
                    snapshot.max_temp
                );
                WeatherState {
                    snapshot: Some(snapshot),
                    ..WeatherState::default()
                }
            }
            Err(e) => {
                if e.is_weather_error() {
                    tracing::warn!("Weather lookup for {} failed: {}", requested_city, e);
                } else {
                    tracing::error!("Unexpected error during weather lookup for {}: {:?}", requested_city, e);
                }
                WeatherState {
                    snapshot: None,
                    error: Some(e.to_string()),
                    error_code: Some(e.code()),
                    loading: false,
                }
            }
        };
        true
    }
}
