//! Single-user calendar planner: event reminders, a bounded notification log
//! and a once-a-day morning digest with the local weather.
//!
//! [`Planner`] is the entry point. It is backed by a [`KeyValueStore`] and a
//! [`WeatherProvider`]; background polling lives in [`services::init`].

pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use config::Config;
pub use db::{Event, EventForm, KeyValueStore, MemoryStore, Notification, NotificationKind, Settings, SqliteStore};
pub use error::{AppError, AppResult};
pub use services::calendar::VisibleMonth;
pub use services::clock::{Clock, ManualClock, SystemClock};
pub use services::planner::{Planner, WeatherState};
pub use services::weather::{GeoWeatherClient, WeatherProvider, WeatherSnapshot};
