pub mod models;
pub mod repository;
pub mod store;

pub use models::*;
pub use repository::{EventRepository, NotificationLogRepository, SettingsRepository};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
