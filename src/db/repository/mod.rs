pub mod event_repository;
pub mod notification_log_repository;
pub mod settings_repository;

pub use event_repository::EventRepository;
pub use notification_log_repository::NotificationLogRepository;
pub use settings_repository::SettingsRepository;

use serde::de::DeserializeOwned;

use crate::db::KeyValueStore;
use crate::error::AppError;

/// Load and decode a record, substituting `T::default()` when the record is
/// missing, unreadable or malformed. Anomalies are logged, never returned.
pub(crate) async fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.load(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!("Failed to read stored record {}: {}", key, e);
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            let err = AppError::StorageCorrupt(format!("{}: {}", key, e));
            tracing::warn!("{}; using default value", err);
            T::default()
        }
    }
}
