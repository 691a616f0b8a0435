use crate::db::models::Notification;
use crate::db::KeyValueStore;
use crate::error::AppResult;

use super::load_or_default;

pub const NOTIFICATIONS_KEY: &str = "calendar_notifications";

// ============================================================================
// Notification Log Repository
// ============================================================================

pub struct NotificationLogRepository;

impl NotificationLogRepository {
    /// Stored notifications in whatever order they were written.
    pub async fn load(store: &dyn KeyValueStore) -> Vec<Notification> {
        load_or_default(store, NOTIFICATIONS_KEY).await
    }

    pub async fn save(store: &dyn KeyValueStore, entries: &[Notification]) -> AppResult<()> {
        let raw = serde_json::to_string(entries)?;
        store.save(NOTIFICATIONS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NotificationKind;
    use crate::db::MemoryStore;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn corrupt_log_is_replaced_by_empty() {
        let store = MemoryStore::new();
        store.save(NOTIFICATIONS_KEY, "[{\"id\": 3}]").await.unwrap();
        assert!(NotificationLogRepository::load(&store).await.is_empty());
    }

    #[tokio::test]
    async fn kind_is_stored_in_snake_case() {
        let store = MemoryStore::new();
        let at = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let n = Notification::daily_summary("Good morning!".to_string(), at);
        NotificationLogRepository::save(&store, std::slice::from_ref(&n))
            .await
            .unwrap();

        let raw = store.load(NOTIFICATIONS_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"daily_summary\""));

        let loaded = NotificationLogRepository::load(&store).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].kind, NotificationKind::DailySummary);
        assert_eq!(loaded[0].event_id, None);
    }
}
