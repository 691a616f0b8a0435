use crate::db::models::Event;
use crate::db::KeyValueStore;
use crate::error::AppResult;

use super::load_or_default;

pub const EVENTS_KEY: &str = "calendar_events";

// ============================================================================
// Event Repository
// ============================================================================

pub struct EventRepository;

impl EventRepository {
    /// All stored events in creation order. A corrupt record yields an empty list.
    pub async fn load_all(store: &dyn KeyValueStore) -> Vec<Event> {
        load_or_default(store, EVENTS_KEY).await
    }

    pub async fn save_all(store: &dyn KeyValueStore, events: &[Event]) -> AppResult<()> {
        let raw = serde_json::to_string(events)?;
        store.save(EVENTS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};

    #[tokio::test]
    async fn missing_record_loads_empty() {
        let store = MemoryStore::new();
        assert!(EventRepository::load_all(&store).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_record_loads_empty() {
        let store = MemoryStore::new();
        store.save(EVENTS_KEY, "{not json").await.unwrap();
        assert!(EventRepository::load_all(&store).await.is_empty());

        // Valid JSON of the wrong shape is treated the same way.
        store.save(EVENTS_KEY, "{\"a\": 1}").await.unwrap();
        assert!(EventRepository::load_all(&store).await.is_empty());
    }

    #[tokio::test]
    async fn saved_events_load_back() {
        let store = MemoryStore::new();
        let event = Event {
            id: "e1".to_string(),
            title: "Dentist".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            time: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            message: "Bring the card".to_string(),
            phone_number: None,
            notified: true,
            color: "rose".to_string(),
        };
        EventRepository::save_all(&store, std::slice::from_ref(&event))
            .await
            .unwrap();

        assert_eq!(EventRepository::load_all(&store).await, vec![event]);
    }
}
