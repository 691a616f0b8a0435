use chrono::NaiveDateTime;

use crate::db::models::Settings;
use crate::db::KeyValueStore;
use crate::error::AppResult;

use super::load_or_default;

pub const PHONE_NUMBER_KEY: &str = "settings.phone_number";
pub const CITY_KEY: &str = "settings.city";
pub const LAST_DAILY_SUMMARY_KEY: &str = "settings.last_daily_summary_sent_at";

// ============================================================================
// Settings Repository
// ============================================================================

/// Settings are stored as three independent scalar records so that writing
/// one never clobbers another.
pub struct SettingsRepository;

impl SettingsRepository {
    pub async fn load(store: &dyn KeyValueStore) -> Settings {
        Settings {
            phone_number: load_or_default(store, PHONE_NUMBER_KEY).await,
            city: load_or_default(store, CITY_KEY).await,
            last_daily_summary_sent_at: load_or_default(store, LAST_DAILY_SUMMARY_KEY).await,
        }
    }

    pub async fn save_phone_number(store: &dyn KeyValueStore, phone: &str) -> AppResult<()> {
        store
            .save(PHONE_NUMBER_KEY, &serde_json::to_string(phone)?)
            .await
    }

    pub async fn save_city(store: &dyn KeyValueStore, city: &str) -> AppResult<()> {
        store.save(CITY_KEY, &serde_json::to_string(city)?).await
    }

    pub async fn save_last_daily_summary_sent_at(
        store: &dyn KeyValueStore,
        at: NaiveDateTime,
    ) -> AppResult<()> {
        store
            .save(LAST_DAILY_SUMMARY_KEY, &serde_json::to_string(&at)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn empty_store_yields_default_settings() {
        let store = MemoryStore::new();
        assert_eq!(SettingsRepository::load(&store).await, Settings::default());
    }

    #[tokio::test]
    async fn settings_persist_independently() {
        let store = MemoryStore::new();
        let at = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();

        SettingsRepository::save_city(&store, "Pune").await.unwrap();
        SettingsRepository::save_last_daily_summary_sent_at(&store, at)
            .await
            .unwrap();

        let settings = SettingsRepository::load(&store).await;
        assert_eq!(settings.phone_number, None);
        assert_eq!(settings.city.as_deref(), Some("Pune"));
        assert_eq!(settings.last_daily_summary_sent_at, Some(at));
    }

    #[tokio::test]
    async fn corrupt_marker_is_treated_as_unset() {
        let store = MemoryStore::new();
        SettingsRepository::save_city(&store, "Pune").await.unwrap();
        store
            .save(LAST_DAILY_SUMMARY_KEY, "\"yesterday-ish\"")
            .await
            .unwrap();

        let settings = SettingsRepository::load(&store).await;
        assert_eq!(settings.city.as_deref(), Some("Pune"));
        assert_eq!(settings.last_daily_summary_sent_at, None);
    }
}
