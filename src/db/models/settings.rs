use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Scalar user settings. Each field is persisted under its own key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub last_daily_summary_sent_at: Option<NaiveDateTime>,
}

impl Settings {
    /// Both setup steps are done; the schedulers only run past this point.
    pub fn is_configured(&self) -> bool {
        self.phone_number.is_some() && self.city.is_some()
    }
}
