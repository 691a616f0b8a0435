use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// What produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EventReminder,
    DailySummary,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::EventReminder => "event_reminder",
            NotificationKind::DailySummary => "daily_summary",
        }
    }
}

/// A record of something surfaced to the user. `message` is fully rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        message: String,
        event_id: Option<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id,
            message,
            timestamp,
            kind,
        }
    }

    pub fn event_reminder(event_id: &str, message: String, timestamp: NaiveDateTime) -> Self {
        Self::new(
            NotificationKind::EventReminder,
            message,
            Some(event_id.to_string()),
            timestamp,
        )
    }

    pub fn daily_summary(message: String, timestamp: NaiveDateTime) -> Self {
        Self::new(NotificationKind::DailySummary, message, None, timestamp)
    }
}
