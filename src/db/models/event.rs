use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Display tags assigned to events in creation order.
pub const EVENT_COLORS: [&str; 6] = ["pink", "rose", "purple", "red", "fuchsia", "indigo"];

/// A user-scheduled reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub notified: bool,
    #[serde(default)]
    pub color: String,
}

impl Event {
    /// Local instant at which the reminder becomes due.
    pub fn due_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        !self.notified && self.due_at() <= now
    }

    /// `Reminder for "<title>"[ to <phone>]: <message>`
    pub fn reminder_message(&self) -> String {
        let mut message = format!("Reminder for \"{}\"", self.title);
        if let Some(ref phone) = self.phone_number {
            message.push_str(" to ");
            message.push_str(phone);
        }
        message.push_str(": ");
        message.push_str(&self.message);
        message
    }
}

/// Validated data for a new event; id, color and `notified` are assigned by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub message: String,
    pub phone_number: Option<String>,
}

/// Raw event form as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventForm {
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub message: String,
    pub phone_number: Option<String>,
}

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
