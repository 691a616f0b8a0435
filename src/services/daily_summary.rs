use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::db::{Event, Notification, Settings};
use crate::services::weather::WeatherSnapshot;

/// Once-per-day digest of weather and today's agenda.
///
/// The summary becomes due once the local clock passes the trigger time and
/// the persisted "last sent" marker predates today's trigger. Because the
/// marker is stored, the check survives restarts.
#[derive(Debug, Clone, Copy)]
pub struct DailySummaryScheduler {
    trigger_time: NaiveTime,
}

impl Default for DailySummaryScheduler {
    fn default() -> Self {
        Self::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
    }
}

impl DailySummaryScheduler {
    pub fn new(trigger_time: NaiveTime) -> Self {
        Self { trigger_time }
    }

    /// Today's trigger instant relative to `now`.
    pub fn threshold(&self, now: NaiveDateTime) -> NaiveDateTime {
        now.date().and_time(self.trigger_time)
    }

    pub fn is_due(&self, now: NaiveDateTime, last_sent: Option<NaiveDateTime>) -> bool {
        let threshold = self.threshold(now);
        now >= threshold && last_sent.map_or(true, |sent| sent < threshold)
    }

    /// Build the digest notification if one is due. Inert without a city.
    pub fn evaluate(
        &self,
        now: NaiveDateTime,
        settings: &Settings,
        weather: Option<&WeatherSnapshot>,
        events: &[Event],
    ) -> Option<Notification> {
        let city = settings.city.as_deref()?;
        if !self.is_due(now, settings.last_daily_summary_sent_at) {
            return None;
        }
        if weather.is_none() {
            tracing::debug!("Daily summary for {} composed without weather", city);
        }

        let message = compose_summary(city, now.date(), weather, events);
        Some(Notification::daily_summary(message, now))
    }
}

/// Digest text: greeting, optional weather line, and today's events by time.
pub fn compose_summary(
    city: &str,
    today: NaiveDate,
    weather: Option<&WeatherSnapshot>,
    events: &[Event],
) -> String {
    let mut summary = format!(
        "Good morning! Daily update for {} ({}):\n",
        city,
        today.format("%Y-%m-%d")
    );

    if let Some(w) = weather {
        summary.push_str(&format!(
            "Weather: {}, {}°C / {}°C {}\n",
            w.description, w.min_temp, w.max_temp, w.icon
        ));
    }

    let mut todays: Vec<&Event> = events.iter().filter(|e| e.date == today).collect();
    todays.sort_by_key(|e| e.time);

    if todays.is_empty() {
        summary.push_str("No events scheduled for today.");
    } else {
        summary.push_str("Today's events:\n");
        for event in todays {
            summary.push_str(&format!(
                "- {} at {}\n",
                event.title,
                event.time.format("%H:%M")
            ));
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NotificationKind;
    use chrono::Duration;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn settings(last: Option<NaiveDateTime>) -> Settings {
        Settings {
            phone_number: Some("9876543210".to_string()),
            city: Some("Pune".to_string()),
            last_daily_summary_sent_at: last,
        }
    }

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            min_temp: 21,
            max_temp: 30,
            weather_code: 95,
            description: "Thunderstorm".to_string(),
            icon: "⛈️".to_string(),
            city: "Pune".to_string(),
        }
    }

    fn event(title: &str, day: u32, hour: u32) -> Event {
        Event {
            id: title.to_lowercase(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            message: "m".to_string(),
            phone_number: None,
            notified: false,
            color: "pink".to_string(),
        }
    }

    #[test]
    fn not_due_before_nine() {
        let s = DailySummaryScheduler::default();
        assert!(!s.is_due(at(15, 8, 59), None));
        assert!(s.is_due(at(15, 9, 0), None));
    }

    #[test]
    fn once_per_day() {
        let s = DailySummaryScheduler::default();
        let sent = at(15, 9, 5);
        assert!(s.is_due(sent, None));
        assert!(!s.is_due(at(15, 9, 6), Some(sent)));
        assert!(!s.is_due(at(15, 23, 59), Some(sent)));
        assert!(!s.is_due(at(16, 8, 59), Some(sent)));
        assert!(s.is_due(at(16, 9, 5), Some(sent)));
    }

    #[test]
    fn marker_from_before_threshold_does_not_block() {
        // Sent early in the morning by an older build: still due after 09:00.
        let s = DailySummaryScheduler::default();
        assert!(s.is_due(at(15, 9, 30), Some(at(15, 8, 0))));
    }

    #[test]
    fn inert_without_city() {
        let s = DailySummaryScheduler::default();
        let mut no_city = settings(None);
        no_city.city = None;
        assert!(s.evaluate(at(15, 10, 0), &no_city, Some(&weather()), &[]).is_none());
    }

    #[test]
    fn digest_with_weather_and_events() {
        let s = DailySummaryScheduler::default();
        let events = vec![
            event("Gym", 15, 18),
            event("Standup", 15, 9),
            event("Tomorrow", 16, 9),
        ];

        let n = s
            .evaluate(at(15, 9, 5), &settings(None), Some(&weather()), &events)
            .unwrap();

        assert_eq!(n.kind, NotificationKind::DailySummary);
        assert_eq!(n.event_id, None);
        assert_eq!(n.timestamp, at(15, 9, 5));
        assert_eq!(
            n.message,
            "Good morning! Daily update for Pune (2026-10-15):\n\
             Weather: Thunderstorm, 21°C / 30°C ⛈️\n\
             Today's events:\n\
             - Standup at 09:00\n\
             - Gym at 18:00\n"
        );
    }

    #[test]
    fn digest_without_events_or_weather() {
        let text = compose_summary("Pune", at(15, 0, 0).date(), None, &[event("X", 14, 9)]);
        assert_eq!(
            text,
            "Good morning! Daily update for Pune (2026-10-15):\nNo events scheduled for today."
        );
    }

    #[test]
    fn threshold_is_relative_to_now() {
        let s = DailySummaryScheduler::new(NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(s.threshold(at(20, 22, 0)), at(20, 7, 30));
        assert_eq!(s.threshold(at(20, 22, 0)) + Duration::days(1), at(21, 7, 30));
    }
}
