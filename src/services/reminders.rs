use chrono::NaiveDateTime;

use crate::db::{Event, Notification};
use crate::services::notifications::NotificationLog;

/// Decides which events have crossed their due instant and turns each of
/// them into exactly one reminder.
///
/// The scheduler is pure: it works on the collections handed to it and leaves
/// persistence to the caller. Every due event is handled on the same pass, so
/// a delayed poll fires the whole backlog at once.
pub struct ReminderScheduler;

impl ReminderScheduler {
    /// Emit reminders for due events into `log` and mark those events notified.
    ///
    /// Returns the ids of the events that were marked. An event whose reminder
    /// is already present in the log is still marked, without a second entry.
    pub fn run(events: &mut [Event], log: &mut NotificationLog, now: NaiveDateTime) -> Vec<String> {
        let mut fired = Vec::new();

        for event in events.iter_mut().filter(|e| e.is_due(now)) {
            let message = event.reminder_message();
            let notification = Notification::event_reminder(&event.id, message, now);

            if log.append(notification) {
                tracing::info!("Reminder fired for event {} ({})", event.id, event.title);
            }
            event.notified = true;
            fired.push(event.id.clone());
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NotificationKind;
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn event(id: &str, title: &str, hour: u32, minute: u32) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            message: format!("{title} now"),
            phone_number: None,
            notified: false,
            color: "pink".to_string(),
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn standup_fires_after_its_time() {
        let mut events = vec![event("s", "Standup", 9, 0)];
        let mut log = NotificationLog::default();

        let fired = ReminderScheduler::run(&mut events, &mut log, at(9, 1));

        assert_eq!(fired, vec!["s".to_string()]);
        assert!(events[0].notified);
        let entries = log.list_by_recency();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Reminder for \"Standup\": Standup now");
        assert_eq!(entries[0].kind, NotificationKind::EventReminder);
        assert_eq!(entries[0].event_id.as_deref(), Some("s"));
    }

    #[test]
    fn future_events_are_left_alone() {
        let mut events = vec![event("later", "Lunch", 13, 0)];
        let mut log = NotificationLog::default();

        assert!(ReminderScheduler::run(&mut events, &mut log, at(9, 1)).is_empty());
        assert!(!events[0].notified);
        assert!(log.is_empty());
    }

    #[test]
    fn delayed_poll_fires_whole_backlog() {
        let mut events = vec![
            event("a", "A", 7, 0),
            event("b", "B", 8, 30),
            event("c", "C", 9, 0),
            event("d", "D", 23, 0),
        ];
        let mut log = NotificationLog::default();

        let fired = ReminderScheduler::run(&mut events, &mut log, at(10, 0));
        assert_eq!(fired.len(), 3);
        assert_eq!(log.len(), 3);
        for id in ["a", "b", "c"] {
            assert!(log.contains_reminder_for(id));
        }
        assert!(!events[3].notified);
    }

    #[test]
    fn second_pass_emits_nothing() {
        let mut events = vec![event("s", "Standup", 9, 0)];
        let mut log = NotificationLog::default();

        ReminderScheduler::run(&mut events, &mut log, at(9, 1));
        let again = ReminderScheduler::run(&mut events, &mut log, at(9, 2) + Duration::hours(5));

        assert!(again.is_empty());
        assert_eq!(log.len(), 1);
        assert!(events[0].notified);
    }

    #[test]
    fn existing_reminder_marks_without_duplicating() {
        let mut events = vec![event("s", "Standup", 9, 0)];
        let mut log = NotificationLog::default();
        log.append(Notification::event_reminder("s", "earlier".into(), at(9, 0)));

        let fired = ReminderScheduler::run(&mut events, &mut log, at(9, 1));
        assert_eq!(fired, vec!["s".to_string()]);
        assert!(events[0].notified);
        assert_eq!(log.len(), 1);
        assert_eq!(log.list_by_recency()[0].message, "earlier");
    }
}
