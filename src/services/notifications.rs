use crate::db::{Notification, NotificationKind};

pub const DEFAULT_LOG_CAPACITY: usize = 20;

/// Bounded, most-recent-first log of notifications.
///
/// - New entries go to the front; once the log exceeds its capacity the
///   oldest entries are dropped.
/// - At most one `EventReminder` per event id can be held at a time. A second
///   reminder for the same event is refused when it is appended.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: Vec<Notification>,
    capacity: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a log from stored entries, which may be in any order.
    pub fn from_entries(mut entries: Vec<Notification>, capacity: usize) -> Self {
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut log = Self::new(capacity);
        // Oldest first, so that duplicates keep the earliest reminder.
        for entry in entries.into_iter().rev() {
            log.append(entry);
        }
        log
    }

    pub fn contains_reminder_for(&self, event_id: &str) -> bool {
        self.entries.iter().any(|n| {
            n.kind == NotificationKind::EventReminder && n.event_id.as_deref() == Some(event_id)
        })
    }

    /// Insert at the front. Returns `false` when refused as a duplicate reminder.
    pub fn append(&mut self, notification: Notification) -> bool {
        if notification.kind == NotificationKind::EventReminder {
            if let Some(ref event_id) = notification.event_id {
                if self.contains_reminder_for(event_id) {
                    tracing::debug!("Suppressing duplicate reminder for event {}", event_id);
                    return false;
                }
            }
        }

        self.entries.insert(0, notification);
        self.entries.truncate(self.capacity);
        true
    }

    /// Remove one entry. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries ordered by creation time, newest first.
    pub fn list_by_recency(&self) -> Vec<Notification> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
    }

    /// Entries in storage order.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
