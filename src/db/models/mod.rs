//! Persisted record types.

pub mod event;
pub mod notification;
pub mod settings;

pub use event::{CreateEvent, Event, EventForm, EVENT_COLORS};
pub use notification::{Notification, NotificationKind};
pub use settings::Settings;
