pub mod calendar;
pub mod clock;
pub mod daily_summary;
pub mod init;
pub mod notifications;
pub mod planner;
pub mod reminders;
pub mod validation;
pub mod weather;
