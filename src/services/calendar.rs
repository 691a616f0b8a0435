use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::Event;

/// The month currently shown by the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleMonth {
    pub year: i32,
    /// 1-based.
    pub month: u32,
}

impl VisibleMonth {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Shift by a signed number of months, rolling the year as needed.
    /// Saturates at the first and last months chrono can represent.
    pub fn shifted(self, delta: i32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        let first = Self::containing(NaiveDate::MIN);
        let last = Self::containing(NaiveDate::MAX);

        let year = index.div_euclid(12);
        if year < i64::from(first.year) {
            return first;
        }
        if year > i64::from(last.year) {
            return last;
        }
        Self {
            year: year as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        (28..=31)
            .rev()
            .find(|&day| NaiveDate::from_ymd_opt(self.year, self.month, day).is_some())
            .unwrap_or(0)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Events falling in this month, by date then time.
    pub fn events<'a>(self, events: &'a [Event]) -> Vec<&'a Event> {
        let mut in_month: Vec<&Event> = events.iter().filter(|e| self.contains(e.date)).collect();
        in_month.sort_by_key(|e| (e.date, e.time));
        in_month
    }
}
