use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::config::DEFAULT_PHONE_PATTERN;
use crate::db::{CreateEvent, EventForm};
use crate::error::{AppError, AppResult};

lazy_static::lazy_static! {
    static ref DEFAULT_PHONE_REGEX: Regex =
        Regex::new(DEFAULT_PHONE_PATTERN).expect("default phone pattern is valid");
    static ref TIME_REGEX: Regex = Regex::new(r"^\d{2}:\d{2}$").expect("time pattern is valid");
}

/// Input checks applied at the form boundary. Nothing invalid reaches storage.
#[derive(Debug, Clone)]
pub struct Validator {
    phone: Regex,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            phone: DEFAULT_PHONE_REGEX.clone(),
        }
    }
}

impl Validator {
    pub fn new(phone: Regex) -> Self {
        Self { phone }
    }

    /// Validate a phone number setting. Returns the trimmed value.
    pub fn phone_number(&self, raw: &str) -> AppResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Phone number is required.".to_string()));
        }
        if !self.phone.is_match(trimmed) {
            return Err(AppError::Validation(
                "Please enter a valid 10-digit Indian phone number, optionally starting with +91."
                    .to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Validate a city setting. Returns the trimmed value.
    pub fn city(&self, raw: &str) -> AppResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("City name is required.".to_string()));
        }
        Ok(trimmed.to_string())
    }

    pub fn event(&self, form: &EventForm) -> AppResult<CreateEvent> {
        let title = form.title.trim();
        let message = form.message.trim();
        let date = form.date.trim();
        let time = form.time.trim();

        if title.is_empty() || date.is_empty() || time.is_empty() || message.is_empty() {
            return Err(AppError::Validation(
                "Title, Date, Time, and Message fields are required.".to_string(),
            ));
        }

        if !TIME_REGEX.is_match(time) {
            return Err(AppError::Validation(
                "Invalid time format. Please use HH:MM.".to_string(),
            ));
        }
        let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            AppError::Validation("Invalid time format. Please use HH:MM.".to_string())
        })?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            AppError::Validation("Invalid date format. Please use YYYY-MM-DD.".to_string())
        })?;

        let phone_number = match form.phone_number.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(phone) if self.phone.is_match(phone) => Some(phone.to_string()),
            Some(_) => {
                return Err(AppError::Validation(
                    "Invalid Indian phone number. Please use a 10-digit number, optionally with +91, or leave it blank."
                        .to_string(),
                ))
            }
        };

        Ok(CreateEvent {
            title: title.to_string(),
            date,
            time,
            message: message.to_string(),
            phone_number,
        })
    }
}
