use std::env;

use chrono::NaiveTime;
use regex::Regex;
use serde::Deserialize;

/// Regional pattern for 10-digit Indian mobile numbers, optionally prefixed
/// with `+91` and a space or hyphen.
pub const DEFAULT_PHONE_PATTERN: &str = r"^(?:\+91[\-\s]?)?[6-9]\d{9}$";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub weather: WeatherConfig,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding search endpoint, queried with `?q=<city>`.
    pub geocoding_url: String,
    /// Forecast endpoint, queried with latitude/longitude and a one-day horizon.
    pub forecast_url: String,
    /// Per-request timeout for both lookups.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// How often (seconds) the reminder worker evaluates events.
    pub reminder_poll_interval_seconds: u64,
    /// Local time of day after which the daily summary becomes due.
    pub daily_summary_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Maximum number of notifications retained in the log.
    pub log_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub phone_pattern: String,
}

impl ValidationConfig {
    pub fn phone_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.phone_pattern)
            .map_err(|_| ConfigError::InvalidValue("PHONE_NUMBER_PATTERN".to_string()))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let daily_summary_time = match env::var("DAILY_SUMMARY_TIME") {
            Ok(v) => NaiveTime::parse_from_str(v.trim(), "%H:%M")
                .map_err(|_| ConfigError::InvalidValue("DAILY_SUMMARY_TIME".to_string()))?,
            Err(_) => defaults.scheduler.daily_summary_time,
        };

        let log_capacity: usize = parse_env(
            "NOTIFICATION_LOG_CAPACITY",
            defaults.notifications.log_capacity,
        )?;
        if log_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "NOTIFICATION_LOG_CAPACITY".to_string(),
            ));
        }

        let reminder_poll_interval_seconds: u64 = parse_env(
            "REMINDER_POLL_INTERVAL_SECONDS",
            defaults.scheduler.reminder_poll_interval_seconds,
        )?;
        if reminder_poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "REMINDER_POLL_INTERVAL_SECONDS".to_string(),
            ));
        }

        let config = Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_env(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            weather: WeatherConfig {
                geocoding_url: env::var("GEOCODING_URL").unwrap_or(defaults.weather.geocoding_url),
                forecast_url: env::var("FORECAST_URL").unwrap_or(defaults.weather.forecast_url),
                timeout_seconds: parse_env(
                    "WEATHER_TIMEOUT_SECONDS",
                    defaults.weather.timeout_seconds,
                )?,
            },
            scheduler: SchedulerConfig {
                reminder_poll_interval_seconds,
                daily_summary_time,
            },
            notifications: NotificationConfig { log_capacity },
            validation: ValidationConfig {
                phone_pattern: env::var("PHONE_NUMBER_PATTERN")
                    .unwrap_or(defaults.validation.phone_pattern),
            },
        };

        // Fail at startup rather than on the first phone number entered.
        config.validation.phone_regex()?;

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig {
                url: "sqlite://data/planner.db".to_string(),
                max_connections: 5,
            },
            weather: WeatherConfig {
                geocoding_url: "https://geocode.maps.co/search".to_string(),
                forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
                timeout_seconds: 10,
            },
            scheduler: SchedulerConfig {
                reminder_poll_interval_seconds: 60,
                daily_summary_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            },
            notifications: NotificationConfig { log_capacity: 20 },
            validation: ValidationConfig {
                phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_planner_behaviour() {
        let config = Config::default();
        assert_eq!(config.scheduler.reminder_poll_interval_seconds, 60);
        assert_eq!(
            config.scheduler.daily_summary_time,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(config.notifications.log_capacity, 20);
    }

    #[test]
    fn default_phone_pattern_compiles() {
        let re = Config::default().validation.phone_regex().unwrap();
        assert!(re.is_match("+91 9876543210"));
        assert!(!re.is_match("12345"));
    }

    #[test]
    fn broken_phone_pattern_is_rejected() {
        let v = ValidationConfig {
            phone_pattern: "([".to_string(),
        };
        assert!(v.phone_regex().is_err());
    }
}
