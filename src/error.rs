#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("City not found or geocoding failed.")]
    CityNotFound,

    #[error("Geocoding API error: {0}")]
    GeocodingUnavailable(String),

    #[error("Weather data not available.")]
    ForecastUnavailable,

    #[error("Weather API error: {0}")]
    WeatherServiceUnavailable(String),

    #[error("Stored data is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for the error, used by the presentation
    /// layer to pick a message or an icon.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::CityNotFound => "CITY_NOT_FOUND",
            AppError::GeocodingUnavailable(_) => "GEOCODING_UNAVAILABLE",
            AppError::ForecastUnavailable => "FORECAST_UNAVAILABLE",
            AppError::WeatherServiceUnavailable(_) => "WEATHER_SERVICE_UNAVAILABLE",
            AppError::StorageCorrupt(_) => "STORAGE_CORRUPT",
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "DATABASE_ERROR"
            }
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "INTERNAL_ERROR"
            }
        }
    }

    /// Errors produced by the geocode → forecast pipeline. These only ever
    /// reach the weather display and never abort anything else.
    pub fn is_weather_error(&self) -> bool {
        matches!(
            self,
            AppError::CityNotFound
                | AppError::GeocodingUnavailable(_)
                | AppError::ForecastUnavailable
                | AppError::WeatherServiceUnavailable(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_errors_are_classified() {
        assert!(AppError::CityNotFound.is_weather_error());
        assert!(AppError::GeocodingUnavailable("Bad Gateway".into()).is_weather_error());
        assert!(AppError::ForecastUnavailable.is_weather_error());
        assert!(AppError::WeatherServiceUnavailable("503".into()).is_weather_error());
        assert!(!AppError::Validation("title".into()).is_weather_error());
        assert!(!AppError::StorageCorrupt("events".into()).is_weather_error());
    }

    #[test]
    fn display_strings_match_weather_panel_messages() {
        assert_eq!(
            AppError::CityNotFound.to_string(),
            "City not found or geocoding failed."
        );
        assert_eq!(
            AppError::GeocodingUnavailable("Service Unavailable".into()).to_string(),
            "Geocoding API error: Service Unavailable"
        );
        assert_eq!(
            AppError::ForecastUnavailable.to_string(),
            "Weather data not available."
        );
        assert_eq!(AppError::CityNotFound.code(), "CITY_NOT_FOUND");
    }
}
