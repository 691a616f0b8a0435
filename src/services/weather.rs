use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// WMO weather interpretation codes: (code, description, icon).
const WMO_WEATHER_CODES: &[(i32, &str, &str)] = &[
    (0, "Clear sky", "☀️"),
    (1, "Mainly clear", "🌤️"),
    (2, "Partly cloudy", "🌥️"),
    (3, "Overcast", "☁️"),
    (45, "Fog", "🌫️"),
    (48, "Depositing rime fog", "🌫️❄️"),
    (51, "Light drizzle", "🌦️"),
    (53, "Moderate drizzle", "🌦️"),
    (55, "Dense drizzle", "🌧️"),
    (56, "Light freezing drizzle", "🌦️❄️"),
    (57, "Dense freezing drizzle", "🌧️❄️"),
    (61, "Slight rain", "🌦️"),
    (63, "Moderate rain", "🌧️"),
    (65, "Heavy rain", "🌧️☔"),
    (66, "Light freezing rain", "🌧️❄️"),
    (67, "Heavy freezing rain", "🌧️❄️"),
    (71, "Slight snow fall", "🌨️"),
    (73, "Moderate snow fall", "🌨️❄️"),
    (75, "Heavy snow fall", "❄️☃️"),
    (77, "Snow grains", "❄️"),
    (80, "Slight rain showers", "🌦️"),
    (81, "Moderate rain showers", "🌧️"),
    (82, "Violent rain showers", "⛈️"),
    (85, "Slight snow showers", "🌨️"),
    (86, "Heavy snow showers", "❄️☃️"),
    (95, "Thunderstorm", "⛈️"),
    (96, "Thunderstorm with slight hail", "⛈️雹"),
    (99, "Thunderstorm with heavy hail", "⛈️雹"),
];

pub const UNKNOWN_WEATHER: WeatherCondition = WeatherCondition {
    description: "Unknown weather",
    icon: "❓",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCondition {
    pub description: &'static str,
    pub icon: &'static str,
}

/// Map a WMO code to its description and icon. Unknown codes never fail.
pub fn describe_weather_code(code: i32) -> WeatherCondition {
    WMO_WEATHER_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, description, icon)| WeatherCondition { description, icon })
        .unwrap_or(UNKNOWN_WEATHER)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw single-day forecast as returned by the forecast lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyForecast {
    pub max_temp: f64,
    pub min_temp: f64,
    pub weather_code: i32,
}

/// Weather for the configured city, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub min_temp: i32,
    pub max_temp: i32,
    pub weather_code: i32,
    pub description: String,
    pub icon: String,
    pub city: String,
}

impl WeatherSnapshot {
    pub fn from_forecast(city: &str, forecast: DailyForecast) -> Self {
        let condition = describe_weather_code(forecast.weather_code);
        Self {
            min_temp: round_half_up(forecast.min_temp),
            max_temp: round_half_up(forecast.max_temp),
            weather_code: forecast.weather_code,
            description: condition.description.to_string(),
            icon: condition.icon.to_string(),
            city: city.to_string(),
        }
    }
}

/// Rounds .5 towards positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// The two external lookups behind the weather display.
#[async_trait]
pub trait WeatherProvider: Send + Sync + 'static {
    async fn resolve_coordinates(&self, city: &str) -> AppResult<Coordinates>;
    async fn fetch_forecast(&self, coordinates: Coordinates) -> AppResult<DailyForecast>;
}

/// Geocode `city`, then fetch today's forecast for it. No caching, no retry.
pub async fn fetch_weather(provider: &dyn WeatherProvider, city: &str) -> AppResult<WeatherSnapshot> {
    let coordinates = provider.resolve_coordinates(city).await?;
    tracing::debug!(
        "Resolved {} to ({}, {})",
        city,
        coordinates.latitude,
        coordinates.longitude
    );
    let forecast = provider.fetch_forecast(coordinates).await?;
    Ok(WeatherSnapshot::from_forecast(city, forecast))
}

// ============================================================================
// HTTP implementation
// ============================================================================

#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    lat: Value,
    lon: Value,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
}

/// Providers return coordinates either as JSON numbers or as numeric strings.
fn parse_coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("HTTP status {}", status.as_u16()))
}

/// Geocoding + forecast client over HTTP.
#[derive(Debug, Clone)]
pub struct GeoWeatherClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl GeoWeatherClient {
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for GeoWeatherClient {
    async fn resolve_coordinates(&self, city: &str) -> AppResult<Coordinates> {
        let url = url::Url::parse_with_params(&self.geocoding_url, &[("q", city)])
            .map_err(|e| AppError::Config(format!("Invalid geocoding URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::GeocodingUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Geocoding lookup for {} failed with {}", city, status);
            return Err(AppError::GeocodingUnavailable(status_text(status)));
        }

        let candidates: Vec<GeocodeCandidate> = response
            .json()
            .await
            .map_err(|e| AppError::GeocodingUnavailable(format!("invalid response: {}", e)))?;

        let first = candidates.first().ok_or(AppError::CityNotFound)?;
        match (parse_coordinate(&first.lat), parse_coordinate(&first.lon)) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(AppError::CityNotFound),
        }
    }

    async fn fetch_forecast(&self, coordinates: Coordinates) -> AppResult<DailyForecast> {
        let url = url::Url::parse_with_params(
            &self.forecast_url,
            &[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid forecast URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::WeatherServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Forecast lookup failed with {}", status);
            return Err(AppError::WeatherServiceUnavailable(status_text(status)));
        }

        let body: ForecastResponse = response.json().await.map_err(|e| {
            tracing::warn!("Unreadable forecast response: {}", e);
            AppError::ForecastUnavailable
        })?;

        let daily = body.daily.ok_or(AppError::ForecastUnavailable)?;
        if daily.time.is_empty() {
            return Err(AppError::ForecastUnavailable);
        }

        let first = |v: &[Option<f64>]| v.first().copied().flatten();
        match (
            daily.weather_code.first().copied().flatten(),
            first(daily.temperature_2m_max.as_slice()),
            first(daily.temperature_2m_min.as_slice()),
        ) {
            (Some(weather_code), Some(max_temp), Some(min_temp)) => Ok(DailyForecast {
                max_temp,
                min_temp,
                weather_code,
            }),
            _ => Err(AppError::ForecastUnavailable),
        }
    }
}
