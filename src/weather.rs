//! Weather lookup for outdoor tasks.
//!
//! Current conditions come from the OpenWeatherMap current-weather endpoint in
//! metric units. Results are cached per city (case-insensitive) for a fixed
//! time-to-live so re-rendering a list does not hit the API again.

use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::WeatherConfig;
use crate::constants::{
    BAD_WEATHER_CONDITIONS, OPENWEATHER_BASE_URL, OUTDOOR_MAX_TEMP_C, OUTDOOR_MIN_TEMP_C, WEATHER_CACHE_MINUTES,
};
use crate::model::Task;

/// Current conditions for a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherData {
    pub description: String,
    /// Degrees Celsius, rounded
    pub temperature: i64,
    /// Degrees Celsius, rounded
    pub feels_like: i64,
    /// Percent
    pub humidity: i64,
    /// Metres per second, rounded
    pub wind_speed: i64,
    pub icon: String,
    pub is_outdoor_friendly: bool,
}

/// Errors that can occur when looking up the weather.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("City name is required")]
    MissingCity,

    #[error("Weather API key is not configured")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("City \"{0}\" not found")]
    CityNotFound(String),

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("Weather API error: {0}")]
    Api(String),

    #[error("Failed to fetch weather data: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected weather response: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    weather: Vec<Condition>,
    main: MainReadings,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

struct CachedWeather {
    data: WeatherData,
    fetched_at: Instant,
}

/// HTTP client for current weather with a per-city cache.
pub struct WeatherService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    ttl: Duration,
    cache: Mutex<HashMap<String, CachedWeather>>,
}

impl WeatherService {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: OPENWEATHER_BASE_URL.to_string(),
            api_key,
            ttl: Duration::from_secs(WEATHER_CACHE_MINUTES * 60),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(config.api_key())
            .with_base_url(config.base_url.clone())
            .with_cache_ttl(Duration::from_secs(config.cache_minutes * 60))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Current weather for `city`.
    ///
    /// # Errors
    /// See [`WeatherError`]; transport failures are reported as
    /// [`WeatherError::Request`].
    pub async fn get_weather(&self, city: &str) -> Result<WeatherData, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::MissingCity);
        }
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let cache_key = city.to_lowercase();
        if let Some(data) = self.cached(&cache_key).await {
            log::debug!("🌤️  Weather cache hit for {city}");
            return Ok(data);
        }

        let url = Url::parse_with_params(
            &format!("{}/weather", self.base_url),
            &[("q", city), ("units", "metric"), ("appid", api_key)],
        )
        .map_err(|e| WeatherError::Api(format!("invalid weather URL: {e}")))?;

        let resp = self.http.get(url).send().await.map_err(|e| {
            log::error!("❌ Weather API request failed: {e}");
            WeatherError::Request(e)
        })?;
        let status = resp.status();
        match status.as_u16() {
            401 => return Err(WeatherError::InvalidApiKey),
            404 => return Err(WeatherError::CityNotFound(city.to_string())),
            429 => return Err(WeatherError::RateLimited),
            _ if !status.is_success() => {
                return Err(WeatherError::Api(
                    status.canonical_reason().unwrap_or("unknown status").to_string(),
                ))
            }
            _ => {}
        }

        let body: CurrentWeatherResponse = resp.json().await?;
        let data = into_weather_data(body)?;
        self.remember(cache_key, data.clone()).await;
        Ok(data)
    }

    /// Weather for an outdoor task's location. `None` for tasks that are not
    /// outdoor or have no location.
    pub async fn weather_for_task(&self, task: &Task) -> Option<Result<WeatherData, WeatherError>> {
        if !task.wants_weather() {
            return None;
        }
        Some(self.get_weather(&task.location).await)
    }

    async fn cached(&self, key: &str) -> Option<WeatherData> {
        let cache = self.cache.lock().await;
        cache
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.data.clone())
    }

    async fn remember(&self, key: String, data: WeatherData) {
        self.cache.lock().await.insert(
            key,
            CachedWeather {
                data,
                fetched_at: Instant::now(),
            },
        );
    }
}

fn into_weather_data(resp: CurrentWeatherResponse) -> Result<WeatherData, WeatherError> {
    let condition = resp
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Parse("no weather conditions in response".to_string()))?;

    Ok(WeatherData {
        is_outdoor_friendly: is_outdoor_friendly(&condition.main, resp.main.temp),
        description: condition.description,
        temperature: resp.main.temp.round() as i64,
        feels_like: resp.main.feels_like.round() as i64,
        humidity: resp.main.humidity.round() as i64,
        wind_speed: resp.wind.speed.round() as i64,
        icon: format!("https://openweathermap.org/img/wn/{}@2x.png", condition.icon),
    })
}

/// Dry conditions and a temperature between 10 °C and 35 °C inclusive.
pub fn is_outdoor_friendly(main_condition: &str, temp_c: f64) -> bool {
    let bad = BAD_WEATHER_CONDITIONS.iter().any(|c| main_condition.contains(c));
    !bad && (OUTDOOR_MIN_TEMP_C..=OUTDOOR_MAX_TEMP_C).contains(&temp_c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "coord": { "lon": -9.13, "lat": 38.72 },
        "weather": [
            { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
        ],
        "main": { "temp": 21.6, "feels_like": 21.2, "temp_min": 19.0, "temp_max": 23.1, "pressure": 1017, "humidity": 56 },
        "wind": { "speed": 4.63, "deg": 330 },
        "name": "Lisbon",
        "cod": 200
    }"#;

    #[test]
    fn maps_current_weather_response() {
        let resp: CurrentWeatherResponse = serde_json::from_str(FIXTURE).unwrap();
        let data = into_weather_data(resp).unwrap();

        assert_eq!(data.description, "clear sky");
        assert_eq!(data.temperature, 22);
        assert_eq!(data.feels_like, 21);
        assert_eq!(data.humidity, 56);
        assert_eq!(data.wind_speed, 5);
        assert_eq!(data.icon, "https://openweathermap.org/img/wn/01d@2x.png");
        assert!(data.is_outdoor_friendly);
    }

    #[test]
    fn response_without_conditions_is_rejected() {
        let resp: CurrentWeatherResponse =
            serde_json::from_str(r#"{ "weather": [], "main": { "temp": 1, "feels_like": 1, "humidity": 1 }, "wind": { "speed": 1 } }"#)
                .unwrap();
        assert!(matches!(into_weather_data(resp), Err(WeatherError::Parse(_))));
    }

    #[test]
    fn outdoor_rule() {
        assert!(is_outdoor_friendly("Clear", 10.0));
        assert!(is_outdoor_friendly("Clouds", 35.0));
        assert!(!is_outdoor_friendly("Clear", 9.9));
        assert!(!is_outdoor_friendly("Clear", 35.5));
        assert!(!is_outdoor_friendly("Rain", 20.0));
        assert!(!is_outdoor_friendly("Thunderstorm", 20.0));
        assert!(!is_outdoor_friendly("Drizzle", 20.0));
    }

    #[tokio::test]
    async fn rejects_missing_city_and_key() {
        let without_key = WeatherService::new(None);
        assert!(matches!(without_key.get_weather("  ").await, Err(WeatherError::MissingCity)));
        assert!(matches!(without_key.get_weather("Oslo").await, Err(WeatherError::MissingApiKey)));
    }

    #[tokio::test]
    async fn serves_cached_weather_case_insensitively() {
        // Nothing listens here, so only a cache hit can succeed
        let service = WeatherService::new(Some("key".to_string())).with_base_url("http://127.0.0.1:9");
        let resp: CurrentWeatherResponse = serde_json::from_str(FIXTURE).unwrap();
        service.remember("lisbon".to_string(), into_weather_data(resp).unwrap()).await;

        let data = service.get_weather("Lisbon").await.unwrap();
        assert_eq!(data.temperature, 22);
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let service = WeatherService::new(Some("key".to_string()))
            .with_base_url("http://127.0.0.1:9")
            .with_cache_ttl(Duration::ZERO);
        let resp: CurrentWeatherResponse = serde_json::from_str(FIXTURE).unwrap();
        service.remember("lisbon".to_string(), into_weather_data(resp).unwrap()).await;

        assert!(service.cached("lisbon").await.is_none());
    }

    #[tokio::test]
    async fn skips_tasks_that_are_not_outdoor() {
        let service = WeatherService::new(None);
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Indoor",
            "userId": "u1",
            "isOutdoor": false,
            "location": "Lisbon"
        }))
        .unwrap();
        assert!(service.weather_for_task(&task).await.is_none());
    }
}
