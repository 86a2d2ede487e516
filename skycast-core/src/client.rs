use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::model::{Condition, QueryTarget, WeatherSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Shown to the user when the upstream error body carries no `message` field.
const FALLBACK_MESSAGE: &str = "Failed to fetch weather data";

/// Everything that can go wrong while fetching a snapshot.
///
/// The view renders all variants identically as a retryable message; the
/// distinction exists for logs.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to reach the weather service: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx upstream response, carrying the upstream-provided message
    /// ("city not found", "Invalid API key", ...) or a generic fallback.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Thin client for the OpenWeather current-conditions endpoint.
///
/// No retries, no rate limiting; one request per call with a fixed timeout.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Same client against a different base URL. Used by tests to point at a
    /// local mock server.
    pub fn with_base_url(
        api_key: String,
        base_url: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { api_key, base_url: base_url.into(), http })
    }

    /// Dispatch on the target kind; both arms hit the same endpoint.
    pub async fn fetch(&self, target: &QueryTarget) -> Result<WeatherSnapshot, WeatherError> {
        match target {
            QueryTarget::City(name) => self.fetch_by_city(name).await,
            QueryTarget::Coordinates { lat, lon } => self.fetch_by_coordinates(*lat, *lon).await,
        }
    }

    pub async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.request(&[("q", name.to_string())]).await
    }

    pub async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.request(&[("lat", lat.to_string()), ("lon", lon.to_string())]).await
    }

    async fn request(&self, params: &[(&str, String)]) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "upstream returned an error response");
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        let parsed: OwResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_snapshot())
    }
}

/// Extract the `message` field OpenWeather puts in error bodies, e.g.
/// `{"cod":"404","message":"city not found"}`.
fn upstream_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OwError {
        message: Option<String>,
    }

    serde_json::from_str::<OwError>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize, Default)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    visibility: Option<u32>,
    clouds: Option<OwClouds>,
}

impl OwResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let (condition, description) = self
            .weather
            .first()
            .map(|w| (Condition::from_category(&w.main), w.description.clone()))
            .unwrap_or_else(|| (Condition::Clear, String::new()));

        WeatherSnapshot {
            city: self.name,
            country: self.sys.country,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            temp_min_c: self.main.temp_min,
            temp_max_c: self.main.temp_max,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed_mps: self.wind.speed,
            visibility_m: self.visibility,
            cloud_cover_pct: self.clouds.and_then(|c| c.all),
            condition,
            description,
            sunrise: self.sys.sunrise.and_then(unix_to_utc),
            sunset: self.sys.sunset.and_then(unix_to_utc),
            fetched_at: Utc::now(),
        }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
