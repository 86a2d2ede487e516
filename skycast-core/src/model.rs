use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the next fetch should ask the upstream API for.
///
/// A city name and a coordinate pair are mutually exclusive; picking one
/// discards the other. The target is replaced wholesale on geolocation
/// success or search submission.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTarget {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTarget::City(name) => f.write_str(name),
            QueryTarget::Coordinates { lat, lon } => write!(f, "{lat:.2}, {lon:.2}"),
        }
    }
}

/// Condition category reported by OpenWeather in `weather[0].main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Haze,
}

impl Condition {
    /// Map the upstream category string. Unknown categories fall back to
    /// `Clear` so a new upstream value never breaks rendering.
    pub fn from_category(category: &str) -> Self {
        match category {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Thunderstorm" => Self::Thunderstorm,
            "Snow" => Self::Snow,
            "Mist" => Self::Mist,
            "Fog" => Self::Fog,
            "Haze" => Self::Haze,
            _ => Self::Clear,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Haze => "Haze",
        }
    }

    /// Glyph shown next to the temperature in the hero card.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::Clouds => "☁",
            Self::Rain | Self::Drizzle => "☂",
            Self::Thunderstorm => "⚡",
            Self::Snow => "❄",
            Self::Mist | Self::Fog | Self::Haze => "≡",
        }
    }
}

/// Normalized upstream payload for the current [`QueryTarget`].
///
/// Immutable once fetched; the next fetch replaces it fully, there is no
/// merging or partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub visibility_m: Option<u32>,
    pub cloud_cover_pct: Option<u8>,
    pub condition: Condition,
    pub description: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// "London, GB", or just the city when the upstream omits the country.
    pub fn location_label(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.city, country),
            None => self.city.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_mapping_matches_upstream_names() {
        assert_eq!(Condition::from_category("Clear"), Condition::Clear);
        assert_eq!(Condition::from_category("Clouds"), Condition::Clouds);
        assert_eq!(Condition::from_category("Rain"), Condition::Rain);
        assert_eq!(Condition::from_category("Drizzle"), Condition::Drizzle);
        assert_eq!(Condition::from_category("Thunderstorm"), Condition::Thunderstorm);
        assert_eq!(Condition::from_category("Snow"), Condition::Snow);
        assert_eq!(Condition::from_category("Mist"), Condition::Mist);
        assert_eq!(Condition::from_category("Fog"), Condition::Fog);
        assert_eq!(Condition::from_category("Haze"), Condition::Haze);
    }

    #[test]
    fn unknown_category_falls_back_to_clear() {
        assert_eq!(Condition::from_category("Sand"), Condition::Clear);
        assert_eq!(Condition::from_category(""), Condition::Clear);
    }

    #[test]
    fn drizzle_shares_the_rain_glyph() {
        assert_eq!(Condition::Drizzle.glyph(), Condition::Rain.glyph());
    }

    #[test]
    fn query_target_display() {
        let city = QueryTarget::City("London".to_string());
        assert_eq!(city.to_string(), "London");

        let coords = QueryTarget::Coordinates { lat: 51.5074, lon: -0.1278 };
        assert_eq!(coords.to_string(), "51.51, -0.13");
    }

    #[test]
    fn location_label_with_and_without_country() {
        let mut snapshot = sample();
        assert_eq!(snapshot.location_label(), "London, GB");

        snapshot.country = None;
        assert_eq!(snapshot.location_label(), "London");
    }

    fn sample() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "London".to_string(),
            country: Some("GB".to_string()),
            temperature_c: 18.4,
            feels_like_c: 17.9,
            temp_min_c: 15.0,
            temp_max_c: 21.0,
            humidity_pct: 63,
            pressure_hpa: 1014,
            wind_speed_mps: 4.1,
            visibility_m: Some(10000),
            cloud_cover_pct: Some(40),
            condition: Condition::Clouds,
            description: "scattered clouds".to_string(),
            sunrise: None,
            sunset: None,
            fetched_at: Utc::now(),
        }
    }
}
