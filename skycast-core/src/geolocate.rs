//! Best-effort IP geolocation, the terminal analog of the browser
//! geolocation API. One shot, short timeout, and every failure path returns
//! `None` so the caller silently keeps its default city.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Coordinate pair resolved from the caller's public IP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Resolve the current position from the public IP, or `None` on any failure.
pub async fn locate() -> Option<Position> {
    locate_at(IP_API_URL).await
}

async fn locate_at(url: &str) -> Option<Position> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to create geolocation client: {}", e);
            return None;
        }
    };

    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Geolocation request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Geolocation returned status {}", response.status());
        return None;
    }

    let body: IpApiResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("Geolocation parse error: {}", e);
            return None;
        }
    };

    // ip-api reports failures as 200 with status != "success".
    if body.status != "success" {
        tracing::debug!("Geolocation lookup unsuccessful: {}", body.status);
        return None;
    }

    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => {
            tracing::info!("Geolocated to {:.2}, {:.2}", lat, lon);
            Some(Position { lat, lon })
        }
        _ => None,
    }
}
