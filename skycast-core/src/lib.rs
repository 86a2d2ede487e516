//! Core library for the `skycast` terminal weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather HTTP client
//! - Best-effort IP geolocation
//! - Shared domain models (query targets, snapshots)
//!
//! It is used by `skycast-tui`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod geolocate;
pub mod model;

pub use client::{OpenWeatherClient, WeatherError};
pub use config::Config;
pub use model::{Condition, QueryTarget, WeatherSnapshot};
