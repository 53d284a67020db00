//! # IVI Common Library
//!
//! Shared code for the infotainment crates including:
//! - Configuration loading (TOML bootstrap + data folder resolution)
//! - Event types (IviEvent enum) and the EventBus
//! - Geodesy helpers (GeoPoint, haversine distance)
//! - Human-readable formatting of durations and distances

pub mod config;
pub mod error;
pub mod events;
pub mod geo;
pub mod human_time;

pub use error::{Error, Result};
pub use geo::GeoPoint;
