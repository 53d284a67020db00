//! Driver and vehicle state
//!
//! Both are owned by the hub and mutated only in response to speed, location
//! and profile commands. Everything else reads copies.

use ivi_common::events::FocusMode;
use ivi_common::GeoPoint;
use serde::{Deserialize, Serialize};

/// Who is driving and how closely the assistant must stay out of the way
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverState {
    /// From `[vehicle] driver_name`; switching profiles does not rename the driver
    pub name: String,
    pub speed_kph: f64,
    /// speed_kph > moving threshold
    pub is_moving: bool,
    pub focus_mode: FocusMode,
}

impl DriverState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            speed_kph: 0.0,
            is_moving: false,
            focus_mode: FocusMode::Standard,
        }
    }

    /// Record a new speed and recompute the moving flag
    ///
    /// Negative or non-finite speeds are treated as stationary.
    pub fn set_speed(&mut self, speed_kph: f64, moving_threshold_kph: f64) {
        let speed = if speed_kph.is_finite() { speed_kph.max(0.0) } else { 0.0 };
        self.speed_kph = speed;
        self.is_moving = speed > moving_threshold_kph;
    }
}

/// Where the vehicle is and what it is doing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub location: GeoPoint,
    pub heading_deg: f64,
    pub speed_kph: f64,
    pub outside_temp_c: f64,
}

impl VehicleState {
    pub fn new(location: GeoPoint, heading_deg: f64, outside_temp_c: f64) -> Self {
        Self {
            location,
            heading_deg: heading_deg.rem_euclid(360.0),
            speed_kph: 0.0,
            outside_temp_c,
        }
    }
}
