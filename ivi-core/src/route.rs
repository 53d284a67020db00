//! Route planner
//!
//! Holds the current origin, speed and active destination. Every change to
//! any of them recomputes the whole plan; nothing is patched incrementally.

use crate::error::{Error, Result};
use ivi_common::GeoPoint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// ETA never assumes a speed below this, so a stopped car still gets a sane ETA
pub const MIN_ROUTE_SPEED_KPH: f64 = 25.0;

/// Step weights; always sum to 1
const STEP_WEIGHTS: [f64; 3] = [0.2, 0.7, 0.1];

/// Named locations the planner can resolve without coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownDestination {
    Home,
    Work,
    Airport,
    Gym,
    School,
}

impl KnownDestination {
    pub const ALL: [KnownDestination; 5] = [
        KnownDestination::Home,
        KnownDestination::Work,
        KnownDestination::Airport,
        KnownDestination::Gym,
        KnownDestination::School,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KnownDestination::Home => "home",
            KnownDestination::Work => "work",
            KnownDestination::Airport => "airport",
            KnownDestination::Gym => "gym",
            KnownDestination::School => "school",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KnownDestination::Home => "Home",
            KnownDestination::Work => "Work",
            KnownDestination::Airport => "Airport",
            KnownDestination::Gym => "Gym",
            KnownDestination::School => "School",
        }
    }

    pub fn location(&self) -> GeoPoint {
        match self {
            KnownDestination::Home => GeoPoint::new(37.7599, -122.4148),
            KnownDestination::Work => GeoPoint::new(37.7895, -122.3942),
            KnownDestination::Airport => GeoPoint::new(37.6213, -122.3790),
            KnownDestination::Gym => GeoPoint::new(37.7706, -122.4359),
            KnownDestination::School => GeoPoint::new(37.7219, -122.4782),
        }
    }
}

impl FromStr for KnownDestination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        let key = key.strip_prefix("the ").unwrap_or(key.as_str());
        KnownDestination::ALL
            .iter()
            .copied()
            .find(|d| d.name() == key)
            .ok_or_else(|| Error::UnknownDestination(s.trim().to_string()))
    }
}

/// Active destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub location: GeoPoint,
}

/// One leg of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_km: f64,
}

/// Fully computed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub destination: Destination,
    pub origin: GeoPoint,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub steps: Vec<RouteStep>,
}

pub struct RouteService {
    origin: GeoPoint,
    speed_kph: f64,
    destination: Option<Destination>,
    plan: Option<RoutePlan>,
}

impl RouteService {
    pub fn new(origin: GeoPoint, speed_kph: f64) -> Self {
        Self {
            origin,
            speed_kph,
            destination: None,
            plan: None,
        }
    }

    /// Set an arbitrary destination and recompute
    pub fn set_destination(&mut self, name: &str, location: GeoPoint) -> Result<RoutePlan> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("destination name is empty".to_string()));
        }
        self.destination = Some(Destination {
            name: name.to_string(),
            location,
        });
        info!("Destination set to {} at {}", name, location);
        self.recompute()
    }

    /// Resolve a named location and make it the destination
    pub fn set_destination_by_name(&mut self, name: &str) -> Result<RoutePlan> {
        let known: KnownDestination = name.parse()?;
        self.set_destination(known.label(), known.location())
    }

    /// New position and speed; recomputes only when a destination is active
    pub fn update_location(&mut self, location: GeoPoint, speed_kph: f64) -> Option<RoutePlan> {
        self.origin = location;
        self.speed_kph = speed_kph;
        if self.destination.is_none() {
            debug!("Location updated with no active destination");
            return None;
        }
        self.recompute().ok()
    }

    /// Compute the route from the current origin to the active destination
    pub fn compute_route(&self) -> Result<RoutePlan> {
        let destination = self.destination.as_ref().ok_or(Error::NoDestination)?;
        Ok(plan_route(self.origin, self.speed_kph, destination))
    }

    pub fn active_route(&self) -> Option<RoutePlan> {
        self.plan.clone()
    }

    pub fn destination(&self) -> Option<Destination> {
        self.destination.clone()
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    fn recompute(&mut self) -> Result<RoutePlan> {
        let plan = self.compute_route()?;
        debug!(
            "Route to {}: {:.2} km, {} min",
            plan.destination.name, plan.distance_km, plan.eta_minutes
        );
        self.plan = Some(plan.clone());
        Ok(plan)
    }
}

/// Straight-line route with three synthetic steps
pub fn plan_route(origin: GeoPoint, speed_kph: f64, destination: &Destination) -> RoutePlan {
    let distance_km = origin.distance_km(&destination.location);
    let effective_speed = if speed_kph.is_finite() {
        speed_kph.max(MIN_ROUTE_SPEED_KPH)
    } else {
        MIN_ROUTE_SPEED_KPH
    };
    let eta_minutes = ((distance_km / effective_speed * 60.0).ceil() as u32).max(1);

    let first = distance_km * STEP_WEIGHTS[0];
    let second = distance_km * STEP_WEIGHTS[1];
    // Last leg takes the remainder so the steps sum to the total
    let last = distance_km - first - second;

    let steps = vec![
        RouteStep {
            instruction: "Head out toward the main road".to_string(),
            distance_km: first,
        },
        RouteStep {
            instruction: format!("Continue on the main route toward {}", destination.name),
            distance_km: second,
        },
        RouteStep {
            instruction: format!("Arrive at {}", destination.name),
            distance_km: last,
        },
    ];

    RoutePlan {
        destination: destination.clone(),
        origin,
        distance_km,
        eta_minutes,
        steps,
    }
}
