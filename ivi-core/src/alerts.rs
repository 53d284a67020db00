//! Time- and geo-filtered alert feed
//!
//! A static catalog of alerts, each valid for a time window and relevant
//! inside one or more circular geofences. All comparisons are inclusive.

use chrono::{DateTime, Utc};
use ivi_common::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Advisory,
    Warning,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Advisory => write!(f, "advisory"),
            AlertSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Circular geofence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRegion {
    pub center: GeoPoint,
    pub radius_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default)]
    pub regions: Vec<GeoRegion>,
}

impl Alert {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at <= self.valid_to
    }

    /// True when `location` lies within any region grown by `radius_km`
    ///
    /// An alert without regions is never near anything.
    pub fn is_near(&self, location: GeoPoint, radius_km: f64) -> bool {
        self.regions
            .iter()
            .any(|r| r.center.distance_km(&location) <= r.radius_km + radius_km)
    }
}

pub struct AlertFeed {
    catalog: Vec<Alert>,
}

impl AlertFeed {
    pub fn new(catalog: Vec<Alert>) -> Self {
        Self { catalog }
    }

    /// Alerts whose validity window contains `at`, in catalog order
    pub fn active_alerts(&self, at: DateTime<Utc>) -> Vec<Alert> {
        self.catalog
            .iter()
            .filter(|a| a.is_active_at(at))
            .cloned()
            .collect()
    }

    /// Active alerts with a region within `radius_km` of `location`
    pub fn alerts_near(&self, location: GeoPoint, radius_km: f64, at: DateTime<Utc>) -> Vec<Alert> {
        self.catalog
            .iter()
            .filter(|a| a.is_active_at(at) && a.is_near(location, radius_km))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
    }

    fn alert(id: &str, regions: Vec<GeoRegion>) -> Alert {
        Alert {
            id: id.to_string(),
            title: format!("Alert {}", id),
            message: "Lane closure".to_string(),
            severity: AlertSeverity::Advisory,
            valid_from: t0(),
            valid_to: t1(),
            regions,
        }
    }

    fn equator_alert() -> Alert {
        alert(
            "eq",
            vec![GeoRegion {
                center: GeoPoint::new(0.0, 0.0),
                radius_km: 10.0,
            }],
        )
    }

    #[test]
    fn test_window_is_inclusive() {
        let feed = AlertFeed::new(vec![equator_alert()]);
        assert_eq!(feed.active_alerts(t0()).len(), 1);
        assert_eq!(feed.active_alerts(t1()).len(), 1);
        assert!(feed.active_alerts(t0() - Duration::seconds(1)).is_empty());
        assert!(feed.active_alerts(t1() + Duration::seconds(1)).is_empty());
    }

    #[test]
    fn test_near_inside_region_and_window() {
        let feed = AlertFeed::new(vec![equator_alert()]);
        let loc = GeoPoint::new(0.0, 0.05);
        let mid = t0() + Duration::hours(2);
        assert_eq!(feed.alerts_near(loc, 0.0, mid).len(), 1);
        assert!(feed.alerts_near(loc, 0.0, t1() + Duration::seconds(1)).is_empty());
    }

    #[test]
    fn test_radius_extends_region() {
        let feed = AlertFeed::new(vec![equator_alert()]);
        // ~22 km from the centre
        let loc = GeoPoint::new(0.0, 0.2);
        let mid = t0() + Duration::hours(1);
        assert!(feed.alerts_near(loc, 0.0, mid).is_empty());
        assert!(feed.alerts_near(loc, 5.0, mid).is_empty());
        assert_eq!(feed.alerts_near(loc, 15.0, mid).len(), 1);
    }

    #[test]
    fn test_any_region_matches() {
        let multi = alert(
            "multi",
            vec![
                GeoRegion {
                    center: GeoPoint::new(10.0, 10.0),
                    radius_km: 1.0,
                },
                GeoRegion {
                    center: GeoPoint::new(0.0, 0.0),
                    radius_km: 1.0,
                },
            ],
        );
        let feed = AlertFeed::new(vec![multi, alert("nowhere", vec![])]);
        let near = feed.alerts_near(GeoPoint::new(0.0, 0.0), 0.0, t0());
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id, "multi");
        assert_eq!(feed.active_alerts(t0()).len(), 2);
    }
}
