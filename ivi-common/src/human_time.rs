//! Human-readable time and distance formatting
//!
//! Provides consistent display formatting for spoken responses and the shell.

/// Track durations below this render as `M:SS`, above as `H:MM:SS`
const TRACK_FORMAT_MAX: u32 = 3600;

/// Distances below this render in metres
const METRE_FORMAT_MAX_KM: f64 = 1.0;

/// Format a track duration in seconds.
///
/// # Examples
///
/// ```
/// use ivi_common::human_time::format_track_duration;
///
/// assert_eq!(format_track_duration(225), "3:45");
/// assert_eq!(format_track_duration(3725), "1:02:05");
/// ```
pub fn format_track_duration(seconds: u32) -> String {
    if seconds < TRACK_FORMAT_MAX {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    } else {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        let secs = seconds % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    }
}

/// Format an ETA in whole minutes the way it is spoken.
///
/// # Examples
///
/// ```
/// use ivi_common::human_time::format_eta_minutes;
///
/// assert_eq!(format_eta_minutes(1), "1 min");
/// assert_eq!(format_eta_minutes(42), "42 min");
/// assert_eq!(format_eta_minutes(60), "1 h");
/// assert_eq!(format_eta_minutes(95), "1 h 35 min");
/// ```
pub fn format_eta_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} h", h),
        (h, m) => format!("{} h {} min", h, m),
    }
}

/// Format a distance given in kilometres.
///
/// # Examples
///
/// ```
/// use ivi_common::human_time::format_distance_km;
///
/// assert_eq!(format_distance_km(0.25), "250 m");
/// assert_eq!(format_distance_km(2.746), "2.7 km");
/// ```
pub fn format_distance_km(km: f64) -> String {
    if km < METRE_FORMAT_MAX_KM {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.1} km", km)
    }
}
