//! Auto-scan rule table
//!
//! Each rule looks at the snapshot on its own and yields at most one issue.
//! Rules run in table order and never depend on each other.

use super::{DiagnosticIssue, DiagnosticSnapshot, IssueCategory, Severity};
use ivi_common::events::FocusMode;

/// Volume below this while playing is flagged as inaudible
pub const LOW_VOLUME_THRESHOLD: u8 = 15;

/// Volume above this while moving masks road and warning sounds
pub const HIGH_VOLUME_THRESHOLD: u8 = 80;

pub type Rule = fn(&DiagnosticSnapshot) -> Option<DiagnosticIssue>;

pub const RULES: [Rule; 5] = [
    connectivity_mismatch,
    low_volume_while_playing,
    high_volume_while_moving,
    focus_preset_mismatch,
    active_alerts,
];

fn issue(
    id: &str,
    category: IssueCategory,
    severity: Severity,
    description: String,
    cause: &str,
    remediation: &[&str],
    confidence: f64,
) -> DiagnosticIssue {
    DiagnosticIssue {
        id: id.to_string(),
        category,
        severity,
        description,
        cause: cause.to_string(),
        remediation: remediation.iter().map(|s| s.to_string()).collect(),
        confidence,
    }
}

/// Playback claims to run but no Bluetooth source is connected
fn connectivity_mismatch(snapshot: &DiagnosticSnapshot) -> Option<DiagnosticIssue> {
    if snapshot.bluetooth_connected || !snapshot.is_playing {
        return None;
    }
    Some(issue(
        "BT-101",
        IssueCategory::Connectivity,
        Severity::Warning,
        "Playback is active but no Bluetooth device is connected".to_string(),
        "The media source dropped or was never connected",
        &[
            "Open Bluetooth settings on the phone and confirm it is visible",
            "Reconnect the phone from the head unit",
            "Restart playback once the link is up",
        ],
        0.82,
    ))
}

fn low_volume_while_playing(snapshot: &DiagnosticSnapshot) -> Option<DiagnosticIssue> {
    if !snapshot.is_playing {
        return None;
    }
    if !snapshot.muted && snapshot.volume >= LOW_VOLUME_THRESHOLD {
        return None;
    }
    let description = if snapshot.muted {
        "Playback is running while the output is muted".to_string()
    } else {
        format!("Playback volume is very low ({})", snapshot.volume)
    };
    Some(issue(
        "AUD-201",
        IssueCategory::Audio,
        Severity::Info,
        description,
        "Output level is too low to hear",
        &["Unmute the output", "Raise the volume to a comfortable level"],
        0.6,
    ))
}

fn high_volume_while_moving(snapshot: &DiagnosticSnapshot) -> Option<DiagnosticIssue> {
    if !snapshot.is_moving || snapshot.muted || snapshot.volume <= HIGH_VOLUME_THRESHOLD {
        return None;
    }
    Some(issue(
        "SAF-301",
        IssueCategory::Safety,
        Severity::Critical,
        format!(
            "Volume {} at {:.0} km/h can mask sirens and warning chimes",
            snapshot.volume, snapshot.speed_kph
        ),
        "Cabin volume is set above the safe driving level",
        &[
            "Lower the volume below 80",
            "Switch to the driver focus preset while driving",
        ],
        0.75,
    ))
}

fn focus_preset_mismatch(snapshot: &DiagnosticSnapshot) -> Option<DiagnosticIssue> {
    if snapshot.focus_mode != FocusMode::Safety || snapshot.active_preset.is_driver_safe() {
        return None;
    }
    Some(issue(
        "PRF-401",
        IssueCategory::Profile,
        Severity::Warning,
        format!(
            "Safety focus is on but the {} preset is active",
            snapshot.active_preset.spoken_name()
        ),
        "An immersive preset was applied after the safety profile",
        &["Apply the driver focus preset", "Or switch to a standard profile"],
        0.68,
    ))
}

fn active_alerts(snapshot: &DiagnosticSnapshot) -> Option<DiagnosticIssue> {
    if snapshot.active_alert_count == 0 {
        return None;
    }
    let noun = if snapshot.active_alert_count == 1 { "alert" } else { "alerts" };
    Some(issue(
        "ALR-501",
        IssueCategory::Alerts,
        Severity::Info,
        format!("{} active {} nearby", snapshot.active_alert_count, noun),
        "Traffic or weather alerts cover the current area",
        &["Review the alert list before continuing"],
        0.9,
    ))
}
