//! Line-oriented text rendering
//!
//! Every formatter returns one `String` per output line so callers can print,
//! log or assert on them without re-splitting.

use crate::alerts::Alert;
use crate::assistant::AssistantResponse;
use crate::audio::{DspSettings, OutputState};
use crate::connection::{BluetoothDevice, Connection};
use crate::diagnostics::{DiagnosticReport, TroubleshootingPlan};
use crate::hub::Hub;
use crate::playback::PlaybackState;
use crate::route::RoutePlan;
use ivi_common::events::PlayerStatus;
use ivi_common::human_time::{format_distance_km, format_eta_minutes, format_track_duration};

/// Formatter for shell output
pub struct CliFormatter;

impl CliFormatter {
    pub fn format_response(response: &AssistantResponse) -> Vec<String> {
        let mut lines = vec![format!("assistant: {}", response.speech)];
        lines.extend(response.actions.iter().map(|a| format!("  -> {}", a)));
        lines
    }

    pub fn format_connection(connection: Option<&Connection>) -> Vec<String> {
        match connection {
            Some(c) => vec![format!(
                "bluetooth: {} ({}) via {}{}",
                c.device.name,
                c.device.id,
                c.profile,
                if c.streaming { ", streaming" } else { "" }
            )],
            None => vec!["bluetooth: not connected".to_string()],
        }
    }

    pub fn format_devices(devices: &[BluetoothDevice]) -> Vec<String> {
        if devices.is_empty() {
            return vec!["no devices found".to_string()];
        }
        devices
            .iter()
            .map(|d| {
                let profiles: Vec<String> = d.profiles.iter().map(|p| p.to_string()).collect();
                let rssi = d.rssi.map(|r| format!(" {} dBm", r)).unwrap_or_default();
                format!("{:<12} {} [{}]{}", d.id, d.name, profiles.join(", "), rssi)
            })
            .collect()
    }

    /// EQ table plus the tone, surround and stage summary
    pub fn format_dsp(settings: &DspSettings) -> Vec<String> {
        let mut lines = Vec::with_capacity(settings.eq.len() + 3);
        for band in &settings.eq {
            lines.push(format!(
                "eq {:>6.0} Hz  {:+5.1} dB  q {:.2}",
                band.frequency_hz, band.gain_db, band.q
            ));
        }
        lines.push(format!(
            "bass {:+.1} dB, sub {:.2}, loudness {}, clarity {:.2}, reverb {:.2}, limiter {}",
            settings.bass_boost,
            settings.sub_level,
            on_off(settings.loudness),
            settings.clarity,
            settings.reverb,
            on_off(settings.limiter)
        ));
        lines.push(format!(
            "surround {} ({:?}, mix {:.2}), spatial w{:.2} d{:.2} h{:.2}",
            on_off(settings.surround.enabled),
            settings.surround.mode,
            settings.surround.mix,
            settings.spatial.width,
            settings.spatial.depth,
            settings.spatial.height
        ));
        lines.push(format!(
            "stage center {:.2}, width {:.2}, depth {:.2}",
            settings.stage.center, settings.stage.width, settings.stage.depth
        ));
        lines
    }

    pub fn format_output(output: &OutputState) -> Vec<String> {
        vec![format!(
            "volume {}{}, balance {:+.2}, fader {:+.2}",
            output.volume,
            if output.muted { " (muted)" } else { "" },
            output.balance,
            output.fader
        )]
    }

    pub fn format_playback(state: &PlaybackState) -> Vec<String> {
        let mut lines = Vec::new();
        let header = match (&state.track, state.status) {
            (Some(t), PlayerStatus::Playing) => format!(
                "playing: {} - {} [{}]",
                t.artist,
                t.title,
                format_track_duration(t.duration_secs)
            ),
            (Some(t), _) => format!("paused: {} - {}", t.artist, t.title),
            (None, _) => "idle".to_string(),
        };
        lines.push(header);

        if !state.queue.is_empty() {
            let name = state.queue_name.as_deref().unwrap_or("queue");
            lines.push(format!("{} ({} of {})", name, state.cursor + 1, state.queue.len()));
            for (i, track) in state.queue.iter().enumerate() {
                let marker = if i == state.cursor { ">" } else { " " };
                lines.push(format!(
                    "{} {:>2}. {} - {} ({})",
                    marker,
                    i + 1,
                    track.artist,
                    track.title,
                    format_track_duration(track.duration_secs)
                ));
            }
        }
        lines
    }

    pub fn format_route(plan: Option<&RoutePlan>) -> Vec<String> {
        let Some(plan) = plan else {
            return vec!["no active route".to_string()];
        };
        let mut lines = vec![format!(
            "route to {} {}: {}, eta {}",
            plan.destination.name,
            plan.destination.location,
            format_distance_km(plan.distance_km),
            format_eta_minutes(plan.eta_minutes)
        )];
        lines.extend(plan.steps.iter().enumerate().map(|(i, step)| {
            format!("  {}. {} ({})", i + 1, step.instruction, format_distance_km(step.distance_km))
        }));
        lines
    }

    pub fn format_alerts(alerts: &[Alert]) -> Vec<String> {
        if alerts.is_empty() {
            return vec!["no alerts".to_string()];
        }
        alerts
            .iter()
            .map(|a| format!("[{}] {}: {}", a.severity, a.title, a.message))
            .collect()
    }

    pub fn format_report(report: &DiagnosticReport) -> Vec<String> {
        let mut lines = vec![format!("health: {} ({})", report.health, report.summary)];
        for issue in &report.issues {
            lines.push(format!(
                "  {} [{}] {} ({:.0}% confidence)",
                issue.id,
                issue.severity,
                issue.description,
                issue.confidence * 100.0
            ));
            lines.extend(issue.remediation.iter().map(|step| format!("      - {}", step)));
        }
        lines
    }

    pub fn format_troubleshooting(plan: &TroubleshootingPlan) -> Vec<String> {
        let mut lines = vec![plan.message.clone()];
        lines.extend(plan.steps.iter().enumerate().map(|(i, s)| format!("  {}. {}", i + 1, s)));
        lines.extend(plan.follow_ups.iter().map(|f| format!("  * {}", f)));
        lines
    }

    /// One-screen summary of the whole hub
    pub fn format_status(hub: &Hub) -> Vec<String> {
        let driver = hub.driver();
        let vehicle = hub.vehicle();
        let profile = hub.active_profile();

        let mut lines = vec![
            format!(
                "driver: {} ({}), {:.0} km/h, {}, focus {}",
                driver.name,
                profile.display_name,
                driver.speed_kph,
                if driver.is_moving { "moving" } else { "parked" },
                driver.focus_mode
            ),
            format!(
                "vehicle: {} heading {:.0}°, outside {:.0}°C",
                vehicle.location, vehicle.heading_deg, vehicle.outside_temp_c
            ),
            format!("preset: {} ({:?})", hub.active_preset(), hub.settings_source()),
        ];
        lines.extend(Self::format_output(&hub.output_state()));
        lines.extend(Self::format_connection(hub.connection().as_ref()));
        lines.extend(Self::format_playback(&hub.playback_state()).into_iter().take(1));
        lines.extend(Self::format_route(hub.active_route().as_ref()).into_iter().take(1));
        lines
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Intent;
    use crate::audio::Preset;
    use crate::playback::Track;

    fn track(id: &str, secs: u32) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: "Band".to_string(),
            album: None,
            duration_secs: secs,
            rating: 4.0,
            tags: vec![],
        }
    }

    #[test]
    fn test_format_response_lists_actions() {
        let response = AssistantResponse::new(Intent::Volume, "Volume 30.").with_action("volume: 30");
        let lines = CliFormatter::format_response(&response);
        assert_eq!(lines, vec!["assistant: Volume 30.", "  -> volume: 30"]);
    }

    #[test]
    fn test_format_dsp_has_one_line_per_band() {
        let lines = CliFormatter::format_dsp(&Preset::Hall.settings());
        assert_eq!(lines.len(), 6 + 3);
        assert!(lines[0].contains("60 Hz"));
    }

    #[test]
    fn test_format_playback_marks_cursor() {
        let state = PlaybackState {
            status: PlayerStatus::Playing,
            is_playing: true,
            track: Some(track("b", 3725)),
            queue: vec![track("a", 200), track("b", 3725)],
            queue_name: Some("Road Trip".to_string()),
            cursor: 1,
        };
        let lines = CliFormatter::format_playback(&state);
        assert_eq!(lines[0], "playing: Band - Song b [1:02:05]");
        assert_eq!(lines[1], "Road Trip (2 of 2)");
        assert!(lines[3].starts_with(">"));
    }

    #[test]
    fn test_format_empty_route_and_alerts() {
        assert_eq!(CliFormatter::format_route(None), vec!["no active route"]);
        assert_eq!(CliFormatter::format_alerts(&[]), vec!["no alerts"]);
    }
}
