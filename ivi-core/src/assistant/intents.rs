//! Intent predicates and handlers
//!
//! Predicates receive normalised text (see [`super::normalize`]). Handlers
//! perform at most one state change through the hub.

use super::{AssistantResponse, Intent};
use crate::audio::Preset;
use crate::connection::BtProfile;
use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::state::DriverState;
use ivi_common::events::{FocusMode, PlayerStatus};
use ivi_common::human_time::{format_distance_km, format_eta_minutes};

/// Step for "volume up" / "volume down"
pub const VOLUME_STEP: i32 = 10;

/// Words after "connect ... to" that name the link, not a device
const TRANSPORT_WORDS: [&str; 6] = ["bluetooth", "phone", "my phone", "device", "car", "the car"];

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn starts_with_any(text: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| text.starts_with(p))
}

/// Text after the last " to ", if any
fn after_to(text: &str) -> Option<&str> {
    text.rfind(" to ")
        .map(|idx| text[idx + 4..].trim())
        .filter(|rest| !rest.is_empty())
}

fn contains_word(text: &str, word: &str) -> bool {
    format!(" {} ", text).contains(&format!(" {} ", word))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

// ----------------------------------------------------------------------
// Predicates
// ----------------------------------------------------------------------

pub fn is_auto_tune(text: &str, _driver: &DriverState) -> bool {
    contains_any(text, &["auto-tune", "autotune", "auto tune", "calibrate"])
}

pub fn is_navigate(text: &str, _driver: &DriverState) -> bool {
    starts_with_any(text, &["navigate", "take me", "directions"])
        || contains_any(text, &["route to", "drive to", "directions to"])
}

pub fn is_play(text: &str, _driver: &DriverState) -> bool {
    text.starts_with("play ")
}

pub fn is_transport(text: &str, _driver: &DriverState) -> bool {
    matches!(
        first_word(text),
        "pause" | "resume" | "stop" | "skip" | "next" | "previous"
    ) || text == "play"
        || text == "back"
        || text.starts_with("go back")
}

pub fn is_volume(text: &str, _driver: &DriverState) -> bool {
    text.contains("volume")
        || matches!(first_word(text), "mute" | "unmute" | "louder" | "quieter")
        || contains_any(text, &["turn it up", "turn it down"])
}

pub fn is_diagnostics(text: &str, _driver: &DriverState) -> bool {
    starts_with_any(text, &["diagnose", "troubleshoot", "run diagnostics"])
        || contains_any(text, &["health check", "diagnostic"])
}

pub fn is_sound(text: &str, _driver: &DriverState) -> bool {
    contains_any(text, &["preset", "sound", "mode", "equalizer"])
}

pub fn is_alerts(text: &str, _driver: &DriverState) -> bool {
    contains_any(text, &["alert", "warning", "traffic"])
}

pub fn is_connect(text: &str, _driver: &DriverState) -> bool {
    contains_any(text, &["connect", "pair"]) && contains_any(text, &["bluetooth", "phone", "device"])
}

pub fn is_profile(text: &str, _driver: &DriverState) -> bool {
    text.contains("profile")
}

pub fn is_status(text: &str, _driver: &DriverState) -> bool {
    contains_any(text, &["status", "what's playing", "where am i", "how are we doing"])
}

// ----------------------------------------------------------------------
// Handlers
// ----------------------------------------------------------------------

pub fn auto_tune(hub: &mut Hub, _text: &str) -> Result<AssistantResponse> {
    if hub.driver().is_moving {
        return Ok(AssistantResponse::new(
            Intent::AutoTune,
            "I can run auto-tune once you're parked. Your sound settings are unchanged.",
        ));
    }
    let (result, settings) = hub.run_auto_tune()?;
    Ok(AssistantResponse::new(
        Intent::AutoTune,
        format!(
            "Auto-tune complete. Surround mix {:.0}%, target loudness {:.0} dB.",
            settings.surround.mix * 100.0,
            result.target_loudness
        ),
    )
    .with_action(format!(
        "auto_tune: {} bands adjusted",
        result.eq_adjustments.len()
    )))
}

pub fn navigate(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    let destination = after_to(text)
        .or_else(|| {
            ["navigate", "directions", "take me"]
                .iter()
                .find_map(|p| text.strip_prefix(p))
                .map(str::trim)
                .filter(|rest| !rest.is_empty())
        })
        .ok_or_else(|| Error::InvalidInput("no destination given".to_string()))?;

    let plan = hub.set_destination_by_name(destination)?;
    Ok(AssistantResponse::new(
        Intent::Navigate,
        format!(
            "Route to {}: {}, about {}.",
            plan.destination.name,
            format_distance_km(plan.distance_km),
            format_eta_minutes(plan.eta_minutes)
        ),
    )
    .with_action(format!(
        "route: {} {:.1} km, eta {} min",
        plan.destination.name, plan.distance_km, plan.eta_minutes
    )))
}

pub fn play(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    let query = text.strip_prefix("play ").unwrap_or(text).trim();
    let state = match query.strip_prefix("playlist ") {
        Some(name) => hub.play_playlist(name)?,
        None => hub.play_query(query)?,
    };

    let response = match (&state.queue_name, &state.track) {
        (Some(name), _) => AssistantResponse::new(
            Intent::Play,
            format!("Playing {}, {}.", name, plural(state.queue.len(), "track")),
        )
        .with_action(format!("play_playlist: {}", name)),
        (None, Some(track)) => AssistantResponse::new(
            Intent::Play,
            format!("Playing {} by {}.", track.title, track.artist),
        )
        .with_action(format!("play_track: {}", track.id)),
        (None, None) => AssistantResponse::new(Intent::Play, "Nothing to play."),
    };
    Ok(response)
}

pub fn transport(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    let word = first_word(text);
    let response = match word {
        "pause" | "stop" => {
            hub.pause();
            AssistantResponse::new(Intent::Transport, "Paused.").with_action("pause")
        }
        "resume" | "play" => {
            let state = hub.resume()?;
            let title = state.track.map(|t| t.title).unwrap_or_default();
            AssistantResponse::new(Intent::Transport, format!("Resuming {}.", title))
                .with_action("resume")
        }
        "next" | "skip" => {
            let state = hub.next_track()?;
            AssistantResponse::new(Intent::Transport, now_playing(&state.track))
                .with_action("next")
        }
        _ => {
            let state = hub.previous_track()?;
            AssistantResponse::new(Intent::Transport, now_playing(&state.track))
                .with_action("previous")
        }
    };
    Ok(response)
}

fn now_playing(track: &Option<crate::playback::Track>) -> String {
    match track {
        Some(t) => format!("Now playing {} by {}.", t.title, t.artist),
        None => "Nothing is playing.".to_string(),
    }
}

pub fn volume(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    let word = first_word(text);
    let number = text
        .split_whitespace()
        .find_map(|w| w.trim_end_matches('%').parse::<i32>().ok());

    let response = if word == "unmute" {
        hub.set_muted(false);
        AssistantResponse::new(Intent::Volume, "Sound is back on.").with_action("unmute")
    } else if word == "mute" {
        hub.set_muted(true);
        AssistantResponse::new(Intent::Volume, "Muted.").with_action("mute")
    } else if contains_word(text, "up") || text.contains("louder") {
        // With a direction, a number is the step size
        let output = hub.adjust_volume(number.map_or(VOLUME_STEP, i32::abs));
        AssistantResponse::new(Intent::Volume, format!("Volume up to {}.", output.volume))
            .with_action(format!("volume: {}", output.volume))
    } else if contains_word(text, "down") || text.contains("quieter") {
        let output = hub.adjust_volume(-number.map_or(VOLUME_STEP, i32::abs));
        AssistantResponse::new(Intent::Volume, format!("Volume down to {}.", output.volume))
            .with_action(format!("volume: {}", output.volume))
    } else if let Some(level) = number {
        let output = hub.set_volume(level);
        AssistantResponse::new(Intent::Volume, format!("Volume {}.", output.volume))
            .with_action(format!("volume: {}", output.volume))
    } else {
        let output = hub.output_state();
        let muted = if output.muted { ", muted" } else { "" };
        AssistantResponse::new(Intent::Volume, format!("Volume is {}{}.", output.volume, muted))
    };
    Ok(response)
}

pub fn diagnostics(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    if let Some(symptom) = text.strip_prefix("troubleshoot") {
        let plan = hub.troubleshoot(symptom);
        let speech = match plan.steps.first() {
            Some(step) => format!("{}. First: {}.", plan.message, step),
            None => format!("{}.", plan.message),
        };
        return Ok(AssistantResponse::new(Intent::Diagnostics, speech));
    }

    let report = hub.run_diagnostics();
    let speech = match report.top_issues(1).first() {
        Some(issue) => format!("{}. Top issue: {}.", report.summary, issue.description),
        None => "All systems look good.".to_string(),
    };
    Ok(AssistantResponse::new(Intent::Diagnostics, speech)
        .with_action(format!("diagnostics: {}", report.health)))
}

pub fn sound(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    let preset = Preset::ALL
        .iter()
        .copied()
        .find(|p| contains_word(text, &p.spoken_name()) || contains_word(text, p.name()))
        .ok_or_else(|| {
            let requested = text.split_whitespace().last().unwrap_or(text);
            Error::UnknownPreset(requested.to_string())
        })?;

    hub.apply_preset(preset.name())?;
    let spoken = preset.spoken_name();
    let speech = if hub.driver().focus_mode == FocusMode::Safety && preset.is_immersive() {
        format!(
            "{} preset on; driver focus is recommended while driving.",
            capitalize(&spoken)
        )
    } else {
        format!("Sound set to {}. Enjoy the ride.", spoken)
    };
    Ok(AssistantResponse::new(Intent::Sound, speech).with_action(format!("preset: {}", preset)))
}

pub fn alerts(hub: &mut Hub, _text: &str) -> Result<AssistantResponse> {
    let alerts = hub.alerts_near_vehicle();
    let speech = if alerts.is_empty() {
        "No alerts near you.".to_string()
    } else {
        let titles: Vec<&str> = alerts.iter().map(|a| a.title.as_str()).collect();
        format!("{} near you: {}.", plural(alerts.len(), "alert"), titles.join(", "))
    };
    Ok(AssistantResponse::new(Intent::Alerts, speech))
}

pub fn connect(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    if text.contains("disconnect") {
        return Ok(match hub.disconnect_device() {
            Some(previous) => AssistantResponse::new(
                Intent::Connect,
                format!("Disconnected from {}.", previous.device.name),
            )
            .with_action(format!("disconnect: {}", previous.device.id)),
            None => AssistantResponse::new(Intent::Connect, "No device is connected."),
        });
    }

    let target = after_to(text).filter(|query| !TRANSPORT_WORDS.contains(query));
    let device = match target {
        Some(query) => hub
            .find_device(query)
            .ok_or_else(|| Error::DeviceNotFound(query.to_string()))?,
        None => match hub.paired_devices().into_iter().next() {
            Some(device) => device,
            None => {
                return Ok(AssistantResponse::new(
                    Intent::Connect,
                    "No paired phone yet. Pair one first, then ask me to connect.",
                ))
            }
        },
    };

    let connection = hub.connect_device(&device.id, BtProfile::A2dp)?;
    Ok(AssistantResponse::new(
        Intent::Connect,
        format!("Connected to {} for media.", connection.device.name),
    )
    .with_action(format!("connect: {} {}", connection.device.id, connection.profile)))
}

pub fn profile(hub: &mut Hub, text: &str) -> Result<AssistantResponse> {
    let requested = after_to(text)
        .or_else(|| {
            text.split_once("profile ")
                .map(|(_, rest)| rest.trim())
                .filter(|rest| !rest.is_empty())
        })
        .map(profile_name)
        .filter(|name| !name.is_empty());

    let Some(requested) = requested else {
        let names: Vec<&str> = hub.profiles().iter().map(|p| p.display_name.as_str()).collect();
        return Ok(AssistantResponse::new(
            Intent::Profile,
            format!(
                "Active profile is {}. Available: {}.",
                hub.active_profile().display_name,
                names.join(", ")
            ),
        ));
    };

    let profile = hub.select_profile(requested)?;
    Ok(AssistantResponse::new(
        Intent::Profile,
        format!(
            "Welcome, {}. {} preset at volume {}.",
            profile.display_name,
            capitalize(&profile.preferred_preset.spoken_name()),
            profile.preferred_volume
        ),
    )
    .with_action(format!("profile: {}", profile.id)))
}

/// "the night shift profile" -> "night shift"
fn profile_name(requested: &str) -> &str {
    let name = requested.strip_prefix("the ").unwrap_or(requested);
    let name = name.strip_suffix(" profile").unwrap_or(name);
    name.trim()
}

pub fn status(hub: &mut Hub, _text: &str) -> Result<AssistantResponse> {
    let driver = hub.driver();
    let mut parts = Vec::new();
    parts.push(if driver.is_moving {
        format!("Driving at {:.0} km/h.", driver.speed_kph)
    } else {
        "Parked.".to_string()
    });

    let playback = hub.playback_state();
    parts.push(match (playback.status, &playback.track) {
        (PlayerStatus::Playing, Some(t)) => format!("Playing {} by {}.", t.title, t.artist),
        (PlayerStatus::Paused, Some(t)) => format!("{} is paused.", t.title),
        _ => "Nothing playing.".to_string(),
    });

    parts.push(match hub.connection() {
        Some(c) => format!("Connected to {}.", c.device.name),
        None => "No phone connected.".to_string(),
    });

    if let Some(plan) = hub.active_route() {
        parts.push(format!(
            "{} is {} away.",
            plan.destination.name,
            format_eta_minutes(plan.eta_minutes)
        ));
    }
    Ok(AssistantResponse::new(Intent::Status, parts.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_to() {
        assert_eq!(after_to("navigate to work"), Some("work"));
        assert_eq!(after_to("take me to the airport"), Some("the airport"));
        assert_eq!(after_to("navigate home"), None);
        assert_eq!(after_to("navigate to "), None);
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("turn the volume up", "up"));
        assert!(contains_word("pick up", "pick"));
        assert!(!contains_word("setup", "up"));
    }

    #[test]
    fn test_profile_name() {
        assert_eq!(profile_name("the night shift profile"), "night shift");
        assert_eq!(profile_name("jordan"), "jordan");
        assert_eq!(profile_name("the jordan profile"), "jordan");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("driver focus"), "Driver focus");
        assert_eq!(capitalize(""), "");
    }
}
