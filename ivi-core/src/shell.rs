//! Interactive shell commands
//!
//! Parsing is separate from execution so both can be tested without stdin.
//! Any line that is not a known command goes to the assistant.

use crate::audio::{DspPatch, EqBand};
use crate::connection::BtProfile;
use crate::error::{Error, Result};
use crate::hub::HubHandle;
use crate::report::CliFormatter;
use ivi_common::GeoPoint;

/// Q used for bands created from the shell
const SHELL_EQ_Q: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Say(String),
    Speed(f64),
    Location(GeoPoint),
    Scan,
    Pair(String),
    Connect { device: String, profile: BtProfile },
    Disconnect,
    Preset(String),
    Volume(i32),
    Balance(f64),
    Fader(f64),
    Mute,
    Eq { frequency_hz: f64, gain_db: f64 },
    AutoTune,
    Route(String),
    Play(String),
    Pause,
    Resume,
    Next,
    Previous,
    Alerts,
    ScanHealth,
    Troubleshoot(String),
    Profile(Option<String>),
    Status,
    Help,
    Quit,
    Empty,
}

pub const HELP: &[&str] = &[
    "say <text>              talk to the assistant (any unknown line does the same)",
    "speed <kph>             set vehicle speed",
    "location <lat> <lon>    move the vehicle",
    "scan | pair <id>        discover and pair Bluetooth devices",
    "connect <id> [profile]  connect (a2dp, hfp, avrcp); disconnect to drop",
    "preset <name>           apply a DSP preset",
    "volume|balance|fader <n>, mute",
    "eq <freq> <gain>        set one EQ band",
    "autotune                run cabin auto-tune (parked only)",
    "route <name>            navigate to a named place",
    "play <query> | pause | resume | next | prev",
    "alerts | scan-health | troubleshoot <text>",
    "profile [id]            list or activate driver profiles",
    "status | help | quit",
];

fn parse_number<T: std::str::FromStr>(value: Option<&str>, what: &str) -> Result<T> {
    let value = value.ok_or_else(|| Error::InvalidInput(format!("missing {}", what)))?;
    value
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a valid {}", value, what)))
}

fn rest_required(rest: &str, what: &str) -> Result<String> {
    if rest.is_empty() {
        Err(Error::InvalidInput(format!("missing {}", what)))
    } else {
        Ok(rest.to_string())
    }
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ShellCommand::Empty);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match head.to_lowercase().as_str() {
            "say" => ShellCommand::Say(rest.to_string()),
            "speed" => ShellCommand::Speed(parse_number(args.next(), "speed")?),
            "location" => {
                let lat: f64 = parse_number(args.next(), "latitude")?;
                let lon: f64 = parse_number(args.next(), "longitude")?;
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(Error::InvalidInput(format!("location ({}, {}) out of range", lat, lon)));
                }
                ShellCommand::Location(GeoPoint::new(lat, lon))
            }
            "scan" => ShellCommand::Scan,
            "pair" => ShellCommand::Pair(rest_required(rest, "device id")?),
            "connect" => {
                let device = args
                    .next()
                    .ok_or_else(|| Error::InvalidInput("missing device id".to_string()))?
                    .to_string();
                let profile = match args.next() {
                    Some(p) => p.parse()?,
                    None => BtProfile::default(),
                };
                ShellCommand::Connect { device, profile }
            }
            "disconnect" => ShellCommand::Disconnect,
            "preset" => ShellCommand::Preset(rest_required(rest, "preset name")?),
            "volume" => ShellCommand::Volume(parse_number(args.next(), "volume")?),
            "balance" => ShellCommand::Balance(parse_number(args.next(), "balance")?),
            "fader" => ShellCommand::Fader(parse_number(args.next(), "fader")?),
            "mute" => ShellCommand::Mute,
            "eq" => ShellCommand::Eq {
                frequency_hz: parse_number(args.next(), "frequency")?,
                gain_db: parse_number(args.next(), "gain")?,
            },
            "autotune" | "auto-tune" => ShellCommand::AutoTune,
            "route" => ShellCommand::Route(rest_required(rest, "destination")?),
            "play" => ShellCommand::Play(rest_required(rest, "track or playlist")?),
            "pause" => ShellCommand::Pause,
            "resume" => ShellCommand::Resume,
            "next" => ShellCommand::Next,
            "prev" | "previous" => ShellCommand::Previous,
            "alerts" => ShellCommand::Alerts,
            "scan-health" | "diagnose" => ShellCommand::ScanHealth,
            "troubleshoot" => ShellCommand::Troubleshoot(rest.to_string()),
            "profile" => ShellCommand::Profile((!rest.is_empty()).then(|| rest.to_string())),
            "status" => ShellCommand::Status,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            _ => ShellCommand::Say(line.to_string()),
        };
        Ok(command)
    }
}

/// Run a command and render its output
pub async fn execute(handle: &HubHandle, command: ShellCommand) -> Result<Vec<String>> {
    let lines = match command {
        ShellCommand::Empty | ShellCommand::Quit => Vec::new(),
        ShellCommand::Help => HELP.iter().map(|s| s.to_string()).collect(),
        ShellCommand::Say(text) => {
            let response = handle.handle_intent(&text).await;
            CliFormatter::format_response(&response)
        }
        ShellCommand::Speed(kph) => {
            let driver = handle.update_speed(kph).await;
            vec![format!(
                "speed {:.0} km/h ({})",
                driver.speed_kph,
                if driver.is_moving { "moving" } else { "parked" }
            )]
        }
        ShellCommand::Location(point) => match handle.update_location(point).await {
            Some(plan) => CliFormatter::format_route(Some(&plan)),
            None => vec![format!("location {}", point)],
        },
        ShellCommand::Scan => handle.with(|hub| CliFormatter::format_devices(&hub.scan_devices())).await,
        ShellCommand::Pair(id) => {
            let device = handle.with(|hub| hub.pair_device(&id)).await?;
            vec![format!("paired {} ({})", device.name, device.id)]
        }
        ShellCommand::Connect { device, profile } => {
            let connection = handle.with(|hub| hub.connect_device(&device, profile)).await?;
            CliFormatter::format_connection(Some(&connection))
        }
        ShellCommand::Disconnect => {
            handle.with(|hub| hub.disconnect_device()).await;
            CliFormatter::format_connection(None)
        }
        ShellCommand::Preset(name) => {
            let settings = handle.with(|hub| hub.apply_preset(&name)).await?;
            CliFormatter::format_dsp(&settings)
        }
        ShellCommand::Volume(v) => {
            let output = handle.with(|hub| hub.set_volume(v)).await;
            CliFormatter::format_output(&output)
        }
        ShellCommand::Balance(b) => {
            let output = handle.with(|hub| hub.set_balance(b)).await;
            CliFormatter::format_output(&output)
        }
        ShellCommand::Fader(f) => {
            let output = handle.with(|hub| hub.set_fader(f)).await;
            CliFormatter::format_output(&output)
        }
        ShellCommand::Mute => {
            let output = handle.with(|hub| hub.toggle_mute()).await;
            CliFormatter::format_output(&output)
        }
        ShellCommand::Eq { frequency_hz, gain_db } => {
            let settings = handle
                .with(|hub| {
                    let mut eq = hub.dsp_settings().eq;
                    match eq.iter_mut().find(|b| b.matches_frequency(frequency_hz)) {
                        Some(band) => band.gain_db = gain_db,
                        None => eq.push(EqBand::new(frequency_hz, gain_db, SHELL_EQ_Q)),
                    }
                    let patch = DspPatch {
                        eq: Some(eq),
                        ..Default::default()
                    };
                    hub.apply_custom_settings(&patch)
                })
                .await;
            CliFormatter::format_dsp(&settings)
        }
        ShellCommand::AutoTune => {
            let (_, settings) = handle.with(|hub| hub.run_auto_tune()).await?;
            CliFormatter::format_dsp(&settings)
        }
        ShellCommand::Route(name) => {
            let plan = handle.with(|hub| hub.set_destination_by_name(&name)).await?;
            CliFormatter::format_route(Some(&plan))
        }
        ShellCommand::Play(query) => {
            let state = handle.with(|hub| hub.play_query(&query)).await?;
            CliFormatter::format_playback(&state)
        }
        ShellCommand::Pause => {
            let state = handle.with(|hub| hub.pause()).await;
            CliFormatter::format_playback(&state)
        }
        ShellCommand::Resume => {
            let state = handle.with(|hub| hub.resume()).await?;
            CliFormatter::format_playback(&state)
        }
        ShellCommand::Next => {
            let state = handle.with(|hub| hub.next_track()).await?;
            CliFormatter::format_playback(&state)
        }
        ShellCommand::Previous => {
            let state = handle.with(|hub| hub.previous_track()).await?;
            CliFormatter::format_playback(&state)
        }
        ShellCommand::Alerts => handle.with(|hub| CliFormatter::format_alerts(&hub.alerts_near_vehicle())).await,
        ShellCommand::ScanHealth => {
            let report = handle.run_diagnostics().await;
            CliFormatter::format_report(&report)
        }
        ShellCommand::Troubleshoot(symptom) => {
            let plan = handle.with(|hub| hub.troubleshoot(&symptom)).await;
            CliFormatter::format_troubleshooting(&plan)
        }
        ShellCommand::Profile(None) => {
            handle
                .with(|hub| {
                    let active = hub.active_profile().id.clone();
                    hub.profiles()
                        .iter()
                        .map(|p| {
                            format!(
                                "{} {:<12} {} ({}, volume {}, {} focus)",
                                if p.id == active { "*" } else { " " },
                                p.id,
                                p.display_name,
                                p.preferred_preset,
                                p.preferred_volume,
                                p.focus_mode
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .await
        }
        ShellCommand::Profile(Some(id)) => {
            let profile = handle.select_profile(&id).await?;
            vec![format!(
                "profile {} active: {} preset, volume {}, {} focus",
                profile.display_name, profile.preferred_preset, profile.preferred_volume, profile.focus_mode
            )]
        }
        ShellCommand::Status => handle.with(|hub| CliFormatter::format_status(hub)).await,
    };
    Ok(lines)
}
