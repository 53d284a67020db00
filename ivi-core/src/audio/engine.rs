//! Audio profile engine
//!
//! Owns the one active DspSettings instance and the output levels. Every
//! getter hands out an owned copy, so nothing outside the engine can alias
//! or mutate engine state.

use super::presets::Preset;
use super::types::{
    clamp_gain, clamp_signed_unit, clamp_unit, DspPatch, DspSettings, OutputState,
};
use crate::tuner::AutoTuneResult;
use tracing::{debug, info};

/// Surround is switched on above this recommended mix
const SURROUND_ENABLE_THRESHOLD: f64 = 0.05;

/// Where the active settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    /// Untouched catalog entry
    Preset,
    /// Catalog entry plus a custom patch
    Custom,
    /// Catalog entry plus auto-tune adjustments
    AutoTuned,
}

pub struct AudioProfileEngine {
    active_preset: Preset,
    source: SettingsSource,
    settings: DspSettings,
    output: OutputState,
}

impl AudioProfileEngine {
    /// Start from `preset` with default output levels
    pub fn new(preset: Preset) -> Self {
        Self {
            active_preset: preset,
            source: SettingsSource::Preset,
            settings: preset.settings(),
            output: OutputState::default(),
        }
    }

    /// Replace the active settings with a catalog entry by name
    pub fn apply_preset_by_name(&mut self, name: &str) -> crate::Result<DspSettings> {
        let preset: Preset = name.parse()?;
        Ok(self.apply_preset(preset))
    }

    /// Replace the active settings wholesale
    pub fn apply_preset(&mut self, preset: Preset) -> DspSettings {
        self.settings = preset.settings();
        self.active_preset = preset;
        self.source = SettingsSource::Preset;
        info!("Applied DSP preset {}", preset);
        self.settings.clone()
    }

    /// Merge a custom patch into the active settings
    pub fn apply_custom_settings(&mut self, patch: &DspPatch) -> DspSettings {
        if patch.is_empty() {
            debug!("Ignoring empty DSP patch");
            return self.settings.clone();
        }
        self.settings = self.settings.merged(patch);
        self.source = SettingsSource::Custom;
        info!("Applied custom DSP patch on top of {}", self.active_preset);
        self.settings.clone()
    }

    /// Merge tuner output into the active settings
    ///
    /// Only bands that already exist are touched; adjustments at frequencies
    /// with no matching band are ignored.
    pub fn apply_auto_tune(&mut self, result: &AutoTuneResult) -> DspSettings {
        for band in self.settings.eq.iter_mut() {
            if let Some(adj) = result
                .eq_adjustments
                .iter()
                .find(|a| band.matches_frequency(a.frequency_hz))
            {
                band.gain_db = clamp_gain(band.gain_db + adj.delta_db);
            }
        }
        self.settings.surround.enabled = result.surround_mix > SURROUND_ENABLE_THRESHOLD;
        self.settings.surround.mix = clamp_unit(result.surround_mix);
        self.settings.stage.center = clamp_unit(result.stage_focus);
        self.source = SettingsSource::AutoTuned;

        info!(
            "Applied auto-tune: surround mix {:.2}, stage focus {:.2}",
            self.settings.surround.mix, self.settings.stage.center
        );
        self.settings.clone()
    }

    /// Set volume, clamped to 0..=100
    pub fn set_volume(&mut self, volume: i32) -> OutputState {
        self.output.volume = volume.clamp(0, 100) as u8;
        debug!("Volume set to {}", self.output.volume);
        self.output
    }

    /// Change volume by a signed step, clamped
    pub fn adjust_volume(&mut self, delta: i32) -> OutputState {
        self.set_volume(i32::from(self.output.volume) + delta)
    }

    /// Set balance, clamped to -1..=1
    pub fn set_balance(&mut self, balance: f64) -> OutputState {
        self.output.balance = clamp_signed_unit(balance);
        self.output
    }

    /// Set fader, clamped to -1..=1
    pub fn set_fader(&mut self, fader: f64) -> OutputState {
        self.output.fader = clamp_signed_unit(fader);
        self.output
    }

    pub fn toggle_mute(&mut self) -> OutputState {
        self.output.muted = !self.output.muted;
        debug!("Mute {}", if self.output.muted { "on" } else { "off" });
        self.output
    }

    pub fn set_muted(&mut self, muted: bool) -> OutputState {
        self.output.muted = muted;
        self.output
    }

    pub fn settings(&self) -> DspSettings {
        self.settings.clone()
    }

    pub fn output_state(&self) -> OutputState {
        self.output
    }

    pub fn active_preset(&self) -> Preset {
        self.active_preset
    }

    pub fn source(&self) -> SettingsSource {
        self.source
    }
}

impl Default for AudioProfileEngine {
    fn default() -> Self {
        Self::new(Preset::Reference)
    }
}
