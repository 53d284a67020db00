//! Fixed DSP preset catalog
//!
//! Presets are a closed set. Every lookup by name goes through
//! [`Preset::from_str`], which rejects anything outside the catalog.

use super::types::{
    DspSettings, EqBand, Spatial, Stage, Surround, SurroundMode, EQ_BAND_FREQUENCIES_HZ,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default Q for every preset band
const DEFAULT_Q: f64 = 1.0;

/// Named bundle of DSP parameter defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Reference,
    Concert,
    Hall,
    Live,
    Stadium,
    Studio,
    Club,
    DriverFocus,
    Night,
}

impl Preset {
    /// Catalog order
    pub const ALL: [Preset; 9] = [
        Preset::Reference,
        Preset::Concert,
        Preset::Hall,
        Preset::Live,
        Preset::Stadium,
        Preset::Studio,
        Preset::Club,
        Preset::DriverFocus,
        Preset::Night,
    ];

    /// Catalog key
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Reference => "reference",
            Preset::Concert => "concert",
            Preset::Hall => "hall",
            Preset::Live => "live",
            Preset::Stadium => "stadium",
            Preset::Studio => "studio",
            Preset::Club => "club",
            Preset::DriverFocus => "driver_focus",
            Preset::Night => "night",
        }
    }

    /// How the preset is said out loud ("driver focus")
    pub fn spoken_name(&self) -> String {
        self.name().replace('_', " ")
    }

    /// Presets that keep speech and road noise intelligible
    pub fn is_driver_safe(&self) -> bool {
        matches!(
            self,
            Preset::Reference | Preset::Studio | Preset::DriverFocus | Preset::Night
        )
    }

    /// Presets with heavy reverb or surround that pull attention
    pub fn is_immersive(&self) -> bool {
        matches!(
            self,
            Preset::Concert | Preset::Hall | Preset::Live | Preset::Stadium | Preset::Club
        )
    }

    /// Fresh copy of the catalog entry
    pub fn settings(&self) -> DspSettings {
        match self {
            Preset::Reference => build(
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                Tone { bass_boost: 0.0, sub_level: 0.0, loudness: false, clarity: 0.5, reverb: 0.0, limiter: true },
                Surround { enabled: false, mode: SurroundMode::Cabin, mix: 0.0 },
                Spatial { width: 0.5, depth: 0.5, height: 0.5 },
                Stage { center: 0.5, width: 0.5, depth: 0.5 },
            ),
            Preset::Concert => build(
                [3.0, 1.0, 0.0, 1.0, 2.0, 2.0],
                Tone { bass_boost: 2.0, sub_level: 3.0, loudness: true, clarity: 0.6, reverb: 0.35, limiter: true },
                Surround { enabled: true, mode: SurroundMode::Hall, mix: 0.45 },
                Spatial { width: 0.8, depth: 0.7, height: 0.6 },
                Stage { center: 0.5, width: 0.8, depth: 0.7 },
            ),
            Preset::Hall => build(
                [2.0, 0.0, -1.0, 1.0, 2.0, 1.0],
                Tone { bass_boost: 1.0, sub_level: 1.0, loudness: false, clarity: 0.55, reverb: 0.5, limiter: true },
                Surround { enabled: true, mode: SurroundMode::Hall, mix: 0.55 },
                Spatial { width: 0.9, depth: 0.8, height: 0.7 },
                Stage { center: 0.45, width: 0.9, depth: 0.8 },
            ),
            Preset::Live => build(
                [2.0, 1.0, 1.0, 2.0, 2.0, 1.0],
                Tone { bass_boost: 2.0, sub_level: 2.0, loudness: true, clarity: 0.65, reverb: 0.3, limiter: true },
                Surround { enabled: true, mode: SurroundMode::Stage, mix: 0.4 },
                Spatial { width: 0.75, depth: 0.6, height: 0.5 },
                Stage { center: 0.55, width: 0.75, depth: 0.6 },
            ),
            Preset::Stadium => build(
                [4.0, 2.0, 0.0, 1.0, 3.0, 3.0],
                Tone { bass_boost: 4.0, sub_level: 4.0, loudness: true, clarity: 0.5, reverb: 0.6, limiter: true },
                Surround { enabled: true, mode: SurroundMode::Arena, mix: 0.65 },
                Spatial { width: 1.0, depth: 0.9, height: 0.8 },
                Stage { center: 0.4, width: 1.0, depth: 0.9 },
            ),
            Preset::Studio => build(
                [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                Tone { bass_boost: 0.0, sub_level: 0.0, loudness: false, clarity: 0.8, reverb: 0.05, limiter: false },
                Surround { enabled: false, mode: SurroundMode::Studio, mix: 0.1 },
                Spatial { width: 0.6, depth: 0.4, height: 0.4 },
                Stage { center: 0.6, width: 0.6, depth: 0.4 },
            ),
            Preset::Club => build(
                [6.0, 3.0, -1.0, 0.0, 2.0, 2.0],
                Tone { bass_boost: 5.0, sub_level: 6.0, loudness: true, clarity: 0.5, reverb: 0.2, limiter: true },
                Surround { enabled: true, mode: SurroundMode::Club, mix: 0.4 },
                Spatial { width: 0.7, depth: 0.5, height: 0.5 },
                Stage { center: 0.5, width: 0.7, depth: 0.5 },
            ),
            Preset::DriverFocus => build(
                [-2.0, 0.0, 2.0, 3.0, 1.0, -1.0],
                Tone { bass_boost: 0.0, sub_level: -2.0, loudness: false, clarity: 0.9, reverb: 0.0, limiter: true },
                Surround { enabled: false, mode: SurroundMode::Cabin, mix: 0.0 },
                Spatial { width: 0.4, depth: 0.3, height: 0.3 },
                Stage { center: 0.8, width: 0.3, depth: 0.3 },
            ),
            Preset::Night => build(
                [-3.0, -1.0, 1.0, 1.0, -1.0, -3.0],
                Tone { bass_boost: 0.0, sub_level: -4.0, loudness: true, clarity: 0.7, reverb: 0.05, limiter: true },
                Surround { enabled: false, mode: SurroundMode::Cabin, mix: 0.05 },
                Spatial { width: 0.4, depth: 0.4, height: 0.3 },
                Stage { center: 0.7, width: 0.4, depth: 0.4 },
            ),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    /// Accepts the catalog key or its spoken form ("driver focus", "driver-focus")
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name() == key)
            .ok_or_else(|| Error::UnknownPreset(s.trim().to_string()))
    }
}

struct Tone {
    bass_boost: f64,
    sub_level: f64,
    loudness: bool,
    clarity: f64,
    reverb: f64,
    limiter: bool,
}

fn build(gains: [f64; 6], tone: Tone, surround: Surround, spatial: Spatial, stage: Stage) -> DspSettings {
    DspSettings {
        eq: EQ_BAND_FREQUENCIES_HZ
            .iter()
            .zip(gains)
            .map(|(&freq, gain)| EqBand::new(freq, gain, DEFAULT_Q))
            .collect(),
        bass_boost: tone.bass_boost,
        sub_level: tone.sub_level,
        loudness: tone.loudness,
        clarity: tone.clarity,
        reverb: tone.reverb,
        limiter: tone.limiter,
        surround,
        spatial,
        stage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_nine_presets() {
        assert_eq!(Preset::ALL.len(), 9);
        let names: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec!["reference", "concert", "hall", "live", "stadium", "studio", "club", "driver_focus", "night"]
        );
    }

    #[test]
    fn test_every_preset_has_six_bands() {
        for preset in Preset::ALL {
            let settings = preset.settings();
            assert_eq!(settings.eq.len(), 6, "{}", preset);
            for band in &settings.eq {
                assert!((-12.0..=12.0).contains(&band.gain_db));
            }
        }
    }

    #[test]
    fn test_parse_accepts_spoken_forms() {
        assert_eq!("driver_focus".parse::<Preset>().unwrap(), Preset::DriverFocus);
        assert_eq!("Driver Focus".parse::<Preset>().unwrap(), Preset::DriverFocus);
        assert_eq!("driver-focus".parse::<Preset>().unwrap(), Preset::DriverFocus);
        assert_eq!(" NIGHT ".parse::<Preset>().unwrap(), Preset::Night);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "jazz".parse::<Preset>().unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(ref name) if name == "jazz"));
        assert!("".parse::<Preset>().is_err());
    }

    #[test]
    fn test_safe_and_immersive_are_disjoint() {
        for preset in Preset::ALL {
            assert!(!(preset.is_driver_safe() && preset.is_immersive()), "{}", preset);
        }
    }

    #[test]
    fn test_serde_uses_catalog_key() {
        assert_eq!(serde_json::to_string(&Preset::DriverFocus).unwrap(), "\"driver_focus\"");
        let parsed: Preset = serde_json::from_str("\"night\"").unwrap();
        assert_eq!(parsed, Preset::Night);
    }
}
