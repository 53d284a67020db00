//! DSP settings, merge patches and output levels

use serde::{Deserialize, Serialize};

/// EQ gain limits after any merge
pub const EQ_GAIN_MIN_DB: f64 = -12.0;
pub const EQ_GAIN_MAX_DB: f64 = 12.0;

/// Centre frequencies of the six-band equalizer
pub const EQ_BAND_FREQUENCIES_HZ: [f64; 6] = [60.0, 250.0, 1000.0, 4000.0, 8000.0, 16000.0];

/// Frequencies within this distance count as the same band
const FREQUENCY_MATCH_TOLERANCE_HZ: f64 = 0.5;

/// One equalizer band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    pub frequency_hz: f64,
    pub gain_db: f64,
    pub q: f64,
}

impl EqBand {
    pub fn new(frequency_hz: f64, gain_db: f64, q: f64) -> Self {
        Self { frequency_hz, gain_db, q }
    }

    pub fn matches_frequency(&self, frequency_hz: f64) -> bool {
        (self.frequency_hz - frequency_hz).abs() <= FREQUENCY_MATCH_TOLERANCE_HZ
    }
}

/// Surround rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurroundMode {
    Cabin,
    Hall,
    Stage,
    Arena,
    Club,
    Studio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surround {
    pub enabled: bool,
    pub mode: SurroundMode,
    /// Wet mix, 0..=1
    pub mix: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spatial {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

/// Virtual sound stage placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// How strongly the image is pulled to the driver's centre, 0..=1
    pub center: f64,
    pub width: f64,
    pub depth: f64,
}

/// Complete DSP state. Exactly one is active in the engine at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DspSettings {
    pub eq: Vec<EqBand>,
    pub bass_boost: f64,
    pub sub_level: f64,
    pub loudness: bool,
    pub clarity: f64,
    pub reverb: f64,
    pub limiter: bool,
    pub surround: Surround,
    pub spatial: Spatial,
    pub stage: Stage,
}

/// Partial update of `surround`, merged field by field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurroundPatch {
    pub enabled: Option<bool>,
    pub mode: Option<SurroundMode>,
    pub mix: Option<f64>,
}

/// Partial update of `spatial`, merged field by field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialPatch {
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub height: Option<f64>,
}

/// Partial update of DspSettings
///
/// `None` leaves the field alone. `eq` and `stage` replace wholesale when
/// present; `surround` and `spatial` merge per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspPatch {
    pub eq: Option<Vec<EqBand>>,
    pub bass_boost: Option<f64>,
    pub sub_level: Option<f64>,
    pub loudness: Option<bool>,
    pub clarity: Option<f64>,
    pub reverb: Option<f64>,
    pub limiter: Option<bool>,
    pub surround: Option<SurroundPatch>,
    pub spatial: Option<SpatialPatch>,
    pub stage: Option<Stage>,
}

impl DspPatch {
    pub fn is_empty(&self) -> bool {
        *self == DspPatch::default()
    }
}

impl DspSettings {
    /// Apply a patch, returning the merged settings
    ///
    /// Total: every patch produces valid settings. EQ gains are clamped to
    /// [-12, 12] dB and surround mix to [0, 1].
    pub fn merged(&self, patch: &DspPatch) -> DspSettings {
        let mut next = self.clone();

        if let Some(ref eq) = patch.eq {
            next.eq = eq
                .iter()
                .map(|band| EqBand {
                    gain_db: clamp_gain(band.gain_db),
                    ..*band
                })
                .collect();
        }
        if let Some(v) = patch.bass_boost {
            next.bass_boost = v;
        }
        if let Some(v) = patch.sub_level {
            next.sub_level = v;
        }
        if let Some(v) = patch.loudness {
            next.loudness = v;
        }
        if let Some(v) = patch.clarity {
            next.clarity = v;
        }
        if let Some(v) = patch.reverb {
            next.reverb = v;
        }
        if let Some(v) = patch.limiter {
            next.limiter = v;
        }
        if let Some(ref s) = patch.surround {
            if let Some(enabled) = s.enabled {
                next.surround.enabled = enabled;
            }
            if let Some(mode) = s.mode {
                next.surround.mode = mode;
            }
            if let Some(mix) = s.mix {
                next.surround.mix = clamp_unit(mix);
            }
        }
        if let Some(ref s) = patch.spatial {
            if let Some(width) = s.width {
                next.spatial.width = width;
            }
            if let Some(depth) = s.depth {
                next.spatial.depth = depth;
            }
            if let Some(height) = s.height {
                next.spatial.height = height;
            }
        }
        if let Some(stage) = patch.stage {
            next.stage = stage;
        }

        next
    }

    pub fn band(&self, frequency_hz: f64) -> Option<&EqBand> {
        self.eq.iter().find(|b| b.matches_frequency(frequency_hz))
    }
}

/// Volume/balance/fader/mute, independent of DSP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputState {
    /// 0..=100
    pub volume: u8,
    /// -1 (left) ..= 1 (right)
    pub balance: f64,
    /// -1 (rear) ..= 1 (front)
    pub fader: f64,
    pub muted: bool,
}

impl Default for OutputState {
    fn default() -> Self {
        Self {
            volume: 40,
            balance: 0.0,
            fader: 0.0,
            muted: false,
        }
    }
}

pub(crate) fn clamp_gain(gain_db: f64) -> f64 {
    if gain_db.is_nan() {
        return 0.0;
    }
    gain_db.clamp(EQ_GAIN_MIN_DB, EQ_GAIN_MAX_DB)
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

pub(crate) fn clamp_signed_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}
