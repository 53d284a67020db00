//! Cabin auto-tune analysis
//!
//! Pure function from a calibration snapshot (microphone sweep of the cabin)
//! to a recommendation the audio engine can merge. No state, no I/O.
//!
//! **Algorithm:**
//! 1. Split samples into low (≤200 Hz), mid (200–2000 Hz] and high (>2000 Hz)
//! 2. Average measured dB per band (0 for an empty band)
//! 3. Counter each band with a quarter of its average at 60/250/4000 Hz
//! 4. Derive surround mix and target loudness from ambient noise, stage
//!    focus from the mid/low balance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const LOW_BAND_MAX_HZ: f64 = 200.0;
const MID_BAND_MAX_HZ: f64 = 2000.0;

/// One measured point of the calibration sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub frequency_hz: f64,
    /// Deviation from the target response in dB
    pub measured_db: f64,
}

/// Capture context, informational only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationMetadata {
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub microphone: Option<String>,
    #[serde(default)]
    pub seat: Option<String>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Cabin measurement the tuner works from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSnapshot {
    pub samples: Vec<CalibrationSample>,
    /// Cabin noise floor in dB SPL
    pub ambient_noise_db: f64,
    #[serde(default)]
    pub metadata: CalibrationMetadata,
}

/// Gain change for the band centred at `frequency_hz`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqAdjustment {
    pub frequency_hz: f64,
    pub delta_db: f64,
}

/// Auto-tune recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoTuneResult {
    pub eq_adjustments: Vec<EqAdjustment>,
    /// 0.2..=0.7
    pub surround_mix: f64,
    /// 0.4..=0.8
    pub stage_focus: f64,
    /// 70..=88 dB
    pub target_loudness: f64,
}

/// Band averages computed from a snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandAverages {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl BandAverages {
    pub fn from_samples(samples: &[CalibrationSample]) -> Self {
        let mut sums = [0.0_f64; 3];
        let mut counts = [0_usize; 3];
        for sample in samples {
            let idx = if sample.frequency_hz <= LOW_BAND_MAX_HZ {
                0
            } else if sample.frequency_hz <= MID_BAND_MAX_HZ {
                1
            } else {
                2
            };
            sums[idx] += sample.measured_db;
            counts[idx] += 1;
        }
        let avg = |i: usize| if counts[i] == 0 { 0.0 } else { sums[i] / counts[i] as f64 };
        Self {
            low: avg(0),
            mid: avg(1),
            high: avg(2),
        }
    }
}

/// Analyze a calibration snapshot
pub fn analyze(snapshot: &CalibrationSnapshot) -> AutoTuneResult {
    let bands = BandAverages::from_samples(&snapshot.samples);
    let noise = snapshot.ambient_noise_db;

    let eq_adjustments = vec![
        EqAdjustment {
            frequency_hz: 60.0,
            delta_db: (-bands.low / 4.0).clamp(-6.0, 6.0),
        },
        EqAdjustment {
            frequency_hz: 250.0,
            delta_db: (-bands.mid / 4.0).clamp(-4.0, 4.0),
        },
        EqAdjustment {
            frequency_hz: 4000.0,
            delta_db: (-bands.high / 4.0).clamp(-4.0, 4.0),
        },
    ];

    AutoTuneResult {
        eq_adjustments,
        surround_mix: (0.35 + (noise - 40.0) / 100.0).clamp(0.2, 0.7),
        stage_focus: (0.55 + (bands.mid - bands.low) / 40.0).clamp(0.4, 0.8),
        target_loudness: (78.0 + (45.0 - noise)).clamp(70.0, 88.0),
    }
}
