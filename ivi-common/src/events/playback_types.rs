//! State enumerations shared by events and component snapshots

use serde::{Deserialize, Serialize};

/// Playback queue state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    /// Nothing loaded
    #[default]
    Idle,
    /// Current track is playing
    Playing,
    /// Current track is loaded but paused
    Paused,
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Idle => write!(f, "idle"),
            PlayerStatus::Playing => write!(f, "playing"),
            PlayerStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Driver-selected safety posture
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    Standard,
    /// Terse assistant, driver-focused recommendations
    Safety,
}

impl std::fmt::Display for FocusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FocusMode::Standard => write!(f, "standard"),
            FocusMode::Safety => write!(f, "safety"),
        }
    }
}

/// Overall result of a diagnostics scan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Good,
    Attention,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Good => write!(f, "good"),
            HealthStatus::Attention => write!(f, "attention"),
            HealthStatus::Critical => write!(f, "critical"),
        }
    }
}
