//! Driver profiles
//!
//! A static catalog with exactly one active entry. Construction fails on an
//! empty catalog, so `active()` can always return a profile.

use crate::audio::Preset;
use crate::error::{Error, Result};
use ivi_common::events::FocusMode;
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the assistant phrases its answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStyle {
    #[default]
    Friendly,
    Concise,
    Calm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: String,
    pub display_name: String,
    pub preferred_preset: Preset,
    pub preferred_volume: u8,
    #[serde(default)]
    pub voice_style: VoiceStyle,
    #[serde(default)]
    pub focus_mode: FocusMode,
}

#[derive(Debug)]
pub struct ProfileStore {
    profiles: Vec<DriverProfile>,
    active: usize,
}

impl ProfileStore {
    /// First entry becomes active
    pub fn new(profiles: Vec<DriverProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(Error::EmptyProfileCatalog);
        }
        Ok(Self { profiles, active: 0 })
    }

    pub fn active(&self) -> &DriverProfile {
        &self.profiles[self.active]
    }

    /// Activate a profile by exact id or case-insensitive display name
    pub fn select(&mut self, id_or_name: &str) -> Result<DriverProfile> {
        let key = id_or_name.trim().to_lowercase();
        let index = self
            .profiles
            .iter()
            .position(|p| p.id.to_lowercase() == key)
            .or_else(|| {
                self.profiles
                    .iter()
                    .position(|p| p.display_name.to_lowercase() == key)
            })
            .ok_or_else(|| Error::ProfileNotFound(id_or_name.trim().to_string()))?;

        self.active = index;
        let profile = self.active().clone();
        info!("Activated driver profile {} ({})", profile.id, profile.display_name);
        Ok(profile)
    }

    pub fn list(&self) -> &[DriverProfile] {
        &self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, focus: FocusMode) -> DriverProfile {
        DriverProfile {
            id: id.to_string(),
            display_name: name.to_string(),
            preferred_preset: Preset::Reference,
            preferred_volume: 35,
            voice_style: VoiceStyle::Friendly,
            focus_mode: focus,
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(ProfileStore::new(vec![]), Err(Error::EmptyProfileCatalog)));
    }

    #[test]
    fn test_first_entry_active() {
        let store = ProfileStore::new(vec![
            profile("alex", "Alex", FocusMode::Standard),
            profile("night", "Night Shift", FocusMode::Safety),
        ])
        .unwrap();
        assert_eq!(store.active().id, "alex");
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_select_by_id_or_name() {
        let mut store = ProfileStore::new(vec![
            profile("alex", "Alex", FocusMode::Standard),
            profile("night", "Night Shift", FocusMode::Safety),
        ])
        .unwrap();
        assert_eq!(store.select("night shift").unwrap().id, "night");
        assert_eq!(store.active().focus_mode, FocusMode::Safety);
        assert_eq!(store.select("ALEX").unwrap().id, "alex");
    }

    #[test]
    fn test_select_unknown_keeps_active() {
        let mut store = ProfileStore::new(vec![profile("alex", "Alex", FocusMode::Standard)]).unwrap();
        assert!(matches!(store.select("sam"), Err(Error::ProfileNotFound(_))));
        assert_eq!(store.active().id, "alex");
    }
}
