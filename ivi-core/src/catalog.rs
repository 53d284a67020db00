//! Catalog loading
//!
//! Builds the typed records the components are constructed from. The sample
//! set under `data/` is embedded at compile time; a data folder may override
//! any subset of files. Components never read files themselves.

use crate::alerts::Alert;
use crate::connection::BluetoothDevice;
use crate::diagnostics::KnowledgeEntry;
use crate::playback::Library;
use crate::profiles::DriverProfile;
use crate::tuner::CalibrationSnapshot;
use ivi_common::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

pub const LIBRARY_FILE: &str = "library.json";
pub const ALERTS_FILE: &str = "alerts.json";
pub const KNOWLEDGE_BASE_FILE: &str = "knowledge_base.json";
pub const DEVICES_FILE: &str = "devices.json";
pub const PROFILES_FILE: &str = "profiles.json";
pub const CALIBRATION_FILE: &str = "calibration.json";

const BUILTIN_LIBRARY: &str = include_str!("../data/library.json");
const BUILTIN_ALERTS: &str = include_str!("../data/alerts.json");
const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../data/knowledge_base.json");
const BUILTIN_DEVICES: &str = include_str!("../data/devices.json");
const BUILTIN_PROFILES: &str = include_str!("../data/profiles.json");
const BUILTIN_CALIBRATION: &str = include_str!("../data/calibration.json");

/// Every input record set the hub needs
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub library: Library,
    pub alerts: Vec<Alert>,
    pub knowledge_base: Vec<KnowledgeEntry>,
    pub devices: Vec<BluetoothDevice>,
    pub profiles: Vec<DriverProfile>,
    pub calibration: CalibrationSnapshot,
}

impl Catalogs {
    /// Parse the embedded sample set
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            library: parse(LIBRARY_FILE, BUILTIN_LIBRARY)?,
            alerts: parse(ALERTS_FILE, BUILTIN_ALERTS)?,
            knowledge_base: parse(KNOWLEDGE_BASE_FILE, BUILTIN_KNOWLEDGE_BASE)?,
            devices: parse(DEVICES_FILE, BUILTIN_DEVICES)?,
            profiles: parse(PROFILES_FILE, BUILTIN_PROFILES)?,
            calibration: parse(CALIBRATION_FILE, BUILTIN_CALIBRATION)?,
        })
    }

    /// Load from a data folder, file by file
    ///
    /// A missing file falls back to its built-in counterpart. A file that
    /// exists but does not parse is an error.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "data folder {} does not exist",
                dir.display()
            )));
        }
        info!("Loading catalogs from {}", dir.display());

        Ok(Self {
            library: load(dir, LIBRARY_FILE, BUILTIN_LIBRARY)?,
            alerts: load(dir, ALERTS_FILE, BUILTIN_ALERTS)?,
            knowledge_base: load(dir, KNOWLEDGE_BASE_FILE, BUILTIN_KNOWLEDGE_BASE)?,
            devices: load(dir, DEVICES_FILE, BUILTIN_DEVICES)?,
            profiles: load(dir, PROFILES_FILE, BUILTIN_PROFILES)?,
            calibration: load(dir, CALIBRATION_FILE, BUILTIN_CALIBRATION)?,
        })
    }

    /// `from_dir` when a folder is given, `builtin` otherwise
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => {
                info!("Using built-in sample catalogs");
                Self::builtin()
            }
        }
    }
}

fn parse<T: DeserializeOwned>(file: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|source| Error::Catalog {
        file: file.to_string(),
        source,
    })
}

fn load<T: DeserializeOwned>(dir: &Path, file: &str, builtin: &str) -> Result<T> {
    let path = dir.join(file);
    if !path.exists() {
        debug!("{} not found in data folder, using built-in", file);
        return parse(file, builtin);
    }
    let content = std::fs::read_to_string(&path)?;
    debug!("Read {} ({} bytes)", path.display(), content.len());
    parse(file, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs_parse() {
        let catalogs = Catalogs::builtin().unwrap();
        assert!(!catalogs.library.tracks.is_empty());
        assert!(!catalogs.library.playlists.is_empty());
        assert!(!catalogs.alerts.is_empty());
        assert!(!catalogs.knowledge_base.is_empty());
        assert!(!catalogs.devices.is_empty());
        assert!(!catalogs.profiles.is_empty());
        assert!(!catalogs.calibration.samples.is_empty());
    }

    #[test]
    fn test_missing_dir_is_config_error() {
        let err = Catalogs::from_dir(Path::new("/nonexistent/ivi-data")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
