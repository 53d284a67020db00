//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration is a small TOML file. Everything in it has a
//! compiled default, so running without any file is never fatal: the loader logs a
//! warning and carries on with defaults.

use crate::{Error, GeoPoint, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "IVI_CONFIG";

/// Environment variable naming the catalog data folder
pub const DATA_FOLDER_ENV_VAR: &str = "IVI_DATA_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding catalog JSON files (optional, built-in samples otherwise)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Driver-safety thresholds
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Initial vehicle/driver state at startup
    #[serde(default)]
    pub vehicle: VehicleConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Driver-safety thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SafetyConfig {
    /// Speed above which the driver counts as moving
    #[serde(default = "default_moving_threshold_kph")]
    pub moving_threshold_kph: f64,

    /// Extra radius added to alert geofences when asking for nearby alerts
    #[serde(default = "default_alert_radius_km")]
    pub alert_radius_km: f64,
}

/// Initial vehicle state
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleConfig {
    #[serde(default = "default_driver_name")]
    pub driver_name: String,

    #[serde(default = "default_start_latitude")]
    pub start_latitude: f64,

    #[serde(default = "default_start_longitude")]
    pub start_longitude: f64,

    #[serde(default)]
    pub heading_deg: f64,

    #[serde(default = "default_outside_temp_c")]
    pub outside_temp_c: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_moving_threshold_kph() -> f64 {
    5.0
}

fn default_alert_radius_km() -> f64 {
    25.0
}

fn default_driver_name() -> String {
    "Driver".to_string()
}

// Downtown San Francisco
fn default_start_latitude() -> f64 {
    37.7749
}

fn default_start_longitude() -> f64 {
    -122.4194
}

fn default_outside_temp_c() -> f64 {
    18.0
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            moving_threshold_kph: default_moving_threshold_kph(),
            alert_radius_km: default_alert_radius_km(),
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            driver_name: default_driver_name(),
            start_latitude: default_start_latitude(),
            start_longitude: default_start_longitude(),
            heading_deg: 0.0,
            outside_temp_c: default_outside_temp_c(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_folder: None,
            logging: LoggingConfig::default(),
            safety: SafetyConfig::default(),
            vehicle: VehicleConfig::default(),
        }
    }
}

impl VehicleConfig {
    pub fn start_location(&self) -> GeoPoint {
        GeoPoint::new(self.start_latitude, self.start_longitude)
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with graceful degradation
    ///
    /// Search order:
    /// 1. Explicit path argument (must exist if given)
    /// 2. `IVI_CONFIG` environment variable (must exist if set)
    /// 3. Platform config dir (`~/.config/ivi/config.toml` on Linux)
    /// 4. Compiled defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.safety.moving_threshold_kph.is_finite() || self.safety.moving_threshold_kph < 0.0 {
            return Err(Error::Config(format!(
                "safety.moving_threshold_kph must be a non-negative number, got {}",
                self.safety.moving_threshold_kph
            )));
        }
        if !self.safety.alert_radius_km.is_finite() || self.safety.alert_radius_km < 0.0 {
            return Err(Error::Config(format!(
                "safety.alert_radius_km must be a non-negative number, got {}",
                self.safety.alert_radius_km
            )));
        }
        if !(-90.0..=90.0).contains(&self.vehicle.start_latitude)
            || !(-180.0..=180.0).contains(&self.vehicle.start_longitude)
        {
            return Err(Error::Config(format!(
                "vehicle start location {} is out of range",
                self.vehicle.start_location()
            )));
        }
        Ok(())
    }
}

/// Platform default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ivi").join("config.toml"))
}

/// Data folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. None: caller falls back to the built-in sample catalog
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_FOLDER_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    config.data_folder.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.safety.moving_threshold_kph, 5.0);
        assert_eq!(config.safety.alert_radius_km, 25.0);
        assert_eq!(config.vehicle.driver_name, "Driver");
        assert!(config.data_folder.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
            [safety]
            moving_threshold_kph = 8.5

            [vehicle]
            driver_name = "Avery"
            "#,
        )
        .unwrap();
        assert_eq!(config.safety.moving_threshold_kph, 8.5);
        assert_eq!(config.safety.alert_radius_km, 25.0);
        assert_eq!(config.vehicle.driver_name, "Avery");
        assert_eq!(config.vehicle.start_latitude, 37.7749);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = TomlConfig::from_toml_str("[safety]\nmoving_threshold_kph = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let err = TomlConfig::from_toml_str("[vehicle]\nstart_latitude = 123.0\n").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("data_folder = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
