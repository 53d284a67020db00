//! Shared fixtures for ivi-core integration tests

#![allow(dead_code)]

use ivi_common::config::TomlConfig;
use ivi_core::catalog::Catalogs;
use ivi_core::Hub;

/// Hub over the built-in sample catalogs with default config
pub fn test_hub() -> Hub {
    Hub::new(Catalogs::builtin().unwrap(), &TomlConfig::default()).unwrap()
}

/// Hub already driving at `kph`
pub fn moving_hub(kph: f64) -> Hub {
    let mut hub = test_hub();
    hub.update_speed(kph);
    assert!(hub.driver().is_moving);
    hub
}

/// Gains of every EQ band
pub fn gains(hub: &Hub) -> Vec<f64> {
    hub.dsp_settings().eq.iter().map(|b| b.gain_db).collect()
}
