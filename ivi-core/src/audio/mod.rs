//! DSP profile engine
//!
//! **Components:**
//! - `presets` - closed catalog of named DSP settings
//! - `types` - DspSettings, merge patches, output levels
//! - `engine` - owner of the active settings and output state

pub mod engine;
pub mod presets;
pub mod types;

pub use engine::{AudioProfileEngine, SettingsSource};
pub use presets::Preset;
pub use types::{
    DspPatch, DspSettings, EqBand, OutputState, Spatial, SpatialPatch, Stage, Surround,
    SurroundMode, SurroundPatch,
};
