//! # IVI Core Library (ivi-core)
//!
//! Orchestration and state-machine layer of an in-vehicle infotainment unit.
//!
//! **Purpose:** Hold the authoritative runtime state of the Bluetooth link,
//! DSP profile, route, playback queue, alert feed, diagnostics and driver
//! profiles, and route free-form driver requests to them under
//! driver-safety gating.
//!
//! **Architecture:** Leaf components own their state and never call each
//! other. The [`hub::Hub`] owns all of them plus the driver and vehicle state;
//! the [`assistant`] router is a stateless table of (predicate, handler)
//! pairs evaluated against the hub. The [`catalog`] loader and [`shell`]
//! are the only code that touches I/O.

pub mod alerts;
pub mod assistant;
pub mod audio;
pub mod catalog;
pub mod connection;
pub mod diagnostics;
pub mod error;
pub mod hub;
pub mod playback;
pub mod profiles;
pub mod report;
pub mod route;
pub mod shell;
pub mod state;
pub mod tuner;

pub use error::{Error, ErrorKind, Result};
pub use hub::{Hub, HubHandle, HubSettings};
