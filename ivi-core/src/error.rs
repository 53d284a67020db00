//! Error types for ivi-core
//!
//! Component operations fail synchronously and locally with one of these.
//! The assistant router turns them into spoken responses; the shell prints
//! them as a single line.

use thiserror::Error;

/// Error class, used by callers that only care about the broad category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown device, destination, profile, preset, track or playlist
    NotFound,
    /// Operation not valid in the current state
    InvalidState,
    /// Input rejected at the boundary
    Validation,
}

/// Main error type for ivi-core
#[derive(Error, Debug)]
pub enum Error {
    /// Device id absent from the discovery snapshot
    #[error("Bluetooth device not found: {0}")]
    DeviceNotFound(String),

    /// Connect attempted on a device that was never paired
    #[error("Device {0} is not paired")]
    NotPaired(String),

    /// Device does not advertise the requested profile
    #[error("Device {device} does not support {profile}")]
    UnsupportedProfile { device: String, profile: String },

    /// Preset name outside the fixed catalog
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Destination name outside the named-location table
    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    /// Route computation without an active destination
    #[error("No destination set")]
    NoDestination,

    /// Track lookup failed
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Playlist lookup failed
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// None of the playlist's track ids resolved against the library
    #[error("Playlist {0} has no playable tracks")]
    EmptyPlaylist(String),

    /// Resume with nothing loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Next/previous on an empty queue
    #[error("Playback queue is empty")]
    EmptyQueue,

    /// Driver profile lookup failed
    #[error("Driver profile not found: {0}")]
    ProfileNotFound(String),

    /// Profile store constructed from an empty catalog
    #[error("Driver profile catalog is empty")]
    EmptyProfileCatalog,

    /// Operation refused while the vehicle is moving
    #[error("{0} is only available once the vehicle is parked")]
    NotParked(String),

    /// Malformed value at the boundary (bad number, unknown enum name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration or catalog loading failure
    #[error(transparent)]
    Common(#[from] ivi_common::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DeviceNotFound(_)
            | Error::UnknownPreset(_)
            | Error::UnknownDestination(_)
            | Error::TrackNotFound(_)
            | Error::PlaylistNotFound(_)
            | Error::EmptyPlaylist(_)
            | Error::ProfileNotFound(_) => ErrorKind::NotFound,
            Error::NotPaired(_)
            | Error::UnsupportedProfile { .. }
            | Error::NoDestination
            | Error::NoTrackLoaded
            | Error::EmptyQueue
            | Error::EmptyProfileCatalog
            | Error::NotParked(_) => ErrorKind::InvalidState,
            Error::InvalidInput(_) | Error::Common(_) => ErrorKind::Validation,
        }
    }
}

/// Convenience Result type using ivi-core Error
pub type Result<T> = std::result::Result<T, Error>;
