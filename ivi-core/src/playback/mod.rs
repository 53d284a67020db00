//! Music playback
//!
//! **Components:**
//! - `library` - read-only track and playlist catalog
//! - `queue` - ordered queue with cursor and Idle/Playing/Paused state

pub mod library;
pub mod queue;

pub use library::{Library, Playlist, Track};
pub use queue::{PlaybackQueue, PlaybackState};
