//! Playback queue state machine
//!
//! States are Idle, Playing and Paused. The status is derived, never stored:
//! an empty queue is Idle, otherwise the `playing` flag picks Playing or
//! Paused. That keeps "current track is set iff the queue is non-empty"
//! true by construction.

use super::library::{Library, Playlist, Track};
use crate::error::{Error, Result};
use ivi_common::events::PlayerStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Snapshot of the queue, independent of the live state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub status: PlayerStatus,
    pub is_playing: bool,
    pub track: Option<Track>,
    pub queue: Vec<Track>,
    pub queue_name: Option<String>,
    pub cursor: usize,
}

pub struct PlaybackQueue {
    library: Arc<Library>,
    queue: Vec<Track>,
    queue_name: Option<String>,
    cursor: usize,
    playing: bool,
}

impl PlaybackQueue {
    pub fn new(library: Arc<Library>) -> Self {
        Self {
            library,
            queue: Vec::new(),
            queue_name: None,
            cursor: 0,
            playing: false,
        }
    }

    /// Replace the queue with a single track and start playing
    pub fn play_track(&mut self, track: Track) -> PlaybackState {
        info!("Playing track {} ({})", track.title, track.id);
        self.queue = vec![track];
        self.queue_name = None;
        self.cursor = 0;
        self.playing = true;
        self.state()
    }

    /// Resolve a playlist against the library and start from its first track
    ///
    /// Unresolvable ids are dropped; order and duplicates are preserved.
    /// Fails without touching the current queue when nothing resolves.
    pub fn play_playlist(&mut self, playlist: &Playlist) -> Result<PlaybackState> {
        let resolved: Vec<Track> = playlist
            .track_ids
            .iter()
            .filter_map(|id| self.library.track(id).cloned())
            .collect();

        if resolved.is_empty() {
            return Err(Error::EmptyPlaylist(playlist.name.clone()));
        }

        let dropped = playlist.track_ids.len() - resolved.len();
        if dropped > 0 {
            debug!("Playlist {}: skipped {} missing track ids", playlist.id, dropped);
        }
        info!("Playing playlist {} ({} tracks)", playlist.name, resolved.len());

        self.queue = resolved;
        self.queue_name = Some(playlist.name.clone());
        self.cursor = 0;
        self.playing = true;
        Ok(self.state())
    }

    /// Stop advancing; never fails, even with nothing loaded
    pub fn pause(&mut self) -> PlaybackState {
        self.playing = false;
        self.state()
    }

    pub fn resume(&mut self) -> Result<PlaybackState> {
        if self.queue.is_empty() {
            return Err(Error::NoTrackLoaded);
        }
        self.playing = true;
        Ok(self.state())
    }

    /// Advance the cursor, wrapping to the start
    pub fn next(&mut self) -> Result<PlaybackState> {
        let len = self.queue.len();
        if len == 0 {
            return Err(Error::EmptyQueue);
        }
        self.cursor = (self.cursor + 1) % len;
        self.playing = true;
        Ok(self.state())
    }

    /// Retreat the cursor, wrapping to the end
    pub fn previous(&mut self) -> Result<PlaybackState> {
        let len = self.queue.len();
        if len == 0 {
            return Err(Error::EmptyQueue);
        }
        self.cursor = (self.cursor + len - 1) % len;
        self.playing = true;
        Ok(self.state())
    }

    pub fn status(&self) -> PlayerStatus {
        match (self.queue.is_empty(), self.playing) {
            (true, _) => PlayerStatus::Idle,
            (false, true) => PlayerStatus::Playing,
            (false, false) => PlayerStatus::Paused,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.get(self.cursor)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn state(&self) -> PlaybackState {
        let status = self.status();
        PlaybackState {
            status,
            is_playing: status == PlayerStatus::Playing,
            track: self.current_track().cloned(),
            queue: self.queue.clone(),
            queue_name: self.queue_name.clone(),
            cursor: self.cursor,
        }
    }
}
