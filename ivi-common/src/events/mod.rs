//! Event types for the IVI event system
//!
//! Provides shared event definitions and the EventBus used by the hub to
//! publish state changes.

mod playback_types;

pub use playback_types::{FocusMode, HealthStatus, PlayerStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// IVI event types
///
/// Every component state change the hub performs is announced with one of
/// these. Events are plain data and serialize with a `type` tag so a display
/// surface can consume them as JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IviEvent {
    /// Bluetooth connection created, replaced or cleared
    ConnectionChanged {
        /// Connected device id, None after disconnect
        device_id: Option<String>,
        /// Active Bluetooth profile name (A2DP/HFP/AVRCP)
        profile: Option<String>,
        /// Whether audio is streaming over the link
        streaming: bool,
        timestamp: DateTime<Utc>,
    },

    /// DSP settings replaced wholesale from a preset
    PresetApplied {
        preset: String,
        timestamp: DateTime<Utc>,
    },

    /// DSP settings partially merged (custom patch or auto-tune)
    DspAdjusted {
        /// What caused the merge ("custom" or "auto_tune")
        source: String,
        timestamp: DateTime<Utc>,
    },

    /// Volume, balance, fader or mute changed
    OutputChanged {
        volume: u8,
        balance: f64,
        fader: f64,
        muted: bool,
        timestamp: DateTime<Utc>,
    },

    /// Playback queue state changed (Idle/Playing/Paused)
    PlaybackStateChanged {
        old_state: PlayerStatus,
        new_state: PlayerStatus,
        timestamp: DateTime<Utc>,
    },

    /// Current track changed (new queue or cursor moved)
    TrackChanged {
        track_id: Option<String>,
        /// Playlist name when playing a named queue
        queue_name: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Route recomputed
    RouteUpdated {
        destination: String,
        distance_km: f64,
        eta_minutes: u32,
        timestamp: DateTime<Utc>,
    },

    /// Driver profile switched
    ProfileActivated {
        profile_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Speed or focus mode changed
    DriverStateChanged {
        speed_kph: f64,
        is_moving: bool,
        focus_mode: FocusMode,
        timestamp: DateTime<Utc>,
    },

    /// Diagnostics scan finished
    DiagnosticsCompleted {
        health: HealthStatus,
        issue_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl IviEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            IviEvent::ConnectionChanged { .. } => "ConnectionChanged",
            IviEvent::PresetApplied { .. } => "PresetApplied",
            IviEvent::DspAdjusted { .. } => "DspAdjusted",
            IviEvent::OutputChanged { .. } => "OutputChanged",
            IviEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            IviEvent::TrackChanged { .. } => "TrackChanged",
            IviEvent::RouteUpdated { .. } => "RouteUpdated",
            IviEvent::ProfileActivated { .. } => "ProfileActivated",
            IviEvent::DriverStateChanged { .. } => "DriverStateChanged",
            IviEvent::DiagnosticsCompleted { .. } => "DiagnosticsCompleted",
        }
    }
}

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use ivi_common::events::{EventBus, IviEvent, PlayerStatus};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(IviEvent::PlaybackStateChanged {
///     old_state: PlayerStatus::Paused,
///     new_state: PlayerStatus::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(IviEvent::PlaybackStateChanged { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IviEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<IviEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: IviEvent) -> Result<usize, broadcast::error::SendError<IviEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: IviEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(8);
        let result = bus.emit(IviEvent::PresetApplied {
            preset: "hall".to_string(),
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit_lossy(IviEvent::PresetApplied {
            preset: "hall".to_string(),
            timestamp: Utc::now(),
        });
        bus.emit_lossy(IviEvent::ProfileActivated {
            profile_id: "commuter".to_string(),
            timestamp: Utc::now(),
        });

        assert_eq!(rx.try_recv().unwrap().name(), "PresetApplied");
        assert_eq!(rx.try_recv().unwrap().name(), "ProfileActivated");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = IviEvent::DiagnosticsCompleted {
            health: HealthStatus::Attention,
            issue_count: 2,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "DiagnosticsCompleted");
        assert_eq!(json["health"], "attention");
    }

    #[test]
    fn test_health_ordering() {
        assert!(HealthStatus::Critical > HealthStatus::Attention);
        assert!(HealthStatus::Attention > HealthStatus::Good);
    }
}
