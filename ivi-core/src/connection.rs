//! Bluetooth connection manager
//!
//! Tracks the discovery snapshot, the paired set and the single live
//! connection. A new `connect` silently replaces whatever was connected
//! before (last writer wins); there is no teardown handshake.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Bluetooth profile a connection can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BtProfile {
    /// Advanced Audio Distribution (media streaming)
    #[default]
    A2dp,
    /// Hands-Free
    Hfp,
    /// Audio/Video Remote Control
    Avrcp,
}

impl std::fmt::Display for BtProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtProfile::A2dp => write!(f, "A2DP"),
            BtProfile::Hfp => write!(f, "HFP"),
            BtProfile::Avrcp => write!(f, "AVRCP"),
        }
    }
}

impl FromStr for BtProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a2dp" => Ok(BtProfile::A2dp),
            "hfp" => Ok(BtProfile::Hfp),
            "avrcp" => Ok(BtProfile::Avrcp),
            other => Err(Error::InvalidInput(format!("unknown Bluetooth profile '{}'", other))),
        }
    }
}

/// Device seen during discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    pub id: String,
    pub name: String,
    /// Device class, e.g. "phone" or "tablet"
    #[serde(default)]
    pub kind: String,
    pub profiles: Vec<BtProfile>,
    /// Signal strength in dBm at discovery time
    #[serde(default)]
    pub rssi: Option<i16>,
}

impl BluetoothDevice {
    pub fn supports(&self, profile: BtProfile) -> bool {
        self.profiles.contains(&profile)
    }
}

/// The single live link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique per connect call, so a replaced link is distinguishable
    pub session_id: Uuid,
    pub device: BluetoothDevice,
    pub profile: BtProfile,
    pub connected_at: DateTime<Utc>,
    pub streaming: bool,
}

/// Owner of discovery, pairing and the active connection
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    discovered: Vec<BluetoothDevice>,
    /// Paired device ids in pairing order
    paired: Vec<String>,
    connection: Option<Connection>,
}

impl ConnectionManager {
    pub fn new(discovered: Vec<BluetoothDevice>) -> Self {
        Self {
            discovered,
            paired: Vec::new(),
            connection: None,
        }
    }

    /// Current discovery snapshot
    pub fn scan(&self) -> Vec<BluetoothDevice> {
        debug!("Bluetooth scan: {} devices", self.discovered.len());
        self.discovered.clone()
    }

    /// Mark a discovered device as paired
    ///
    /// Pairing an already-paired device is a no-op that still succeeds.
    pub fn pair(&mut self, device_id: &str) -> Result<BluetoothDevice> {
        let device = self
            .discovered_device(device_id)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;

        if !self.is_paired(device_id) {
            self.paired.push(device.id.clone());
            info!("Paired Bluetooth device {} ({})", device.id, device.name);
        }
        Ok(device)
    }

    /// Connect to a paired device with the given profile
    ///
    /// Any existing connection is dropped. Streaming starts only for A2DP.
    pub fn connect(&mut self, device_id: &str, profile: BtProfile) -> Result<Connection> {
        if !self.is_paired(device_id) {
            return Err(Error::NotPaired(device_id.to_string()));
        }
        let device = self
            .discovered_device(device_id)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
        if !device.supports(profile) {
            return Err(Error::UnsupportedProfile {
                device: device.id,
                profile: profile.to_string(),
            });
        }

        if let Some(previous) = self.connection.take() {
            debug!("Dropping connection to {} for {}", previous.device.id, device.id);
        }

        let connection = Connection {
            session_id: Uuid::new_v4(),
            device,
            profile,
            connected_at: Utc::now(),
            streaming: profile == BtProfile::A2dp,
        };
        info!(
            "Connected to {} via {} (streaming: {})",
            connection.device.name, profile, connection.streaming
        );
        self.connection = Some(connection.clone());
        Ok(connection)
    }

    /// Clear the active connection, returning what was connected
    pub fn disconnect(&mut self) -> Option<Connection> {
        let previous = self.connection.take();
        if let Some(ref conn) = previous {
            info!("Disconnected from {}", conn.device.name);
        }
        previous
    }

    /// Toggle streaming on the active link; no-op without one
    pub fn set_streaming(&mut self, streaming: bool) -> Option<Connection> {
        let conn = self.connection.as_mut()?;
        conn.streaming = streaming;
        Some(conn.clone())
    }

    pub fn connection(&self) -> Option<Connection> {
        self.connection.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn is_paired(&self, device_id: &str) -> bool {
        self.paired.iter().any(|id| id == device_id)
    }

    pub fn paired_devices(&self) -> Vec<BluetoothDevice> {
        self.paired
            .iter()
            .filter_map(|id| self.discovered_device(id).cloned())
            .collect()
    }

    /// Resolve a device by exact id or case-insensitive name fragment
    pub fn find_device(&self, query: &str) -> Option<BluetoothDevice> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.discovered
            .iter()
            .find(|d| d.id.to_lowercase() == query)
            .or_else(|| {
                self.discovered
                    .iter()
                    .find(|d| d.name.to_lowercase().contains(&query))
            })
            .cloned()
    }

    fn discovered_device(&self, device_id: &str) -> Option<&BluetoothDevice> {
        self.discovered.iter().find(|d| d.id == device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, name: &str, profiles: &[BtProfile]) -> BluetoothDevice {
        BluetoothDevice {
            id: id.to_string(),
            name: name.to_string(),
            kind: "phone".to_string(),
            profiles: profiles.to_vec(),
            rssi: Some(-55),
        }
    }

    fn manager() -> ConnectionManager {
        ConnectionManager::new(vec![
            device("pixel-8", "Pixel 8", &[BtProfile::A2dp, BtProfile::Hfp, BtProfile::Avrcp]),
            device("ipad", "Family iPad", &[BtProfile::A2dp]),
        ])
    }

    #[test]
    fn test_scan_returns_copy() {
        let mgr = manager();
        let mut snapshot = mgr.scan();
        snapshot.clear();
        assert_eq!(mgr.scan().len(), 2);
    }

    #[test]
    fn test_pair_unknown_device_fails() {
        let mut mgr = manager();
        let err = mgr.pair("walkman").unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(_)));
        assert!(mgr.paired_devices().is_empty());
    }

    #[test]
    fn test_pair_is_idempotent() {
        let mut mgr = manager();
        mgr.pair("ipad").unwrap();
        mgr.pair("ipad").unwrap();
        assert_eq!(mgr.paired_devices().len(), 1);
    }

    #[test]
    fn test_connect_requires_pairing() {
        let mut mgr = manager();
        let err = mgr.connect("pixel-8", BtProfile::A2dp).unwrap_err();
        assert!(matches!(err, Error::NotPaired(_)));
        assert!(!mgr.is_connected());
    }

    #[test]
    fn test_connect_rejects_unsupported_profile() {
        let mut mgr = manager();
        mgr.pair("ipad").unwrap();
        let err = mgr.connect("ipad", BtProfile::Hfp).unwrap_err();
        assert!(matches!(err, Error::UnsupportedProfile { .. }));
        assert!(!mgr.is_connected());
    }

    #[test]
    fn test_streaming_follows_profile() {
        let mut mgr = manager();
        mgr.pair("pixel-8").unwrap();
        assert!(mgr.connect("pixel-8", BtProfile::A2dp).unwrap().streaming);
        assert!(!mgr.connect("pixel-8", BtProfile::Hfp).unwrap().streaming);
    }

    #[test]
    fn test_reconnect_replaces_connection() {
        let mut mgr = manager();
        mgr.pair("pixel-8").unwrap();
        mgr.pair("ipad").unwrap();
        let first = mgr.connect("pixel-8", BtProfile::A2dp).unwrap();
        let second = mgr.connect("ipad", BtProfile::A2dp).unwrap();

        let active = mgr.connection().unwrap();
        assert_eq!(active.device.id, "ipad");
        assert_eq!(active.session_id, second.session_id);
        assert_ne!(first.session_id, second.session_id);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut mgr = manager();
        mgr.pair("pixel-8").unwrap();
        mgr.connect("pixel-8", BtProfile::A2dp).unwrap();

        assert!(mgr.disconnect().is_some());
        assert!(mgr.disconnect().is_none());
        assert!(mgr.connection().is_none());
    }

    #[test]
    fn test_set_streaming_without_connection_is_noop() {
        let mut mgr = manager();
        assert!(mgr.set_streaming(true).is_none());

        mgr.pair("pixel-8").unwrap();
        mgr.connect("pixel-8", BtProfile::Hfp).unwrap();
        assert!(mgr.set_streaming(true).unwrap().streaming);
        assert!(mgr.connection().unwrap().streaming);
    }

    #[test]
    fn test_find_device_by_name_fragment() {
        let mgr = manager();
        assert_eq!(mgr.find_device("iPad").unwrap().id, "ipad");
        assert_eq!(mgr.find_device("PIXEL-8").unwrap().id, "pixel-8");
        assert!(mgr.find_device("").is_none());
        assert!(mgr.find_device("walkman").is_none());
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("hfp".parse::<BtProfile>().unwrap(), BtProfile::Hfp);
        assert_eq!(" A2DP ".parse::<BtProfile>().unwrap(), BtProfile::A2dp);
        assert!("spp".parse::<BtProfile>().is_err());
    }
}
