//! Composite runtime state
//!
//! **Purpose:** Single owner of every component plus the driver and vehicle
//! state. All mutations go through here, so each one can be logged and
//! announced on the event bus.
//!
//! **Components:**
//! - `Hub` - synchronous owner; one command runs to completion at a time
//! - `HubHandle` - cloneable async handle holding the hub behind one mutex

use crate::alerts::{Alert, AlertFeed};
use crate::assistant::{AssistantResponse, AssistantRouter};
use crate::audio::{AudioProfileEngine, DspPatch, DspSettings, OutputState, Preset, SettingsSource};
use crate::catalog::Catalogs;
use crate::connection::{BluetoothDevice, BtProfile, Connection, ConnectionManager};
use crate::diagnostics::{
    DiagnosticReport, DiagnosticSnapshot, DiagnosticsEngine, TroubleshootingPlan,
};
use crate::error::{Error, Result};
use crate::playback::{Library, PlaybackQueue, PlaybackState};
use crate::profiles::{DriverProfile, ProfileStore};
use crate::route::{RoutePlan, RouteService};
use crate::state::{DriverState, VehicleState};
use crate::tuner::{self, AutoTuneResult, CalibrationSnapshot};
use chrono::{DateTime, Utc};
use ivi_common::config::TomlConfig;
use ivi_common::events::{EventBus, IviEvent, PlayerStatus};
use ivi_common::GeoPoint;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Thresholds the hub applies on every update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HubSettings {
    pub moving_threshold_kph: f64,
    pub alert_radius_km: f64,
}

impl HubSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            moving_threshold_kph: config.safety.moving_threshold_kph,
            alert_radius_km: config.safety.alert_radius_km,
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

pub struct Hub {
    settings: HubSettings,
    driver: DriverState,
    vehicle: VehicleState,
    connections: ConnectionManager,
    audio: AudioProfileEngine,
    routes: RouteService,
    playback: PlaybackQueue,
    alerts: AlertFeed,
    diagnostics: DiagnosticsEngine,
    profiles: ProfileStore,
    calibration: CalibrationSnapshot,
    router: AssistantRouter,
    events: EventBus,
}

impl Hub {
    /// Build every component from the catalogs and apply the first profile
    ///
    /// Fails only when the profile catalog is empty.
    pub fn new(catalogs: Catalogs, config: &TomlConfig) -> Result<Self> {
        let Catalogs {
            library,
            alerts,
            knowledge_base,
            devices,
            profiles,
            calibration,
        } = catalogs;

        let profiles = ProfileStore::new(profiles)?;
        let start = config.vehicle.start_location();
        let library = Arc::new(library);

        let mut hub = Self {
            settings: HubSettings::from_config(config),
            driver: DriverState::new(config.vehicle.driver_name.clone()),
            vehicle: VehicleState::new(start, config.vehicle.heading_deg, config.vehicle.outside_temp_c),
            connections: ConnectionManager::new(devices),
            audio: AudioProfileEngine::default(),
            routes: RouteService::new(start, 0.0),
            playback: PlaybackQueue::new(library),
            alerts: AlertFeed::new(alerts),
            diagnostics: DiagnosticsEngine::new(knowledge_base),
            profiles,
            calibration,
            router: AssistantRouter::new(),
            events: EventBus::default(),
        };
        let initial = hub.profiles.active().clone();
        hub.apply_profile(&initial);

        info!(
            "Hub ready: driver {}, profile {}, {} tracks, {} alerts",
            hub.driver.name,
            initial.id,
            hub.playback.library().tracks.len(),
            hub.alerts.len()
        );
        Ok(hub)
    }

    // ------------------------------------------------------------------
    // Assistant
    // ------------------------------------------------------------------

    /// Route a free-form request through the assistant
    pub fn handle_intent(&mut self, text: &str) -> AssistantResponse {
        let router = self.router;
        let response = router.handle(self, text);
        debug!("Intent {:?} -> {} actions", response.intent, response.actions.len());
        response
    }

    // ------------------------------------------------------------------
    // Driver and vehicle
    // ------------------------------------------------------------------

    /// New speed reading; recomputes the moving flag and any active route
    pub fn update_speed(&mut self, speed_kph: f64) -> DriverState {
        let was_moving = self.driver.is_moving;
        self.driver.set_speed(speed_kph, self.settings.moving_threshold_kph);
        self.vehicle.speed_kph = self.driver.speed_kph;

        if was_moving != self.driver.is_moving {
            info!(
                "Driver {} ({:.0} km/h)",
                if self.driver.is_moving { "moving" } else { "stopped" },
                self.driver.speed_kph
            );
        }
        self.publish_driver();

        let location = self.vehicle.location;
        if let Some(plan) = self.routes.update_location(location, self.driver.speed_kph) {
            self.publish_route(&plan);
        }
        self.driver.clone()
    }

    /// New position; returns the recomputed route when one is active
    pub fn update_location(&mut self, location: GeoPoint) -> Option<RoutePlan> {
        self.vehicle.location = location;
        debug!("Vehicle location {}", location);
        let plan = self.routes.update_location(location, self.vehicle.speed_kph)?;
        self.publish_route(&plan);
        Some(plan)
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// Activate a profile and apply its preset, volume and focus mode
    pub fn select_profile(&mut self, id_or_name: &str) -> Result<DriverProfile> {
        let profile = self.profiles.select(id_or_name)?;
        self.apply_profile(&profile);
        Ok(profile)
    }

    fn apply_profile(&mut self, profile: &DriverProfile) {
        self.audio.apply_preset(profile.preferred_preset);
        let output = self.audio.set_volume(i32::from(profile.preferred_volume));
        self.driver.focus_mode = profile.focus_mode;

        self.events.emit_lossy(IviEvent::ProfileActivated {
            profile_id: profile.id.clone(),
            timestamp: Utc::now(),
        });
        self.publish_preset(profile.preferred_preset);
        self.publish_output(output);
        self.publish_driver();
    }

    // ------------------------------------------------------------------
    // Bluetooth
    // ------------------------------------------------------------------

    pub fn scan_devices(&self) -> Vec<BluetoothDevice> {
        self.connections.scan()
    }

    pub fn pair_device(&mut self, device_id: &str) -> Result<BluetoothDevice> {
        self.connections.pair(device_id)
    }

    pub fn connect_device(&mut self, device_id: &str, profile: BtProfile) -> Result<Connection> {
        let connection = self.connections.connect(device_id, profile)?;
        self.publish_connection();
        Ok(connection)
    }

    pub fn disconnect_device(&mut self) -> Option<Connection> {
        let previous = self.connections.disconnect();
        self.publish_connection();
        previous
    }

    pub fn set_streaming(&mut self, streaming: bool) -> Option<Connection> {
        let connection = self.connections.set_streaming(streaming)?;
        self.publish_connection();
        Some(connection)
    }

    pub fn find_device(&self, query: &str) -> Option<BluetoothDevice> {
        self.connections.find_device(query)
    }

    pub fn paired_devices(&self) -> Vec<BluetoothDevice> {
        self.connections.paired_devices()
    }

    // ------------------------------------------------------------------
    // Audio
    // ------------------------------------------------------------------

    pub fn apply_preset(&mut self, name: &str) -> Result<DspSettings> {
        let settings = self.audio.apply_preset_by_name(name)?;
        self.publish_preset(self.audio.active_preset());
        Ok(settings)
    }

    pub fn apply_custom_settings(&mut self, patch: &DspPatch) -> DspSettings {
        let settings = self.audio.apply_custom_settings(patch);
        if !patch.is_empty() {
            self.events.emit_lossy(IviEvent::DspAdjusted {
                source: "custom".to_string(),
                timestamp: Utc::now(),
            });
        }
        settings
    }

    /// Analyse the stored calibration and merge the result
    ///
    /// Refused while moving; settings are left untouched in that case.
    pub fn run_auto_tune(&mut self) -> Result<(AutoTuneResult, DspSettings)> {
        if self.driver.is_moving {
            warn!("Auto-tune refused at {:.0} km/h", self.driver.speed_kph);
            return Err(Error::NotParked("Auto-tune".to_string()));
        }
        let result = tuner::analyze(&self.calibration);
        let settings = self.audio.apply_auto_tune(&result);
        self.events.emit_lossy(IviEvent::DspAdjusted {
            source: "auto_tune".to_string(),
            timestamp: Utc::now(),
        });
        Ok((result, settings))
    }

    pub fn set_volume(&mut self, volume: i32) -> OutputState {
        let output = self.audio.set_volume(volume);
        self.publish_output(output);
        output
    }

    pub fn adjust_volume(&mut self, delta: i32) -> OutputState {
        let output = self.audio.adjust_volume(delta);
        self.publish_output(output);
        output
    }

    pub fn set_balance(&mut self, balance: f64) -> OutputState {
        let output = self.audio.set_balance(balance);
        self.publish_output(output);
        output
    }

    pub fn set_fader(&mut self, fader: f64) -> OutputState {
        let output = self.audio.set_fader(fader);
        self.publish_output(output);
        output
    }

    pub fn toggle_mute(&mut self) -> OutputState {
        let output = self.audio.toggle_mute();
        self.publish_output(output);
        output
    }

    pub fn set_muted(&mut self, muted: bool) -> OutputState {
        let output = self.audio.set_muted(muted);
        self.publish_output(output);
        output
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn set_destination(&mut self, name: &str, location: GeoPoint) -> Result<RoutePlan> {
        let plan = self.routes.set_destination(name, location)?;
        self.publish_route(&plan);
        Ok(plan)
    }

    pub fn set_destination_by_name(&mut self, name: &str) -> Result<RoutePlan> {
        let plan = self.routes.set_destination_by_name(name)?;
        self.publish_route(&plan);
        Ok(plan)
    }

    pub fn active_route(&self) -> Option<RoutePlan> {
        self.routes.active_route()
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Play a playlist or track matching `query`; playlists win
    pub fn play_query(&mut self, query: &str) -> Result<PlaybackState> {
        let query = query.trim();
        let library = self.playback.library();
        if let Some(playlist) = library.find_playlist(query).cloned() {
            return self.play_playlist(&playlist.id);
        }
        let track = library
            .find_track(query)
            .cloned()
            .ok_or_else(|| Error::TrackNotFound(query.to_string()))?;
        let before = self.playback.status();
        let state = self.playback.play_track(track);
        self.publish_playback(before, &state);
        Ok(state)
    }

    pub fn play_playlist(&mut self, query: &str) -> Result<PlaybackState> {
        let playlist = self
            .playback
            .library()
            .find_playlist(query)
            .cloned()
            .ok_or_else(|| Error::PlaylistNotFound(query.trim().to_string()))?;
        let before = self.playback.status();
        let state = self.playback.play_playlist(&playlist)?;
        self.publish_playback(before, &state);
        Ok(state)
    }

    pub fn pause(&mut self) -> PlaybackState {
        let before = self.playback.status();
        let state = self.playback.pause();
        self.publish_status(before, state.status);
        state
    }

    pub fn resume(&mut self) -> Result<PlaybackState> {
        let before = self.playback.status();
        let state = self.playback.resume()?;
        self.publish_status(before, state.status);
        Ok(state)
    }

    pub fn next_track(&mut self) -> Result<PlaybackState> {
        let before = self.playback.status();
        let state = self.playback.next()?;
        self.publish_playback(before, &state);
        Ok(state)
    }

    pub fn previous_track(&mut self) -> Result<PlaybackState> {
        let before = self.playback.status();
        let state = self.playback.previous()?;
        self.publish_playback(before, &state);
        Ok(state)
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    pub fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.active_alerts(Utc::now())
    }

    /// Active alerts near the vehicle using the configured radius
    pub fn alerts_near_vehicle(&self) -> Vec<Alert> {
        self.alerts_near_vehicle_at(Utc::now())
    }

    pub fn alerts_near_vehicle_at(&self, at: DateTime<Utc>) -> Vec<Alert> {
        self.alerts
            .alerts_near(self.vehicle.location, self.settings.alert_radius_km, at)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Capture what the diagnostic rules need
    pub fn diagnostics_snapshot(&self) -> DiagnosticSnapshot {
        let connection = self.connections.connection();
        let output = self.audio.output_state();
        let status = self.playback.status();
        DiagnosticSnapshot {
            bluetooth_connected: connection.is_some(),
            connected_device: connection.map(|c| c.device.name),
            player_status: status,
            is_playing: status == PlayerStatus::Playing,
            volume: output.volume,
            muted: output.muted,
            speed_kph: self.driver.speed_kph,
            is_moving: self.driver.is_moving,
            focus_mode: self.driver.focus_mode,
            active_preset: self.audio.active_preset(),
            active_alert_count: self.alerts_near_vehicle().len(),
        }
    }

    pub fn run_diagnostics(&mut self) -> DiagnosticReport {
        let snapshot = self.diagnostics_snapshot();
        let report = self.diagnostics.run_auto_scan(&snapshot);
        self.events.emit_lossy(IviEvent::DiagnosticsCompleted {
            health: report.health,
            issue_count: report.issues.len(),
            timestamp: Utc::now(),
        });
        report
    }

    pub fn troubleshoot(&mut self, symptom: &str) -> TroubleshootingPlan {
        let snapshot = self.diagnostics_snapshot();
        self.diagnostics.troubleshoot(symptom, &snapshot)
    }

    pub fn last_report(&self) -> Option<DiagnosticReport> {
        self.diagnostics.last_report()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn driver(&self) -> &DriverState {
        &self.driver
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn settings(&self) -> HubSettings {
        self.settings
    }

    pub fn connection(&self) -> Option<Connection> {
        self.connections.connection()
    }

    pub fn dsp_settings(&self) -> DspSettings {
        self.audio.settings()
    }

    pub fn output_state(&self) -> OutputState {
        self.audio.output_state()
    }

    pub fn active_preset(&self) -> Preset {
        self.audio.active_preset()
    }

    pub fn settings_source(&self) -> SettingsSource {
        self.audio.source()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn library(&self) -> &Library {
        self.playback.library()
    }

    pub fn active_profile(&self) -> &DriverProfile {
        self.profiles.active()
    }

    pub fn profiles(&self) -> &[DriverProfile] {
        self.profiles.list()
    }

    pub fn calibration(&self) -> &CalibrationSnapshot {
        &self.calibration
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ------------------------------------------------------------------
    // Event publishing
    // ------------------------------------------------------------------

    fn publish_driver(&self) {
        self.events.emit_lossy(IviEvent::DriverStateChanged {
            speed_kph: self.driver.speed_kph,
            is_moving: self.driver.is_moving,
            focus_mode: self.driver.focus_mode,
            timestamp: Utc::now(),
        });
    }

    fn publish_preset(&self, preset: Preset) {
        self.events.emit_lossy(IviEvent::PresetApplied {
            preset: preset.name().to_string(),
            timestamp: Utc::now(),
        });
    }

    fn publish_output(&self, output: OutputState) {
        self.events.emit_lossy(IviEvent::OutputChanged {
            volume: output.volume,
            balance: output.balance,
            fader: output.fader,
            muted: output.muted,
            timestamp: Utc::now(),
        });
    }

    fn publish_connection(&self) {
        let connection = self.connections.connection();
        self.events.emit_lossy(IviEvent::ConnectionChanged {
            device_id: connection.as_ref().map(|c| c.device.id.clone()),
            profile: connection.as_ref().map(|c| c.profile.to_string()),
            streaming: connection.as_ref().is_some_and(|c| c.streaming),
            timestamp: Utc::now(),
        });
    }

    fn publish_route(&self, plan: &RoutePlan) {
        self.events.emit_lossy(IviEvent::RouteUpdated {
            destination: plan.destination.name.clone(),
            distance_km: plan.distance_km,
            eta_minutes: plan.eta_minutes,
            timestamp: Utc::now(),
        });
    }

    fn publish_status(&self, before: PlayerStatus, after: PlayerStatus) {
        if before != after {
            self.events.emit_lossy(IviEvent::PlaybackStateChanged {
                old_state: before,
                new_state: after,
                timestamp: Utc::now(),
            });
        }
    }

    fn publish_playback(&self, before: PlayerStatus, state: &PlaybackState) {
        self.publish_status(before, state.status);
        self.events.emit_lossy(IviEvent::TrackChanged {
            track_id: state.track.as_ref().map(|t| t.id.clone()),
            queue_name: state.queue_name.clone(),
            timestamp: Utc::now(),
        });
    }
}

/// Cloneable async handle to the hub
///
/// Every method takes the lock once and runs one command to completion.
#[derive(Clone)]
pub struct HubHandle {
    inner: Arc<Mutex<Hub>>,
}

impl HubHandle {
    pub fn new(hub: Hub) -> Self {
        Self {
            inner: Arc::new(Mutex::new(hub)),
        }
    }

    pub async fn handle_intent(&self, text: &str) -> AssistantResponse {
        self.inner.lock().await.handle_intent(text)
    }

    pub async fn update_speed(&self, speed_kph: f64) -> DriverState {
        self.inner.lock().await.update_speed(speed_kph)
    }

    pub async fn update_location(&self, location: GeoPoint) -> Option<RoutePlan> {
        self.inner.lock().await.update_location(location)
    }

    pub async fn select_profile(&self, id_or_name: &str) -> Result<DriverProfile> {
        self.inner.lock().await.select_profile(id_or_name)
    }

    pub async fn run_diagnostics(&self) -> DiagnosticReport {
        self.inner.lock().await.run_diagnostics()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<IviEvent> {
        self.inner.lock().await.events().subscribe()
    }

    /// Run an arbitrary command against the hub under the lock
    pub async fn with<R>(&self, f: impl FnOnce(&mut Hub) -> R) -> R {
        let mut hub = self.inner.lock().await;
        f(&mut hub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> Hub {
        Hub::new(Catalogs::builtin().unwrap(), &TomlConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_profile_applied() {
        let hub = hub();
        let profile = hub.active_profile().clone();
        assert_eq!(hub.active_preset(), profile.preferred_preset);
        assert_eq!(hub.output_state().volume, profile.preferred_volume);
        assert_eq!(hub.driver().focus_mode, profile.focus_mode);
    }

    #[test]
    fn test_empty_profile_catalog_fails() {
        let mut catalogs = Catalogs::builtin().unwrap();
        catalogs.profiles.clear();
        let result = Hub::new(catalogs, &TomlConfig::default());
        assert!(matches!(result, Err(Error::EmptyProfileCatalog)));
    }

    #[test]
    fn test_speed_update_recomputes_route() {
        let mut hub = hub();
        let parked = hub.set_destination_by_name("airport").unwrap();
        hub.update_speed(100.0);
        let moving = hub.active_route().unwrap();
        assert!(hub.driver().is_moving);
        assert!(moving.eta_minutes < parked.eta_minutes);
    }

    #[test]
    fn test_auto_tune_refused_while_moving() {
        let mut hub = hub();
        hub.update_speed(60.0);
        let before = hub.dsp_settings();
        assert!(matches!(hub.run_auto_tune(), Err(Error::NotParked(_))));
        assert_eq!(hub.dsp_settings(), before);

        hub.update_speed(0.0);
        hub.run_auto_tune().unwrap();
        assert_eq!(hub.settings_source(), SettingsSource::AutoTuned);
    }

    #[test]
    fn test_events_published_on_mutation() {
        let mut hub = hub();
        let mut rx = hub.events().subscribe();
        hub.set_volume(70);
        hub.apply_preset("hall").unwrap();

        assert_eq!(rx.try_recv().unwrap().name(), "OutputChanged");
        assert_eq!(rx.try_recv().unwrap().name(), "PresetApplied");
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut hub = hub();
        hub.play_query("open road").unwrap();
        hub.set_volume(90);
        hub.update_speed(80.0);
        let snapshot = hub.diagnostics_snapshot();
        assert!(snapshot.is_playing);
        assert!(!snapshot.bluetooth_connected);
        assert!(snapshot.is_moving);
        assert_eq!(snapshot.volume, 90);

        let report = hub.run_diagnostics();
        assert!(report.has_issue("BT-101"));
        assert!(report.has_issue("SAF-301"));
    }
}
