//! Hub behaviour through the public API and the async handle

mod helpers;

use helpers::{gains, moving_hub, test_hub};
use ivi_common::events::{FocusMode, IviEvent, PlayerStatus};
use ivi_common::GeoPoint;
use ivi_core::audio::types::EQ_GAIN_MAX_DB;
use ivi_core::audio::{DspPatch, EqBand, Preset, SettingsSource};
use ivi_core::connection::BtProfile;
use ivi_core::{ErrorKind, HubHandle};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<IviEvent>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.name());
    }
    names
}

#[test]
fn test_profile_switch_event_order() {
    let mut hub = test_hub();
    let mut rx = hub.events().subscribe();

    hub.select_profile("Night Shift").unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![
            "ProfileActivated",
            "PresetApplied",
            "OutputChanged",
            "DriverStateChanged"
        ]
    );
    assert_eq!(hub.active_preset(), Preset::Night);
    assert_eq!(hub.output_state().volume, 25);
    assert_eq!(hub.driver().focus_mode, FocusMode::Safety);
}

#[test]
fn test_unknown_profile_changes_nothing() {
    let mut hub = test_hub();
    let mut rx = hub.events().subscribe();
    let before = hub.active_profile().id.clone();

    let err = hub.select_profile("nobody").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(hub.active_profile().id, before);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_volume_is_clamped() {
    let mut hub = test_hub();
    assert_eq!(hub.set_volume(150).volume, 100);
    assert_eq!(hub.set_volume(-5).volume, 0);
    assert_eq!(hub.adjust_volume(7).volume, 7);
    assert_eq!(hub.adjust_volume(-20).volume, 0);
}

#[test]
fn test_every_preset_matches_its_definition() {
    let mut hub = test_hub();
    for preset in Preset::ALL {
        let settings = hub.apply_preset(preset.name()).unwrap();
        assert_eq!(settings, preset.settings());
        assert_eq!(hub.active_preset(), preset);
        assert_eq!(hub.settings_source(), SettingsSource::Preset);
    }
}

#[test]
fn test_custom_eq_is_clamped() {
    let mut hub = test_hub();
    let patch = DspPatch {
        eq: Some(vec![EqBand::new(60.0, 40.0, 0.7)]),
        ..Default::default()
    };
    hub.apply_custom_settings(&patch);
    assert_eq!(gains(&hub)[0], EQ_GAIN_MAX_DB);
    assert_eq!(hub.settings_source(), SettingsSource::Custom);
}

#[test]
fn test_auto_tune_refused_while_moving() {
    let mut hub = moving_hub(30.0);
    let before = hub.dsp_settings();
    let err = hub.run_auto_tune().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(hub.dsp_settings(), before);

    hub.update_speed(0.0);
    let (result, settings) = hub.run_auto_tune().unwrap();
    assert_eq!(settings, hub.dsp_settings());
    assert!((70.0..=88.0).contains(&result.target_loudness));
}

#[test]
fn test_route_follows_vehicle() {
    let mut hub = test_hub();
    hub.update_speed(45.0);
    let first = hub.set_destination_by_name("work").unwrap();
    assert_eq!(first.destination.location, GeoPoint::new(37.7895, -122.3942));
    let sum: f64 = first.steps.iter().map(|s| s.distance_km).sum();
    assert!((sum - first.distance_km).abs() < 1e-9);

    // Halfway there
    let moved = hub
        .update_location(GeoPoint::new(37.7822, -122.4068))
        .unwrap();
    assert!(moved.distance_km < first.distance_km);
    assert_eq!(hub.active_route().unwrap(), moved);
}

#[test]
fn test_no_route_without_destination() {
    let mut hub = test_hub();
    assert!(hub.update_location(GeoPoint::new(37.78, -122.41)).is_none());
    assert!(hub.set_destination_by_name("mars").is_err());
    assert!(hub.active_route().is_none());
}

#[test]
fn test_playing_without_bluetooth_flags_connectivity() {
    let mut hub = test_hub();
    hub.play_query("open road").unwrap();

    let report = hub.run_diagnostics();
    assert!(report.has_issue("BT-101"));

    hub.pair_device("pixel-8").unwrap();
    hub.connect_device("pixel-8", BtProfile::A2dp).unwrap();
    let report = hub.run_diagnostics();
    assert!(!report.has_issue("BT-101"));
    assert_eq!(hub.last_report().unwrap().report_id, report.report_id);
}

#[test]
fn test_reconnect_replaces_session() {
    let mut hub = test_hub();
    hub.pair_device("pixel-8").unwrap();
    hub.pair_device("iphone-15").unwrap();

    let first = hub.connect_device("pixel-8", BtProfile::A2dp).unwrap();
    let second = hub.connect_device("iphone-15", BtProfile::A2dp).unwrap();
    assert_ne!(first.session_id, second.session_id);
    assert_eq!(hub.connection().unwrap().device.id, "iphone-15");

    let previous = hub.disconnect_device().unwrap();
    assert_eq!(previous.device.id, "iphone-15");
    assert!(hub.disconnect_device().is_none());
}

#[test]
fn test_playback_events() {
    let mut hub = test_hub();
    let mut rx = hub.events().subscribe();

    hub.play_playlist("road trip").unwrap();
    assert_eq!(drain(&mut rx), vec!["PlaybackStateChanged", "TrackChanged"]);

    // Pausing twice only reports the first transition
    hub.pause();
    hub.pause();
    assert_eq!(drain(&mut rx), vec!["PlaybackStateChanged"]);
    assert_eq!(hub.playback_state().status, PlayerStatus::Paused);
}

#[test]
fn test_expired_alerts_are_hidden() {
    let hub = test_hub();
    assert!(hub.active_alerts().iter().all(|a| !a.title.contains("Marathon")));
    assert!(!hub.alerts_near_vehicle().is_empty());
}

#[tokio::test]
async fn test_handle_serializes_commands() {
    let handle = HubHandle::new(test_hub());
    handle.with(|hub| hub.set_volume(0)).await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle.with(|hub| hub.adjust_volume(5)).await
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(handle.with(|hub| hub.output_state().volume).await, 50);
}

#[tokio::test]
async fn test_handle_broadcasts_events() {
    let handle = HubHandle::new(test_hub());
    let mut rx = handle.subscribe().await;

    let driver = handle.update_speed(80.0).await;
    assert!(driver.is_moving);

    let event = rx.recv().await.unwrap();
    match event {
        IviEvent::DriverStateChanged {
            speed_kph,
            is_moving,
            ..
        } => {
            assert_eq!(speed_kph, 80.0);
            assert!(is_moving);
        }
        other => panic!("unexpected event {}", other.name()),
    }

    let response = handle.handle_intent("run auto-tune").await;
    assert!(response.actions.is_empty());
}

#[tokio::test]
async fn test_handle_profile_and_diagnostics() {
    let handle = HubHandle::new(test_hub());
    let profile = handle.select_profile("jordan").await.unwrap();
    assert_eq!(profile.preferred_volume, 55);

    let report = handle.run_diagnostics().await;
    let cached = handle.with(|hub| hub.last_report()).await.unwrap();
    assert_eq!(cached.report_id, report.report_id);
}
