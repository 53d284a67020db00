//! Shell commands executed against a live handle

mod helpers;

use helpers::test_hub;
use ivi_core::shell::{self, ShellCommand, HELP};
use ivi_core::{ErrorKind, HubHandle, Result};

async fn run(handle: &HubHandle, line: &str) -> Result<Vec<String>> {
    let command = ShellCommand::parse(line)?;
    shell::execute(handle, command).await
}

#[tokio::test]
async fn test_bluetooth_session() {
    let handle = HubHandle::new(test_hub());

    let err = run(&handle, "connect pixel-8").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    assert_eq!(
        run(&handle, "pair pixel-8").await.unwrap(),
        vec!["paired Alex's Pixel 8 (pixel-8)"]
    );
    let lines = run(&handle, "connect pixel-8").await.unwrap();
    assert_eq!(lines, vec!["bluetooth: Alex's Pixel 8 (pixel-8) via A2DP, streaming"]);

    let lines = run(&handle, "disconnect").await.unwrap();
    assert_eq!(lines, vec!["bluetooth: not connected"]);
}

#[tokio::test]
async fn test_output_and_eq() {
    let handle = HubHandle::new(test_hub());

    let lines = run(&handle, "volume 150").await.unwrap();
    assert_eq!(lines, vec!["volume 100, balance +0.00, fader +0.00"]);

    let lines = run(&handle, "eq 60 20").await.unwrap();
    assert!(lines[0].contains("+12.0 dB"), "got {}", lines[0]);
}

#[tokio::test]
async fn test_autotune_needs_parking() {
    let handle = HubHandle::new(test_hub());
    run(&handle, "speed 60").await.unwrap();

    let err = run(&handle, "autotune").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    run(&handle, "speed 0").await.unwrap();
    assert_eq!(run(&handle, "autotune").await.unwrap().len(), 6 + 3);
}

#[tokio::test]
async fn test_playback_and_assistant_lines() {
    let handle = HubHandle::new(test_hub());

    let lines = run(&handle, "play road trip").await.unwrap();
    assert!(lines[0].starts_with("playing: "));
    assert_eq!(lines[1], "Road Trip (1 of 5)");

    let lines = run(&handle, "navigate to work").await.unwrap();
    assert!(lines[0].starts_with("assistant: Route to Work"));
    assert!(lines[1].starts_with("  -> route: Work"));
}

#[tokio::test]
async fn test_profile_listing_and_help() {
    let handle = HubHandle::new(test_hub());

    let lines = run(&handle, "profile").await.unwrap();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("* alex"));

    run(&handle, "profile night-shift").await.unwrap();
    let lines = run(&handle, "profile").await.unwrap();
    assert!(lines[2].starts_with("* night-shift"));

    assert_eq!(run(&handle, "help").await.unwrap().len(), HELP.len());
    assert!(run(&handle, "").await.unwrap().is_empty());
}
