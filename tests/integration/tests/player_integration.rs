//! End-to-end session tests for pinplayer
//!
//! Each test drives a spawned session through its public handle against a
//! simulated resource. Clocks are paused so idle deadlines are exact.

use pinplayer::player::{
    FullscreenIcon, PlayIcon, PresentationSignal, ResourceCall, StartPolicy, VolumeIcon,
};
use pinplayer_integration_tests::{pin_video, TestSession};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_blocked_autoplay_keeps_overlay_up() {
    let mut options = pin_video();
    options.autoplay = true;
    let session = TestSession::spawn(options, StartPolicy::Block).unwrap();
    session.media.load_metadata(42.0);

    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.play_button, PlayIcon::Play);
    assert!(surface.overlay_visible);

    sleep(Duration::from_secs(10)).await;
    assert!(session.player.snapshot().await.unwrap().overlay_visible);
    assert!(session.log.entries().is_empty());

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_pointer_activity_restarts_idle_countdown() {
    let session = TestSession::playing(pin_video(), 600.0).await.unwrap();
    assert!(session.player.snapshot().await.unwrap().overlay_visible);

    sleep(Duration::from_millis(2999)).await;
    session.player.pointer_activity().unwrap();

    // Past the first deadline, still inside the restarted one
    sleep(Duration::from_millis(2)).await;
    assert!(session.player.snapshot().await.unwrap().overlay_visible);

    sleep(Duration::from_millis(3000)).await;
    assert!(!session.player.snapshot().await.unwrap().overlay_visible);

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_pause_brings_overlay_back() {
    let session = TestSession::playing(pin_video(), 600.0).await.unwrap();
    sleep(Duration::from_secs(4)).await;
    assert!(!session.player.snapshot().await.unwrap().overlay_visible);

    session.player.media_click().unwrap();
    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.play_button, PlayIcon::Play);
    assert!(surface.overlay_visible);

    // Stays up while paused
    sleep(Duration::from_secs(10)).await;
    assert!(session.player.snapshot().await.unwrap().overlay_visible);
    assert_eq!(session.log.entries(), vec!["play", "pause"]);

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_natural_end_without_loop() {
    let session = TestSession::playing(pin_video(), 5.0).await.unwrap();

    session.media.advance(2.5);
    session.media.advance(2.5);

    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.play_button, PlayIcon::Play);
    assert_eq!(surface.readout(), "0:05 / 0:05");
    assert!(surface.overlay_visible);
    assert_eq!(session.log.entries(), vec!["play", "ended"]);

    // Play from the end starts over
    session.player.toggle_play().unwrap();
    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.play_button, PlayIcon::Pause);
    assert_eq!(surface.readout(), "0:00 / 0:05");
    assert_eq!(session.log.entries(), vec!["play", "ended", "play"]);

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_natural_end_with_loop() {
    let mut options = pin_video();
    options.loop_playback = true;
    let session = TestSession::playing(options, 5.0).await.unwrap();

    session.media.advance(5.0);
    session.media.advance(1.0);

    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.play_button, PlayIcon::Pause);
    assert_eq!(surface.readout(), "0:01 / 0:05");
    assert_eq!(session.log.entries(), vec!["play", "ended"]);

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_host_exit_from_fullscreen_is_reflected() {
    let session = TestSession::playing(pin_video(), 60.0).await.unwrap();

    session.player.toggle_fullscreen().unwrap();
    assert_eq!(
        session.player.snapshot().await.unwrap().fullscreen_button,
        FullscreenIcon::Exit
    );
    assert!(session.presentation.fullscreen_element().is_some());

    session.presentation.exit_externally();
    assert_eq!(
        session.player.snapshot().await.unwrap().fullscreen_button,
        FullscreenIcon::Enter
    );

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_fullscreen_is_scoped_to_each_player() {
    let signal = PresentationSignal::new();
    let first = TestSession::spawn_with_signal(pin_video(), StartPolicy::Allow, signal.clone()).unwrap();
    let second = TestSession::spawn_with_signal(pin_video(), StartPolicy::Allow, signal.clone()).unwrap();
    assert_eq!(signal.subscriber_count(), 2);

    first.player.toggle_fullscreen().unwrap();
    assert_eq!(first.player.snapshot().await.unwrap().fullscreen_button, FullscreenIcon::Exit);
    assert_eq!(second.player.snapshot().await.unwrap().fullscreen_button, FullscreenIcon::Enter);

    first.player.unmount().await.unwrap();
    second.player.unmount().await.unwrap();
    assert_eq!(signal.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_mute_and_volume_stay_consistent() {
    let mut options = pin_video();
    options.initially_muted = true;
    let session = TestSession::spawn(options, StartPolicy::Allow).unwrap();

    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.mute_button, VolumeIcon::Muted);
    assert_eq!(surface.volume.value, 0.0);

    session.player.toggle_mute().unwrap();
    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.mute_button, VolumeIcon::Audible);
    assert_eq!(surface.volume.value, 1.0);

    session.player.set_volume(0.0).unwrap();
    assert_eq!(session.player.snapshot().await.unwrap().mute_button, VolumeIcon::Muted);
    assert!(session.media.is_muted());

    session.player.set_volume(0.4).unwrap();
    let surface = session.player.snapshot().await.unwrap();
    assert_eq!(surface.mute_button, VolumeIcon::Audible);
    assert_eq!(surface.volume.value, 0.4);
    assert!(!session.media.is_muted());
    assert_eq!(session.media.volume(), 0.4);

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_seek_clamps_to_duration() {
    let session = TestSession::playing(pin_video(), 125.0).await.unwrap();

    session.player.seek(65.0).unwrap();
    assert_eq!(session.player.snapshot().await.unwrap().readout(), "1:05 / 2:05");

    session.player.seek(500.0).unwrap();
    assert_eq!(session.player.snapshot().await.unwrap().readout(), "2:05 / 2:05");

    session.player.seek(-3.0).unwrap();
    assert_eq!(session.player.snapshot().await.unwrap().readout(), "0:00 / 2:05");

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_media_failure_hides_media() {
    let session = TestSession::playing(pin_video(), 30.0).await.unwrap();

    session.media.fail("decode error");
    let surface = session.player.snapshot().await.unwrap();
    assert!(!surface.media_visible);
    assert_eq!(surface.play_button, PlayIcon::Play);
    assert_eq!(surface.poster.as_deref(), Some("https://example.com/pins/1042/poster.jpg"));

    session.player.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unmount_releases_everything() {
    let session = TestSession::playing(pin_video(), 600.0).await.unwrap();
    session.player.toggle_fullscreen().unwrap();
    session.player.snapshot().await.unwrap();

    session.player.unmount().await.unwrap();
    assert!(!session.player.is_running());
    assert!(!session.media.is_subscribed());
    assert_eq!(session.presentation.subscriber_count(), 0);
    assert!(session.player.toggle_play().is_err());

    // Nothing fires after unmount
    let calls_before = session.media.calls().len();
    sleep(Duration::from_secs(10)).await;
    session.media.advance(1.0);
    assert_eq!(session.media.calls().len(), calls_before);
    assert_eq!(session.log.entries(), vec!["play"]);
    assert!(matches!(session.media.calls().last(), Some(ResourceCall::Unsubscribe)));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handles_ends_session() {
    let session = TestSession::spawn(pin_video(), StartPolicy::Allow).unwrap();
    let media = session.media.clone();
    drop(session);

    // Let the session observe the closed command channel
    sleep(Duration::from_millis(1)).await;
    assert!(!media.is_subscribed());
}
