//! Environment overrides and configured session defaults

use pinplayer::player::{MediaPlayerBuilder, SimulatedResource, StartPolicy};
use pinplayer::utils::Config;
use pinplayer_integration_tests::pin_video;
use serial_test::serial;
use std::time::Duration;

const VARS: [&str; 4] = [
    "PINPLAYER_VOLUME",
    "PINPLAYER_IDLE_HIDE_MS",
    "PINPLAYER_ASPECT_RATIO",
    "PINPLAYER_LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_env_overrides_applied() {
    clear_env();
    std::env::set_var("PINPLAYER_VOLUME", "0.25");
    std::env::set_var("PINPLAYER_IDLE_HIDE_MS", "1500");
    std::env::set_var("PINPLAYER_ASPECT_RATIO", "4:3");
    std::env::set_var("PINPLAYER_LOG_LEVEL", "debug");

    let mut config = Config::default();
    config.apply_env_overrides().unwrap();
    clear_env();

    assert_eq!(config.player.volume, 0.25);
    assert_eq!(config.player.idle_hide_delay(), Duration::from_millis(1500));
    assert_eq!(config.player.aspect_ratio, "4:3");
    assert_eq!(config.general.log_level, "debug");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_unparseable_env_override_rejected() {
    clear_env();
    std::env::set_var("PINPLAYER_IDLE_HIDE_MS", "soon");

    let mut config = Config::default();
    let result = config.apply_env_overrides();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_out_of_range_env_override_fails_validation() {
    clear_env();
    std::env::set_var("PINPLAYER_VOLUME", "1.5");
    std::env::set_var("PINPLAYER_ASPECT_RATIO", "wide");

    let mut config = Config::default();
    config.apply_env_overrides().unwrap();
    clear_env();

    assert!(config.validate().is_err());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_configured_idle_delay_drives_overlay() {
    clear_env();
    std::env::set_var("PINPLAYER_IDLE_HIDE_MS", "1000");
    let mut config = Config::default();
    config.apply_env_overrides().unwrap();
    clear_env();

    let (resource, media) = SimulatedResource::new(StartPolicy::Allow);
    let player = MediaPlayerBuilder::new(pin_video())
        .with_defaults(config.player)
        .with_resource(resource)
        .spawn()
        .unwrap();

    media.load_metadata(300.0);
    player.toggle_play().unwrap();
    assert!(player.snapshot().await.unwrap().overlay_visible);

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(player.snapshot().await.unwrap().overlay_visible);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!player.snapshot().await.unwrap().overlay_visible);

    player.unmount().await.unwrap();
}
