//! Controller behavior against mocked collaborators

use mockall::mock;
use mockall::predicate::{always, eq, function};
use pinplayer::player::{
    ContainerId, MediaPlayerBuilder, MediaResource, MediaSource, PlayRequestId,
    PresentationChange, PresentationHost, PresentationSignal, ResourceEvent, SeekToken,
    SimulatedResource, StartPolicy, SubscriptionId,
};
use pinplayer::PlayerError;
use pinplayer_integration_tests::pin_video;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

mock! {
    pub Host {}

    impl PresentationHost for Host {
        fn request_fullscreen(&mut self, container: &ContainerId) -> pinplayer::Result<()>;
        fn exit_fullscreen(&mut self) -> pinplayer::Result<()>;
        fn subscribe(&mut self, sink: UnboundedSender<PresentationChange>) -> SubscriptionId;
        fn unsubscribe(&mut self, id: SubscriptionId);
    }
}

mock! {
    pub Resource {}

    impl MediaResource for Resource {
        fn load(&mut self, source: &MediaSource);
        fn play(&mut self, request: PlayRequestId);
        fn pause(&mut self);
        fn seek(&mut self, position: f64, token: SeekToken);
        fn set_volume(&mut self, volume: f64);
        fn set_muted(&mut self, muted: bool);
        fn subscribe(&mut self, sink: UnboundedSender<ResourceEvent>);
        fn unsubscribe(&mut self);
    }
}

#[test]
fn test_rejected_fullscreen_leaves_state_unchanged() {
    let mut host = MockHost::new();
    host.expect_subscribe().times(1).returning(|_| SubscriptionId(7));
    host.expect_request_fullscreen()
        .times(1)
        .returning(|_| Err(PlayerError::presentation("permission denied")));
    host.expect_exit_fullscreen().never();
    host.expect_unsubscribe().with(eq(SubscriptionId(7))).times(1).return_const(());

    let (resource, _media) = SimulatedResource::new(StartPolicy::Allow);
    let (mut controller, _streams) = MediaPlayerBuilder::new(pin_video())
        .with_resource(resource)
        .with_presentation_host(host)
        .build(Instant::now())
        .unwrap();

    controller.toggle_fullscreen();
    assert!(!controller.is_fullscreen());

    controller.unmount();
}

#[test]
fn test_fullscreen_requests_own_container() {
    let mut host = MockHost::new();
    host.expect_subscribe().returning(|_| SubscriptionId(1));
    host.expect_request_fullscreen()
        .with(function(|id: &ContainerId| id.0.starts_with("player-")))
        .times(1)
        .returning(|_| Ok(()));
    host.expect_unsubscribe().return_const(());

    let (resource, _media) = SimulatedResource::new(StartPolicy::Allow);
    let (mut controller, _streams) = MediaPlayerBuilder::new(pin_video())
        .with_resource(resource)
        .with_presentation_host(host)
        .build(Instant::now())
        .unwrap();

    controller.toggle_fullscreen();

    // Only the host's change notification flips the flag
    assert!(!controller.is_fullscreen());
    controller.handle_presentation_change(PresentationChange {
        fullscreen_element: Some(controller.container().clone()),
    });
    assert!(controller.is_fullscreen());
}

#[test]
fn test_mount_loads_source_and_autoplays_once() {
    let mut resource = MockResource::new();
    resource.expect_subscribe().with(always()).times(1).return_const(());
    resource
        .expect_load()
        .with(function(|source: &MediaSource| {
            source.locator.ends_with("video.mp4") && source.looping && source.muted
        }))
        .times(1)
        .return_const(());
    resource.expect_set_volume().return_const(());
    resource.expect_set_muted().return_const(());
    resource.expect_play().times(1).return_const(());
    resource.expect_pause().never();
    resource.expect_unsubscribe().times(1).return_const(());

    let mut options = pin_video();
    options.autoplay = true;
    options.loop_playback = true;
    options.initially_muted = true;

    let (mut controller, _streams) = MediaPlayerBuilder::new(options)
        .with_resource(resource)
        .with_presentation_host(PresentationSignal::new())
        .build(Instant::now())
        .unwrap();

    // No confirmation yet, so not playing
    assert!(!controller.is_playing());
    controller.unmount();
}

#[test]
fn test_toggle_during_pending_start_withdraws_it() {
    let mut resource = MockResource::new();
    resource.expect_subscribe().return_const(());
    resource.expect_load().return_const(());
    resource.expect_set_volume().return_const(());
    resource.expect_set_muted().return_const(());
    resource.expect_play().with(eq(PlayRequestId(1))).times(1).return_const(());
    resource.expect_pause().times(1).return_const(());
    resource.expect_unsubscribe().return_const(());

    let (mut controller, _streams) = MediaPlayerBuilder::new(pin_video())
        .with_resource(resource)
        .build(Instant::now())
        .unwrap();

    let now = Instant::now();
    controller.toggle_play(now);
    controller.toggle_play(now);
    assert!(!controller.is_playing());
}
