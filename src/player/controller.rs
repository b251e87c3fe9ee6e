//! Player controller implementation for pinplayer
//!
//! This module provides the [`PlayerController`], the state machine that
//! owns one media resource and keeps the control surface consistent with
//! it. It is synchronous: every input (user command, resource event,
//! presentation change, idle deadline) is a method call carrying the
//! current instant, and the session loop in `media_player` feeds those
//! calls in arrival order.
//!
//! Playback transitions: `Idle → Playing ⇄ Paused → Ended`, with
//! `Ended → Playing` on replay or a backward seek.

use crate::player::overlay::IdleTimer;
use crate::player::presentation::{ContainerId, PresentationChange, PresentationHost, SubscriptionId};
use crate::player::resource::{
    MediaResource, MediaSource, PlayRequestId, ResourceEvent, SeekToken,
};
use crate::player::state::{MediaStatus, PlayerStateData};
use crate::player::surface::ControlSurface;
use crate::player::{PlaybackState, PlayerCallbacks, PlayerCommand, PlayerOptions};
use crate::utils::config::PlayerDefaults;

use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

static NEXT_CONTAINER: AtomicU64 = AtomicU64::new(1);

/// Senders handed to the resource and the presentation host at mount
pub struct EventSinks {
    pub resource: UnboundedSender<ResourceEvent>,
    pub presentation: UnboundedSender<PresentationChange>,
}

/// Receiving ends of [`EventSinks`]
pub struct EventStreams {
    pub resource: UnboundedReceiver<ResourceEvent>,
    pub presentation: UnboundedReceiver<PresentationChange>,
}

impl EventSinks {
    pub fn channel() -> (EventSinks, EventStreams) {
        let (resource_tx, resource_rx) = mpsc::unbounded_channel();
        let (presentation_tx, presentation_rx) = mpsc::unbounded_channel();
        (
            EventSinks { resource: resource_tx, presentation: presentation_tx },
            EventStreams { resource: resource_rx, presentation: presentation_rx },
        )
    }
}

/// Main player controller
pub struct PlayerController {
    options: PlayerOptions,
    container: ContainerId,

    resource: Box<dyn MediaResource>,
    host: Box<dyn PresentationHost>,
    callbacks: PlayerCallbacks,

    state: PlayerStateData,
    idle_timer: IdleTimer,
    presentation_sub: Option<SubscriptionId>,

    next_request: u64,
    /// Start request awaiting resolution
    pending_play: Option<PlayRequestId>,

    next_seek: u64,
    /// Latest seek not yet confirmed by the resource
    pending_seek: Option<SeekToken>,

    mounted: bool,
}

impl PlayerController {
    /// Mount a player: subscribe to the resource and the presentation
    /// host, load the source and, with `autoplay`, request playback.
    pub fn mount(
        options: PlayerOptions,
        mut resource: Box<dyn MediaResource>,
        mut host: Box<dyn PresentationHost>,
        callbacks: PlayerCallbacks,
        defaults: &PlayerDefaults,
        sinks: EventSinks,
        now: Instant,
    ) -> Self {
        let container = ContainerId(format!(
            "player-{}",
            NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed)
        ));
        info!("Mounting {} for {}", container, options.source);

        resource.subscribe(sinks.resource);
        let presentation_sub = Some(host.subscribe(sinks.presentation));

        let state = PlayerStateData::new(
            defaults.volume,
            options.initially_muted,
            options.show_custom_controls,
        );

        resource.load(&MediaSource {
            locator: options.source.clone(),
            looping: options.loop_playback,
            muted: state.audio.muted,
            volume: state.audio.volume,
        });

        let mut controller = Self {
            options,
            container,
            resource,
            host,
            callbacks,
            state,
            idle_timer: IdleTimer::new(defaults.idle_hide_delay()),
            presentation_sub,
            next_request: 0,
            pending_play: None,
            next_seek: 0,
            pending_seek: None,
            mounted: true,
        };

        if controller.options.autoplay {
            controller.request_start();
        }
        controller.refresh_overlay(now);

        controller
    }

    /// Dispatch a user command; returns `false` once the player unmounts
    pub fn handle_command(&mut self, command: PlayerCommand, now: Instant) -> bool {
        match command {
            PlayerCommand::TogglePlay | PlayerCommand::MediaClick => self.toggle_play(now),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::SetVolume(volume) => self.set_volume(volume),
            PlayerCommand::Seek(target) => self.seek(target, now),
            PlayerCommand::ToggleFullscreen => self.toggle_fullscreen(),
            PlayerCommand::PointerActivity => self.pointer_activity(now),
            PlayerCommand::PointerLeave => self.pointer_leave(),
            PlayerCommand::Snapshot(reply) => {
                let _ = reply.send(self.surface());
            }
            PlayerCommand::Unmount => self.unmount(),
        }
        self.mounted
    }

    /// Start if stopped, pause if playing
    pub fn toggle_play(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }

        if self.state.is_playing() {
            self.pause(now);
        } else if let Some(request) = self.pending_play.take() {
            debug!("Withdrawing start request {:?}", request);
            self.resource.pause();
        } else {
            if self.state.playback == PlaybackState::Ended {
                // Replay from the beginning
                self.seek_resource(0.0);
            }
            self.request_start();
        }
    }

    fn pause(&mut self, now: Instant) {
        self.pending_play = None;
        self.resource.pause();
        if self.enter(PlaybackState::Paused, now) {
            Self::notify(&mut self.callbacks.on_pause);
        }
    }

    fn request_start(&mut self) {
        self.next_request += 1;
        let request = PlayRequestId(self.next_request);
        debug!("Requesting playback start {:?}", request);
        self.pending_play = Some(request);
        self.resource.play(request);
    }

    /// Flip mute without touching the stored volume
    pub fn toggle_mute(&mut self) {
        if !self.mounted {
            return;
        }

        if let Some(restored) = self.state.audio.toggle_mute() {
            self.resource.set_volume(restored);
        }
        self.resource.set_muted(self.state.audio.muted);
        debug!("Muted: {}", self.state.audio.muted);
    }

    /// Set the volume level; zero mutes
    pub fn set_volume(&mut self, volume: f64) {
        if !self.mounted {
            return;
        }

        let applied = self.state.audio.set_volume(volume);
        self.resource.set_volume(applied);
        self.resource.set_muted(self.state.audio.muted);
        debug!("Volume set to: {:.2}", applied);
    }

    /// Move the playhead to `target`, clamped into `[0, duration]`
    ///
    /// The position updates immediately; the resource's confirmation only
    /// counts if no newer seek has been issued since.
    pub fn seek(&mut self, target: f64, now: Instant) {
        if !self.mounted {
            return;
        }

        let position = self.state.timeline.seek_target(target);
        self.seek_resource(position);

        if self.state.playback == PlaybackState::Ended && position < self.state.timeline.upper_bound() {
            self.enter(PlaybackState::Paused, now);
            self.request_start();
        }
    }

    fn seek_resource(&mut self, position: f64) {
        self.next_seek += 1;
        let token = SeekToken(self.next_seek);
        self.pending_seek = Some(token);
        self.state.timeline.current_time = position;
        self.resource.seek(position, token);
        debug!("Seeking to {:.2}s ({:?})", position, token);
    }

    /// Ask the host to enter or leave fullscreen
    ///
    /// The flag itself only changes when the host's notification arrives.
    pub fn toggle_fullscreen(&mut self) {
        if !self.mounted {
            return;
        }

        let result = if self.state.fullscreen {
            self.host.exit_fullscreen()
        } else {
            self.host.request_fullscreen(&self.container)
        };

        if let Err(e) = result {
            warn!("Error attempting to toggle fullscreen: {}", e);
        }
    }

    /// Pointer moved over the player
    pub fn pointer_activity(&mut self, now: Instant) {
        if !self.mounted || !self.options.show_custom_controls {
            return;
        }

        self.state.overlay.visible = true;
        if self.state.is_playing() {
            self.idle_timer.restart(now);
        }
    }

    /// Pointer left the player; hides the overlay right away while playing
    pub fn pointer_leave(&mut self) {
        if !self.mounted || !self.options.show_custom_controls {
            return;
        }

        if self.state.is_playing() {
            self.idle_timer.cancel();
            self.state.overlay.visible = false;
        }
    }

    /// The idle deadline may have passed
    pub fn handle_idle_timeout(&mut self, now: Instant) {
        if self.idle_timer.expire(now) && self.state.is_playing() {
            debug!("Hiding controls after {:?} idle", self.idle_timer.delay());
            self.state.overlay.visible = false;
        }
    }

    /// Apply one resource notification
    pub fn handle_resource_event(&mut self, event: ResourceEvent, now: Instant) {
        if !self.mounted {
            debug!("Ignoring {:?} after unmount", event);
            return;
        }

        match event {
            ResourceEvent::MetadataLoaded { duration } => {
                self.state.timeline.set_duration(duration);
                self.state.media = MediaStatus::Ready;
                info!("Metadata loaded, duration {:.2}s", duration);
            }

            ResourceEvent::TimeUpdate { position } => {
                if self.pending_seek.is_none() {
                    self.state.timeline.update_position(position);
                }
            }

            ResourceEvent::Seeked { token, position } => {
                if self.pending_seek == Some(token) {
                    self.pending_seek = None;
                    self.state.timeline.update_position(position);
                } else {
                    debug!("Ignoring stale seek confirmation {:?}", token);
                }
            }

            ResourceEvent::PlayResolved { request } => {
                if self.pending_play == Some(request) {
                    self.pending_play = None;
                    if self.enter(PlaybackState::Playing, now) {
                        Self::notify(&mut self.callbacks.on_play);
                    }
                } else if self.state.is_playing() || self.pending_play.is_some() {
                    debug!("Ignoring superseded start {:?}", request);
                } else {
                    // A withdrawn start went through anyway
                    debug!("Pausing after late start {:?}", request);
                    self.resource.pause();
                }
            }

            ResourceEvent::PlayRejected { request, reason } => {
                if self.pending_play == Some(request) {
                    self.pending_play = None;
                    warn!("Playback start rejected: {}", reason);
                    self.refresh_overlay(now);
                } else {
                    debug!("Withdrawn start {:?} rejected: {}", request, reason);
                }
            }

            ResourceEvent::Playing => {
                self.pending_play = None;
                if self.enter(PlaybackState::Playing, now) {
                    Self::notify(&mut self.callbacks.on_play);
                }
            }

            ResourceEvent::Paused => {
                if self.state.is_playing() && self.enter(PlaybackState::Paused, now) {
                    Self::notify(&mut self.callbacks.on_pause);
                }
            }

            ResourceEvent::Ended => self.handle_ended(now),

            ResourceEvent::Error { message } => {
                error!("Media error on {}: {}", self.container, message);
                self.state.media = MediaStatus::Failed(message);
                self.pending_play = None;
                if self.state.is_playing() {
                    self.enter(PlaybackState::Paused, now);
                }
            }
        }
    }

    fn handle_ended(&mut self, now: Instant) {
        if self.state.playback == PlaybackState::Ended {
            return;
        }

        if self.options.loop_playback {
            // The resource restarts itself; track the rewind
            self.state.timeline.current_time = 0.0;
            self.pending_seek = None;
            info!("End of media, looping");
        } else {
            self.state.timeline.finish();
            self.enter(PlaybackState::Ended, now);
            info!("End of media reached");
        }
        Self::notify(&mut self.callbacks.on_ended);
    }

    /// Apply a presentation-mode notification from the host
    pub fn handle_presentation_change(&mut self, change: PresentationChange) {
        if !self.mounted {
            return;
        }

        let fullscreen = change.fullscreen_element.as_ref() == Some(&self.container);
        if fullscreen != self.state.fullscreen {
            info!("Fullscreen: {}", fullscreen);
            self.state.fullscreen = fullscreen;
        }
    }

    /// Tear down: cancel the timer and detach every subscription
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }

        self.mounted = false;
        self.idle_timer.cancel();
        self.resource.unsubscribe();
        if let Some(id) = self.presentation_sub.take() {
            self.host.unsubscribe(id);
        }
        info!("Unmounted {}", self.container);
    }

    /// Switch playback state; returns whether it changed
    fn enter(&mut self, next: PlaybackState, now: Instant) -> bool {
        let previous = self.state.playback;
        if previous == next {
            return false;
        }

        self.state.playback = next;
        info!("Playback state changed: {:?} -> {:?}", previous, next);
        self.refresh_overlay(now);
        true
    }

    /// Re-evaluate overlay visibility after a transport change
    fn refresh_overlay(&mut self, now: Instant) {
        if !self.options.show_custom_controls {
            self.idle_timer.cancel();
            return;
        }

        self.state.overlay.visible = true;
        if self.state.is_playing() {
            self.idle_timer.restart(now);
        } else {
            self.idle_timer.cancel();
        }
    }

    fn notify(callback: &mut Option<Box<dyn FnMut() + Send>>) {
        if let Some(callback) = callback.as_mut() {
            callback();
        }
    }

    pub fn surface(&self) -> ControlSurface {
        ControlSurface::render(&self.options, &self.state)
    }

    pub fn state(&self) -> &PlayerStateData {
        &self.state
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state.playback
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn is_muted(&self) -> bool {
        self.state.audio.muted
    }

    pub fn volume(&self) -> f64 {
        self.state.audio.volume
    }

    pub fn current_time(&self) -> f64 {
        self.state.timeline.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.state.timeline.duration
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state.fullscreen
    }

    pub fn overlay_visible(&self) -> bool {
        self.options.show_custom_controls && self.state.overlay.visible
    }

    /// When the idle timer wants to fire, if armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.idle_timer.deadline()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.unmount();
    }
}
