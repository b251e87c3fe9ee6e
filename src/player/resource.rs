//! Media resource capability for pinplayer
//!
//! The controller never reads a resource's live fields. It talks to the
//! resource through the narrow imperative [`MediaResource`] interface and
//! learns everything else from the [`ResourceEvent`]s the resource emits
//! on the sink it was subscribed with.
//!
//! [`SimulatedResource`] is an in-memory implementation whose clock is
//! driven by hand through a [`SimulatedResourceHandle`].

use crate::utils::clamp;
use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Identifies one start request so its later resolution can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayRequestId(pub u64);

/// Identifies one seek so its confirmation can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeekToken(pub u64);

/// What the resource is asked to load at mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Source locator (path or URL)
    pub locator: String,

    /// Resource restarts from zero at natural end
    pub looping: bool,

    /// Initial mute state
    pub muted: bool,

    /// Initial volume level
    pub volume: f64,
}

/// Notifications a media resource emits, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceEvent {
    /// Metadata is ready; duration in seconds
    MetadataLoaded { duration: f64 },

    /// Playback position advanced
    TimeUpdate { position: f64 },

    /// A seek finished at the given position
    Seeked { token: SeekToken, position: f64 },

    /// A start request succeeded
    PlayResolved { request: PlayRequestId },

    /// A start request failed (e.g. blocked by autoplay policy)
    PlayRejected { request: PlayRequestId, reason: String },

    /// Playback started without a request from the controller
    Playing,

    /// Playback paused (requested or not)
    Paused,

    /// Natural end of media
    Ended,

    /// Load or decode failure
    Error { message: String },
}

/// Sink the resource delivers its events to
pub type ResourceEventSender = UnboundedSender<ResourceEvent>;

/// Imperative capability over a single media resource
///
/// Every method is fire-and-forget: outcomes arrive later as
/// [`ResourceEvent`]s on the subscribed sink.
pub trait MediaResource: Send {
    /// Load the given source
    fn load(&mut self, source: &MediaSource);

    /// Ask the resource to start; resolves with `PlayResolved` or `PlayRejected`
    fn play(&mut self, request: PlayRequestId);

    /// Pause playback
    fn pause(&mut self);

    /// Move the playhead; confirmed with `Seeked`
    fn seek(&mut self, position: f64, token: SeekToken);

    /// Set the volume level (0.0 to 1.0)
    fn set_volume(&mut self, volume: f64);

    /// Mute or unmute
    fn set_muted(&mut self, muted: bool);

    /// Attach the event sink
    fn subscribe(&mut self, sink: ResourceEventSender);

    /// Detach the event sink; no further events are delivered
    fn unsubscribe(&mut self);
}

/// How a simulated resource answers start requests
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartPolicy {
    /// Start immediately
    #[default]
    Allow,

    /// Reject every start, like a browser blocking autoplay
    Block,

    /// Hold requests until resolved or rejected from the handle
    Deferred,
}

/// Imperative call recorded by the simulated resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceCall {
    Load(MediaSource),
    Play(PlayRequestId),
    Pause,
    Seek(f64, SeekToken),
    SetVolume(f64),
    SetMuted(bool),
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Default)]
struct SimulatedInner {
    sink: Option<ResourceEventSender>,
    source: Option<MediaSource>,
    policy: StartPolicy,
    playing: bool,
    position: f64,
    duration: Option<f64>,
    volume: f64,
    muted: bool,
    deferred: Vec<PlayRequestId>,
    calls: Vec<ResourceCall>,
}

impl SimulatedInner {
    fn emit(&self, event: ResourceEvent) {
        trace!("Simulated resource emits {:?}", event);
        if let Some(sink) = &self.sink {
            // A closed receiver means the session is gone; nothing to do
            let _ = sink.send(event);
        }
    }

    fn looping(&self) -> bool {
        self.source.as_ref().map(|s| s.looping).unwrap_or(false)
    }
}

/// In-memory media resource
pub struct SimulatedResource {
    inner: Arc<Mutex<SimulatedInner>>,
}

/// Test and demo handle driving a [`SimulatedResource`] from outside
#[derive(Clone)]
pub struct SimulatedResourceHandle {
    inner: Arc<Mutex<SimulatedInner>>,
}

impl SimulatedResource {
    /// Create a resource and the handle that drives it
    pub fn new(policy: StartPolicy) -> (Self, SimulatedResourceHandle) {
        let inner = Arc::new(Mutex::new(SimulatedInner {
            policy,
            volume: 1.0,
            ..Default::default()
        }));

        (
            Self { inner: Arc::clone(&inner) },
            SimulatedResourceHandle { inner },
        )
    }
}

impl MediaResource for SimulatedResource {
    fn load(&mut self, source: &MediaSource) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::Load(source.clone()));
        inner.volume = source.volume;
        inner.muted = source.muted;
        inner.position = 0.0;
        inner.source = Some(source.clone());
        debug!("Simulated resource loaded {}", source.locator);
    }

    fn play(&mut self, request: PlayRequestId) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::Play(request));

        match inner.policy {
            StartPolicy::Allow => {
                if let Some(duration) = inner.duration {
                    if inner.position >= duration {
                        inner.position = 0.0;
                    }
                }
                inner.playing = true;
                inner.emit(ResourceEvent::PlayResolved { request });
            }
            StartPolicy::Block => {
                inner.emit(ResourceEvent::PlayRejected {
                    request,
                    reason: "NotAllowedError: play() blocked by autoplay policy".to_string(),
                });
            }
            StartPolicy::Deferred => inner.deferred.push(request),
        }
    }

    fn pause(&mut self) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::Pause);

        // Pausing aborts any start still in flight
        for request in std::mem::take(&mut inner.deferred) {
            inner.emit(ResourceEvent::PlayRejected {
                request,
                reason: "AbortError: play() interrupted by pause()".to_string(),
            });
        }

        if inner.playing {
            inner.playing = false;
            inner.emit(ResourceEvent::Paused);
        }
    }

    fn seek(&mut self, position: f64, token: SeekToken) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::Seek(position, token));
        let upper = inner.duration.unwrap_or(0.0);
        inner.position = clamp(position, 0.0, upper);
        let position = inner.position;
        inner.emit(ResourceEvent::Seeked { token, position });
    }

    fn set_volume(&mut self, volume: f64) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::SetVolume(volume));
        inner.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::SetMuted(muted));
        inner.muted = muted;
    }

    fn subscribe(&mut self, sink: ResourceEventSender) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::Subscribe);
        inner.sink = Some(sink);
    }

    fn unsubscribe(&mut self) {
        let mut inner = self.inner.lock();
        inner.calls.push(ResourceCall::Unsubscribe);
        inner.sink = None;
    }
}

impl SimulatedResourceHandle {
    /// Finish loading metadata with the given duration in seconds
    pub fn load_metadata(&self, duration: f64) {
        let mut inner = self.inner.lock();
        inner.duration = Some(duration);
        inner.emit(ResourceEvent::MetadataLoaded { duration });
    }

    /// Advance the playhead by `seconds` if playing
    ///
    /// Emits a position update, and at the natural end either `Ended`
    /// followed by a restart (looping) or `Ended` and a stop.
    pub fn advance(&self, seconds: f64) {
        let mut inner = self.inner.lock();
        if !inner.playing {
            return;
        }

        let duration = inner.duration.unwrap_or(f64::INFINITY);
        inner.position = (inner.position + seconds).min(duration);
        let position = inner.position;
        inner.emit(ResourceEvent::TimeUpdate { position });

        if position >= duration {
            inner.emit(ResourceEvent::Ended);
            if inner.looping() {
                inner.position = 0.0;
                inner.emit(ResourceEvent::TimeUpdate { position: 0.0 });
            } else {
                inner.playing = false;
            }
        }
    }

    /// Report a load/decode failure
    pub fn fail(&self, message: &str) {
        let mut inner = self.inner.lock();
        inner.playing = false;
        inner.emit(ResourceEvent::Error { message: message.to_string() });
    }

    /// Pause from outside the controller (e.g. OS media keys)
    pub fn pause_externally(&self) {
        let mut inner = self.inner.lock();
        if inner.playing {
            inner.playing = false;
            inner.emit(ResourceEvent::Paused);
        }
    }

    /// Start from outside the controller
    pub fn resume_externally(&self) {
        let mut inner = self.inner.lock();
        if !inner.playing {
            inner.playing = true;
            inner.emit(ResourceEvent::Playing);
        }
    }

    /// Resolve the oldest deferred start request
    pub fn resolve_pending(&self) -> Option<PlayRequestId> {
        let mut inner = self.inner.lock();
        if inner.deferred.is_empty() {
            return None;
        }
        let request = inner.deferred.remove(0);
        inner.playing = true;
        inner.emit(ResourceEvent::PlayResolved { request });
        Some(request)
    }

    /// Reject the oldest deferred start request
    pub fn reject_pending(&self, reason: &str) -> Option<PlayRequestId> {
        let mut inner = self.inner.lock();
        if inner.deferred.is_empty() {
            return None;
        }
        let request = inner.deferred.remove(0);
        inner.emit(ResourceEvent::PlayRejected { request, reason: reason.to_string() });
        Some(request)
    }

    /// Emit an arbitrary event
    pub fn emit(&self, event: ResourceEvent) {
        self.inner.lock().emit(event);
    }

    pub fn set_policy(&self, policy: StartPolicy) {
        self.inner.lock().policy = policy;
    }

    /// Every imperative call received so far
    pub fn calls(&self) -> Vec<ResourceCall> {
        self.inner.lock().calls.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    pub fn position(&self) -> f64 {
        self.inner.lock().position
    }

    pub fn volume(&self) -> f64 {
        self.inner.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().muted
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.lock().sink.is_some()
    }
}
