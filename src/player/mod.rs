//! Player module for pinplayer
//!
//! This module holds the media playback controller and its collaborators:
//! the media resource capability, the presentation-mode signal, the idle
//! timer that auto-hides the control overlay, and the session loop that
//! serializes every input into the controller.

mod controller;
mod media_player;
mod overlay;
mod presentation;
mod resource;
mod state;
mod surface;

pub use controller::PlayerController;
pub use media_player::{MediaPlayer, MediaPlayerBuilder};
pub use overlay::IdleTimer;
pub use presentation::{
    ContainerId, PresentationChange, PresentationHost, PresentationPolicy, PresentationSignal,
    SubscriptionId,
};
pub use resource::{
    MediaResource, MediaSource, PlayRequestId, ResourceCall, ResourceEvent, SeekToken,
    SimulatedResource, SimulatedResourceHandle, StartPolicy,
};
pub use state::{AudioState, MediaStatus, OverlayState, PlayerStateData, TimelineState};
pub use surface::{ControlSurface, FullscreenIcon, PlayIcon, RangeControl, VolumeIcon};

use crate::utils::error::PlayerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default idle time before the overlay hides while playing
pub const DEFAULT_IDLE_HIDE: Duration = Duration::from_millis(3000);

/// Volume restored when unmuting with no audible level on record
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Mounted, never started
    Idle,

    /// Resource confirmed it is playing
    Playing,

    /// Playback paused
    Paused,

    /// Natural end reached without looping
    Ended,
}

impl PlaybackState {
    /// Whether the transport is running
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

/// Width:height ratio of the player frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub const WIDESCREEN: AspectRatio = AspectRatio { width: 16.0, height: 9.0 };

    /// Ratio as a single number (16:9 → 1.777…)
    pub fn value(&self) -> f64 {
        self.width / self.height
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = PlayerError;

    /// Parses `width:height`, e.g. `16:9` or `2.39:1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlayerError::InvalidInput(format!("Invalid aspect ratio '{}'", s));

        let (w, h) = s.split_once(':').ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;

        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

/// Options a player is mounted with
///
/// These are read-only inputs; the controller never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerOptions {
    /// Source locator of the media
    pub source: String,

    /// Thumbnail shown before playback
    pub poster_image: Option<String>,

    /// Title attached to the media element
    pub display_title: Option<String>,

    /// Frame aspect ratio
    pub aspect_ratio: AspectRatio,

    /// Request playback as soon as the player mounts
    pub autoplay: bool,

    /// Restart from the beginning at natural end
    pub loop_playback: bool,

    /// Start muted
    pub initially_muted: bool,

    /// Use the custom overlay; `false` defers to the host's native controls
    pub show_custom_controls: bool,
}

impl PlayerOptions {
    /// Options for the given source with every flag at its default
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            poster_image: None,
            display_title: None,
            aspect_ratio: AspectRatio::default(),
            autoplay: false,
            loop_playback: false,
            initially_muted: false,
            show_custom_controls: true,
        }
    }
}

/// Optional notification callbacks, invoked synchronously on transitions
#[derive(Default)]
pub struct PlayerCallbacks {
    pub on_play: Option<Box<dyn FnMut() + Send>>,
    pub on_pause: Option<Box<dyn FnMut() + Send>>,
    pub on_ended: Option<Box<dyn FnMut() + Send>>,
}

impl PlayerCallbacks {
    pub fn on_play(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_play = Some(Box::new(f));
        self
    }

    pub fn on_pause(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_pause = Some(Box::new(f));
        self
    }

    pub fn on_ended(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_ended = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for PlayerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerCallbacks")
            .field("on_play", &self.on_play.is_some())
            .field("on_pause", &self.on_pause.is_some())
            .field("on_ended", &self.on_ended.is_some())
            .finish()
    }
}

/// User-facing input delivered to a running session
#[derive(Debug)]
pub enum PlayerCommand {
    TogglePlay,
    ToggleMute,
    SetVolume(f64),
    Seek(f64),
    ToggleFullscreen,
    /// Pointer moved over the player
    PointerActivity,
    /// Pointer left the player
    PointerLeave,
    /// Click on the media element itself
    MediaClick,
    /// Request a render snapshot
    Snapshot(tokio::sync::oneshot::Sender<ControlSurface>),
    /// Tear the player down
    Unmount,
}
