//! Player state for pinplayer
//!
//! Plain data owned by one controller. Each sub-state enforces its own
//! invariants (volume in `[0, 1]`, zero volume means muted, position
//! within `[0, duration]`) so the controller only decides *when* to
//! mutate, never how to keep values in range.

use crate::player::{PlaybackState, DEFAULT_VOLUME};
use crate::utils::{clamp, clamp_unit};
use serde::{Deserialize, Serialize};

/// Sound configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioState {
    /// Volume level (0.0 to 1.0)
    pub volume: f64,

    /// Muted state
    pub muted: bool,

    /// Last non-zero volume, restored when unmuting from zero
    pub last_audible: f64,
}

impl AudioState {
    pub fn new(volume: f64, muted: bool) -> Self {
        let volume = clamp_unit(volume);
        Self {
            volume,
            muted: muted || volume == 0.0,
            last_audible: if volume > 0.0 { volume } else { DEFAULT_VOLUME },
        }
    }

    /// Store a new level; returns the clamped value
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        let volume = clamp_unit(volume);
        self.volume = volume;
        self.muted = volume == 0.0;
        if volume > 0.0 {
            self.last_audible = volume;
        }
        volume
    }

    /// Flip mute; returns the restored level when unmuting from zero
    pub fn toggle_mute(&mut self) -> Option<f64> {
        self.muted = !self.muted;
        if !self.muted && self.volume == 0.0 {
            self.volume = self.last_audible;
            return Some(self.volume);
        }
        None
    }

    /// Value the volume slider shows
    pub fn displayed_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

/// Playback position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    /// Current position in seconds
    pub current_time: f64,

    /// Duration in seconds, unknown until metadata loads
    pub duration: Option<f64>,
}

impl TimelineState {
    /// Upper end of the scrub range
    pub fn upper_bound(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// Record the duration; non-finite or negative values stay unknown
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = (duration.is_finite() && duration >= 0.0).then_some(duration);
        self.current_time = clamp(self.current_time, 0.0, self.upper_bound());
    }

    /// Clamp a seek target into `[0, duration]`
    pub fn seek_target(&self, target: f64) -> f64 {
        clamp(target, 0.0, self.upper_bound())
    }

    /// Apply a position reported by the resource
    pub fn update_position(&mut self, position: f64) {
        self.current_time = clamp(position, 0.0, self.upper_bound());
    }

    /// Jump to the end of the media
    pub fn finish(&mut self) {
        if let Some(duration) = self.duration {
            self.current_time = duration;
        }
    }
}

/// Visibility of the on-screen controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayState {
    pub visible: bool,
}

/// Readiness of the media element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaStatus {
    /// Waiting for metadata
    Loading,

    /// Metadata loaded
    Ready,

    /// Load or decode error; the visual element is suppressed
    Failed(String),
}

/// All state a controller owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateData {
    /// Current playback state
    pub playback: PlaybackState,

    pub audio: AudioState,

    pub timeline: TimelineState,

    pub overlay: OverlayState,

    /// Fullscreen state, as last announced by the host
    pub fullscreen: bool,

    pub media: MediaStatus,
}

impl PlayerStateData {
    pub fn new(volume: f64, muted: bool, overlay_visible: bool) -> Self {
        Self {
            playback: PlaybackState::Idle,
            audio: AudioState::new(volume, muted),
            timeline: TimelineState::default(),
            overlay: OverlayState { visible: overlay_visible },
            fullscreen: false,
            media: MediaStatus::Loading,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Whether the visual element should be rendered
    pub fn media_visible(&self) -> bool {
        !matches!(self.media, MediaStatus::Failed(_))
    }
}
