//! pinplayer - headless media playback controller
//!
//! The controller keeps a control surface (scrub bar, play/pause, mute,
//! volume, time readout, fullscreen toggle and an auto-hiding overlay)
//! consistent with a media resource it talks to through a narrow
//! capability interface, and with a host presentation-mode signal that
//! may change on its own.

pub mod player;
pub mod utils;

pub use player::{
    ControlSurface, MediaPlayer, MediaPlayerBuilder, PlaybackState, PlayerCallbacks,
    PlayerController, PlayerOptions,
};
pub use utils::{format_time, PlayerError, Result};
