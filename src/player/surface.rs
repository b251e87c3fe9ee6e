//! Render model of the player's control surface
//!
//! A [`ControlSurface`] is an immutable snapshot a view layer can draw
//! directly: slider ranges and values, which icon each button shows, the
//! time readout and the visibility flags.

use crate::player::{AspectRatio, PlayerOptions, PlayerStateData};
use crate::utils::format_time;
use serde::{Deserialize, Serialize};

/// Slider description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeControl {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeIcon {
    Audible,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullscreenIcon {
    Enter,
    Exit,
}

/// Snapshot of everything the view renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSurface {
    pub source: String,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub aspect_ratio: AspectRatio,

    /// Host's native controls are used instead of the overlay
    pub native_controls: bool,

    /// The visual media element is rendered
    pub media_visible: bool,

    /// The custom overlay is shown
    pub overlay_visible: bool,

    pub scrub: RangeControl,
    pub volume: RangeControl,
    pub play_button: PlayIcon,
    pub mute_button: VolumeIcon,
    pub fullscreen_button: FullscreenIcon,

    pub elapsed: String,
    pub total: String,
}

impl ControlSurface {
    pub fn render(options: &PlayerOptions, state: &PlayerStateData) -> Self {
        let custom = options.show_custom_controls;

        Self {
            source: options.source.clone(),
            title: options.display_title.clone(),
            poster: options.poster_image.clone(),
            aspect_ratio: options.aspect_ratio,
            native_controls: !custom,
            media_visible: state.media_visible(),
            overlay_visible: custom && state.overlay.visible,
            scrub: RangeControl {
                min: 0.0,
                max: state.timeline.upper_bound(),
                step: None,
                value: state.timeline.current_time,
            },
            volume: RangeControl {
                min: 0.0,
                max: 1.0,
                step: Some(0.01),
                value: state.audio.displayed_volume(),
            },
            play_button: if state.is_playing() { PlayIcon::Pause } else { PlayIcon::Play },
            mute_button: if state.audio.muted { VolumeIcon::Muted } else { VolumeIcon::Audible },
            fullscreen_button: if state.fullscreen { FullscreenIcon::Exit } else { FullscreenIcon::Enter },
            elapsed: format_time(state.timeline.current_time),
            total: format_time(state.timeline.upper_bound()),
        }
    }

    /// `elapsed / total`, e.g. `1:05 / 2:05`
    pub fn readout(&self) -> String {
        format!("{} / {}", self.elapsed, self.total)
    }
}
