//! High-level media player API for pinplayer
//!
//! This module wraps the [`PlayerController`] in a session task. The task
//! owns the controller and serializes every input into it: user commands
//! from [`MediaPlayer`] handles, resource events, presentation changes and
//! the overlay's idle deadline. [`MediaPlayer`] is a cheap cloneable handle
//! that sends commands into the session.

use crate::player::controller::{EventSinks, EventStreams, PlayerController};
use crate::player::presentation::{PresentationHost, PresentationSignal};
use crate::player::resource::MediaResource;
use crate::player::surface::ControlSurface;
use crate::player::{PlayerCallbacks, PlayerCommand, PlayerOptions};
use crate::utils::config::PlayerDefaults;
use crate::utils::error::{PlayerError, Result};

use log::{debug, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Media player builder for customized configuration
pub struct MediaPlayerBuilder {
    options: PlayerOptions,
    defaults: PlayerDefaults,
    callbacks: PlayerCallbacks,
    resource: Option<Box<dyn MediaResource>>,
    host: Option<Box<dyn PresentationHost>>,
}

impl MediaPlayerBuilder {
    /// Create a new builder for the given options
    pub fn new(options: PlayerOptions) -> Self {
        Self {
            options,
            defaults: PlayerDefaults::default(),
            callbacks: PlayerCallbacks::default(),
            resource: None,
            host: None,
        }
    }

    /// Set session defaults (volume, idle delay)
    pub fn with_defaults(mut self, defaults: PlayerDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set notification callbacks
    pub fn with_callbacks(mut self, callbacks: PlayerCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Set the media resource the player owns
    pub fn with_resource(mut self, resource: impl MediaResource + 'static) -> Self {
        self.resource = Some(Box::new(resource));
        self
    }

    /// Set the presentation host; defaults to a fresh [`PresentationSignal`]
    pub fn with_presentation_host(mut self, host: impl PresentationHost + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    /// Mount a controller for callers that run their own event loop
    pub fn build(self, now: Instant) -> Result<(PlayerController, EventStreams)> {
        let resource = self
            .resource
            .ok_or_else(|| PlayerError::InvalidInput("No media resource configured".to_string()))?;
        let host = self
            .host
            .unwrap_or_else(|| Box::new(PresentationSignal::new()));

        let (sinks, streams) = EventSinks::channel();
        let controller = PlayerController::mount(
            self.options,
            resource,
            host,
            self.callbacks,
            &self.defaults,
            sinks,
            now,
        );

        Ok((controller, streams))
    }

    /// Mount the controller and run it on a tokio task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> Result<MediaPlayer> {
        let (controller, streams) = self.build(Instant::now())?;
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_session(controller, command_rx, streams));

        Ok(MediaPlayer {
            commands: command_tx,
            task: std::sync::Arc::new(parking_lot::Mutex::new(Some(task))),
        })
    }
}

/// Session loop: one input at a time, in arrival order
async fn run_session(
    mut controller: PlayerController,
    mut commands: mpsc::UnboundedReceiver<PlayerCommand>,
    mut streams: EventStreams,
) {
    info!("Player session started for {}", controller.container());

    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            biased;

            Some(event) = streams.resource.recv() => {
                controller.handle_resource_event(event, Instant::now());
            }

            Some(change) = streams.presentation.recv() => {
                controller.handle_presentation_change(change);
            }

            command = commands.recv() => match command {
                Some(command) => {
                    if !controller.handle_command(command, Instant::now()) {
                        break;
                    }
                }
                None => {
                    debug!("All player handles dropped");
                    break;
                }
            },

            // The future is built even when disabled, so no unwrap here
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                controller.handle_idle_timeout(Instant::now());
            }
        }
    }

    controller.unmount();
    drop(commands);
    info!("Player session ended for {}", controller.container());
}

/// Handle to a running player session
#[derive(Clone)]
pub struct MediaPlayer {
    commands: mpsc::UnboundedSender<PlayerCommand>,
    task: std::sync::Arc<parking_lot::Mutex<Option<JoinHandle<()>>>>,
}

impl MediaPlayer {
    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands.send(command)?;
        Ok(())
    }

    /// Toggle play/pause
    pub fn toggle_play(&self) -> Result<()> {
        self.send(PlayerCommand::TogglePlay)
    }

    /// Toggle mute
    pub fn toggle_mute(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleMute)
    }

    /// Set volume (0.0 to 1.0)
    pub fn set_volume(&self, volume: f64) -> Result<()> {
        self.send(PlayerCommand::SetVolume(volume))
    }

    /// Seek to a position in seconds
    pub fn seek(&self, position: f64) -> Result<()> {
        self.send(PlayerCommand::Seek(position))
    }

    /// Toggle fullscreen
    pub fn toggle_fullscreen(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleFullscreen)
    }

    /// Pointer moved over the player
    pub fn pointer_activity(&self) -> Result<()> {
        self.send(PlayerCommand::PointerActivity)
    }

    /// Pointer left the player
    pub fn pointer_leave(&self) -> Result<()> {
        self.send(PlayerCommand::PointerLeave)
    }

    /// Click on the media element
    pub fn media_click(&self) -> Result<()> {
        self.send(PlayerCommand::MediaClick)
    }

    /// Current render snapshot
    pub async fn snapshot(&self) -> Result<ControlSurface> {
        let (reply, response) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(reply))?;
        Ok(response.await?)
    }

    /// Unmount the player and wait for the session to finish
    pub async fn unmount(&self) -> Result<()> {
        // A closed session is already unmounted
        let _ = self.commands.send(PlayerCommand::Unmount);

        let task = self.task.lock().take();
        if let Some(task) = task {
            task.await
                .map_err(|e| PlayerError::Resource(format!("Player session failed: {}", e)))?;
        }
        Ok(())
    }

    /// Whether the session is still accepting commands
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}
