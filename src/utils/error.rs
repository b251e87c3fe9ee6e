//! Error types for pinplayer
//!
//! This module defines the error type used by the library. We use thiserror
//! for the error definitions and anyhow at the binary level.
//!
//! Most failure conditions inside a playback session (blocked autoplay,
//! media decode errors, rejected fullscreen requests, out-of-range input)
//! are recovered locally by the controller and never surface here.

use thiserror::Error;

/// Main error type for pinplayer
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Media resource errors
    #[error("Resource error: {0}")]
    Resource(String),

    /// Presentation host errors (fullscreen requests)
    #[error("Presentation error: {0}")]
    Presentation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The session task has shut down
    #[error("Player session closed")]
    SessionClosed,
}

impl PlayerError {
    /// Create a presentation error from string
    pub fn presentation<S: Into<String>>(msg: S) -> Self {
        PlayerError::Presentation(msg.into())
    }
}

/// Convenience type alias for Results in pinplayer
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Extension trait for converting other errors to PlayerError
pub trait IntoPlayerError<T> {
    /// Convert this error into a PlayerError with the given context
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Config(format!("{}: {}", context, e)))
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for PlayerError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        PlayerError::SessionClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for PlayerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        PlayerError::SessionClosed
    }
}
