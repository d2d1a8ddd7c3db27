//! Error types for the runtime.

use std::io;

use sim_core::ModelError;
use thiserror::Error;

/// A fatal condition in either simulation loop.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("model evaluation failed: {0}")]
    Model(#[from] ModelError),
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("simulation thread panicked")]
    ProducerPanicked,
    #[error("session was already shut down")]
    AlreadyShutDown,
    #[error("presentation failed: {0}")]
    Present(#[from] PresentError),
}

/// The presentation layer could not display a frame.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PresentError {
    message: String,
}

impl PresentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A frame could not be written to disk.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("png encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}
