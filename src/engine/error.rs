//! Error types for the engine surface.

use thiserror::Error;

/// Errors returned by the engine's public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `feed` was called after `finish` without an intervening `reset`.
    #[error("stream already finished; call reset() before feeding again")]
    StreamFinished,
}

/// A renderer failure for one span.
///
/// The engine recovers locally: the failing span degrades to raw text and
/// the error is passed to the optional `on_render_error` handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("renderer failed: {message}")]
pub struct RenderError {
    /// Human-readable description from the renderer.
    pub message: String,
}

impl RenderError {
    /// Create a render error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
