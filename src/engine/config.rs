//! Configuration for the engine.

use std::time::Duration;

/// Tunables for the reveal pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Constant drain rate in characters per second.
    pub target_cps: f64,
    /// Characters buffered before draining begins.
    ///
    /// A small reservoir smooths the first seconds of a bursty network
    /// delivery; `finish` overrides it for short streams.
    pub initial_buffer_chars: usize,
    /// Look-back window for boundary snapping, in grapheme clusters.
    ///
    /// Within the window the reveal waits for a word to complete; past it
    /// the raw target is used so very long tokens still make progress.
    pub min_safe_boundary_window: usize,
    /// Interval for hosts that spawn the built-in [`crate::clock::Ticker`].
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_cps: 60.0,
            initial_buffer_chars: 24,
            min_safe_boundary_window: 32,
            tick_interval: Duration::from_millis(16),
        }
    }
}
