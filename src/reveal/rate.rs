//! Rate controller: constant-rate drain of the growing source text.
//!
//! Chunks arrive bursty and irregular; the reveal must advance at a smooth
//! constant pace. The controller accumulates a fractional character budget
//! each tick and converts it into a byte offset, snapped to a safe cut
//! point so no word or grapheme cluster is ever split.
//!
//! The budget is clamped to the available text and the excess *dropped*,
//! never banked: an empty buffer or a paused clock therefore never causes
//! a catch-up burst when draining resumes.

use std::time::Duration;

use crate::text::snap_to_boundary;

/// Drains a monotonic reveal offset toward the end of the source text at a
/// constant characters-per-second rate.
#[derive(Debug)]
pub struct RateController {
    /// Accumulated source text. Append-only.
    source: String,
    /// Total characters in `source`.
    total_chars: usize,
    /// Revealed prefix length in bytes. Always a grapheme boundary.
    revealed: usize,
    /// Raw drain position in characters, fractional part included.
    ///
    /// Monotonic and clamped to `total_chars`; the fraction is carried
    /// across ticks so long streams do not drift below the target rate.
    raw_chars: f64,
    /// Char/byte cursor pairing `cursor_chars` counted before `cursor_bytes`.
    cursor_chars: usize,
    cursor_bytes: usize,
    /// Configured drain rate in characters per second.
    target_cps: f64,
    /// Reservoir: draining starts once this many characters have arrived.
    initial_buffer_chars: usize,
    /// Look-back window for boundary snapping, in grapheme clusters.
    boundary_window: usize,
    /// Set by `finish`; switches the controller to drain-to-completion.
    finished: bool,
}

impl RateController {
    /// Create a controller with the given rate, reservoir, and snap window.
    pub const fn new(
        target_cps: f64,
        initial_buffer_chars: usize,
        boundary_window: usize,
    ) -> Self {
        Self {
            source: String::new(),
            total_chars: 0,
            revealed: 0,
            raw_chars: 0.0,
            cursor_chars: 0,
            cursor_bytes: 0,
            target_cps,
            initial_buffer_chars,
            boundary_window,
            finished: false,
        }
    }

    /// The full accumulated source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Revealed prefix length in bytes.
    pub const fn revealed(&self) -> usize {
        self.revealed
    }

    /// Whether `finish` has been called.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether every character of the source has been revealed.
    pub fn is_fully_revealed(&self) -> bool {
        self.revealed == self.source.len()
    }

    /// Whether the controller is still filling its initial reservoir.
    ///
    /// While buffering, ticks do not drain. A `finish` before the reservoir
    /// fills starts draining immediately; a short stream must not wait
    /// forever for characters that will never come.
    pub const fn is_buffering(&self) -> bool {
        !self.finished && self.total_chars < self.initial_buffer_chars
    }

    /// Whether a typing indicator should be shown.
    ///
    /// True from the moment draining starts until the stream is finished
    /// *and* fully revealed. An empty buffer mid-stream keeps the indicator
    /// up: the cursor waits for the next chunk.
    pub fn is_typing(&self) -> bool {
        if self.is_buffering() {
            return false;
        }
        if self.source.is_empty() && !self.finished {
            return false;
        }
        !(self.finished && self.is_fully_revealed())
    }

    /// Append a chunk to the source. Does not advance the reveal.
    pub fn feed(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.source.push_str(chunk);
        self.total_chars += chunk.chars().count();
    }

    /// Mark the stream complete; ticks keep draining at the same rate.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Advance the drain by `delta` worth of budget.
    ///
    /// Returns the new revealed offset. The reveal is monotonic: a snap
    /// that would back up below the current offset leaves it unchanged.
    pub fn tick(&mut self, delta: Duration) -> usize {
        if self.is_buffering() {
            return self.revealed;
        }

        let budget = self.target_cps * delta.as_secs_f64();
        #[allow(clippy::cast_precision_loss)]
        {
            self.raw_chars = (self.raw_chars + budget).min(self.total_chars as f64);
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target_chars = self.raw_chars as usize;
        let target_bytes = self.byte_offset_for(target_chars);
        let snapped = snap_to_boundary(&self.source, target_bytes, self.boundary_window);
        if snapped > self.revealed {
            self.revealed = snapped;
        }
        self.revealed
    }

    /// Reveal the entire source immediately, bypassing the rate limit.
    ///
    /// Used for reduced-motion hosts and clockless environments.
    pub fn reveal_all(&mut self) {
        #[allow(clippy::cast_precision_loss)]
        {
            self.raw_chars = self.total_chars as f64;
        }
        self.cursor_chars = self.total_chars;
        self.cursor_bytes = self.source.len();
        self.revealed = self.source.len();
    }

    /// Return to the empty idle state.
    pub fn reset(&mut self) {
        self.source.clear();
        self.total_chars = 0;
        self.revealed = 0;
        self.raw_chars = 0.0;
        self.cursor_chars = 0;
        self.cursor_bytes = 0;
        self.finished = false;
    }

    /// Convert a character count into a byte offset.
    ///
    /// The cursor only ever moves forward because `raw_chars` is monotonic,
    /// so the conversion is amortized O(new text) over a whole stream.
    fn byte_offset_for(&mut self, target_chars: usize) -> usize {
        if target_chars >= self.total_chars {
            self.cursor_chars = self.total_chars;
            self.cursor_bytes = self.source.len();
            return self.cursor_bytes;
        }
        while self.cursor_chars < target_chars {
            match self.source[self.cursor_bytes..].chars().next() {
                Some(c) => {
                    self.cursor_bytes += c.len_utf8();
                    self.cursor_chars += 1;
                }
                None => break,
            }
        }
        self.cursor_bytes
    }
}
