//! Fence tracker: detect unterminated fenced code blocks in a prefix.
//!
//! The segment splitter must never finalize text that ends inside an open
//! code fence, because the downstream markdown parser would see (and cache)
//! a structurally broken block. This module answers one question: does a
//! given prefix end inside an open fence?
//!
//! The scan is a conservative approximation, not a markdown parser. Fences
//! are recognized only at line starts (up to three spaces of indent), which
//! also keeps backtick runs inside inline code spans from ever counting as
//! delimiters.

/// An open fence: the delimiter character and the length of its marker run.
///
/// A fence closes only on a marker of the same character at least as long
/// as the opener, per the CommonMark closing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceMarker {
    /// Delimiter character, `` ` `` or `~`.
    pub delimiter: char,
    /// Number of consecutive delimiter characters in the opening run.
    pub run: usize,
}

/// Check whether `text` contains no unterminated fenced code block.
///
/// Returns `false` when the text ends inside an open fence, meaning it is
/// unsafe to treat the prefix as finalized.
pub fn is_balanced(text: &str) -> bool {
    open_fence(text).is_none()
}

/// Return the fence left open at the end of `text`, if any.
///
/// The final line is considered even without a trailing newline: a marker
/// that has just started streaming in already makes the prefix unsafe.
pub fn open_fence(text: &str) -> Option<FenceMarker> {
    let mut state = FenceState::new();
    for line in text.split('\n') {
        state.feed_line(line);
    }
    state.open
}

/// Incremental fence state for line-at-a-time scans.
///
/// The segment splitter feeds each newly completed line exactly once, so
/// the whole prefix is never rescanned as the stream grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceState {
    open: Option<FenceMarker>,
}

impl FenceState {
    /// Create a state with no open fence.
    pub const fn new() -> Self {
        Self { open: None }
    }

    /// Check whether a fence is currently open.
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one complete line.
    ///
    /// Returns `true` when this line closed a fence. A closer may not carry
    /// an info string and must be at least as long as the opener, in the
    /// opener's delimiter.
    pub fn feed_line(&mut self, line: &str) -> bool {
        match (self.open, fence_marker(line)) {
            (None, Some((marker, _))) => {
                self.open = Some(marker);
                false
            }
            (Some(current), Some((marker, rest)))
                if marker.delimiter == current.delimiter
                    && marker.run >= current.run
                    && rest.trim().is_empty() =>
            {
                self.open = None;
                true
            }
            _ => false,
        }
    }
}

/// Parse a fence marker at the start of a single line.
///
/// Returns the marker and the remainder of the line (the info string).
fn fence_marker(line: &str) -> Option<(FenceMarker, &str)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let delimiter = trimmed.chars().next()?;
    if delimiter != '`' && delimiter != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|&c| c == delimiter).count();
    if run < 3 {
        return None;
    }
    Some((FenceMarker { delimiter, run }, &trimmed[run..]))
}
