//! Segment splitter: divide revealed text into stable and streaming spans.
//!
//! The anchor is the offset below which text is finalized: structure there
//! is provably complete, so the rendered tree for it can be cached and
//! never recomputed. Everything between the anchor and the reveal offset
//! is the streaming span, re-rendered on every publish because the next
//! chunk may still change how it parses.
//!
//! Safe boundaries are the offset just after a blank line and the offset
//! just after the newline closing a fenced code block. Both are only
//! accepted outside an open fence, which keeps the anchor invariant: the
//! stable span is always fence-balanced. Other constructs (tables, lists)
//! are deliberately left to the streaming span; under-advancing the anchor
//! costs re-rendering, never correctness.

use crate::text::FenceState;

/// The two renderable spans of the source at a given reveal offset.
///
/// The hidden remainder past the reveal offset is intentionally absent:
/// it must never reach a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments<'a> {
    /// Finalized prefix, safe to render once and cache.
    pub stable: &'a str,
    /// Volatile middle, re-rendered every publish.
    pub streaming: &'a str,
}

/// Maintains the anchor and the incremental line scan that advances it.
#[derive(Debug, Default)]
pub struct SegmentSplitter {
    /// Finalized-prefix length in bytes. Never regresses.
    anchor: usize,
    /// Start of the first line not yet fed to the scan.
    scan_pos: usize,
    /// Fence state at `scan_pos`.
    fence: FenceState,
    /// Furthest safe boundary discovered so far.
    candidate: usize,
}

impl SegmentSplitter {
    /// Create a splitter anchored at the start of an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current anchor offset in bytes.
    pub const fn anchor(&self) -> usize {
        self.anchor
    }

    /// Advance the anchor through newly revealed text.
    ///
    /// Only lines whose terminating newline lies inside `source[..revealed]`
    /// are judged; a partially revealed line can still change. Each line is
    /// scanned exactly once across the life of the stream.
    pub fn advance(&mut self, source: &str, revealed: usize) -> usize {
        let revealed = revealed.min(source.len());
        while self.scan_pos < revealed {
            let Some(nl) = source[self.scan_pos..revealed].find('\n') else {
                break;
            };
            let line_end = self.scan_pos + nl;
            let line = &source[self.scan_pos..line_end];
            let after = line_end + 1;

            let closed_fence = self.fence.feed_line(line);
            if closed_fence || (!self.fence.is_open() && line.trim().is_empty()) {
                self.candidate = after;
            }
            self.scan_pos = after;
        }
        debug_assert!(self.candidate <= revealed);

        if self.candidate > self.anchor {
            tracing::trace!(
                from = self.anchor,
                to = self.candidate,
                "anchor advanced to safe boundary"
            );
            self.anchor = self.candidate;
        }
        self.anchor
    }

    /// Anchor the entire document once the stream has fully drained.
    ///
    /// At end of stream a trailing paragraph needs no closing blank line:
    /// nothing further can arrive to change it. The document is finalized
    /// whole unless it ends inside an open fence, in which case the anchor
    /// stays at the last safe boundary and the broken tail remains in the
    /// always-reparsed streaming span.
    pub fn finalize(&mut self, source: &str) -> usize {
        self.advance(source, source.len());
        let mut fence = self.fence;
        for line in source[self.scan_pos..].split('\n') {
            fence.feed_line(line);
        }
        if !fence.is_open() && source.len() > self.anchor {
            tracing::debug!(anchor = source.len(), "document settled, anchoring whole text");
            self.anchor = source.len();
        }
        self.anchor
    }

    /// Split the revealed prefix at the current anchor.
    pub fn segments<'a>(&self, source: &'a str, revealed: usize) -> Segments<'a> {
        let revealed = revealed.min(source.len());
        debug_assert!(self.anchor <= revealed);
        Segments {
            stable: &source[..self.anchor],
            streaming: &source[self.anchor..revealed],
        }
    }

    /// Return to the empty idle state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
