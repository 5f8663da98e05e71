//! Snapshot: the externally observable state of the engine.
//!
//! Internal ticks mutate freely; a snapshot is rebuilt and published only
//! when one of the observable fields actually changed. [`DirtyFlags`]
//! records which ones, so listeners never fire on a no-op tick.

use bitflags::bitflags;

bitflags! {
    /// Observable fields that changed since the last published snapshot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct DirtyFlags: u8 {
        /// The reveal offset advanced.
        const REVEALED = 1 << 0;
        /// The anchor advanced (stable span grew).
        const ANCHOR = 1 << 1;
        /// The typing indicator flipped.
        const TYPING = 1 << 2;
        /// The lifecycle phase changed.
        const PHASE = 1 << 3;
    }
}

/// Lifecycle phase of a streaming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No stream: nothing fed since the last reset.
    #[default]
    Idle,
    /// Source below the initial reservoir; nothing revealed yet.
    Buffering,
    /// Revealing at the configured rate while chunks keep arriving.
    Streaming,
    /// Stream finished; revealing the remainder at the same rate.
    Draining,
    /// Fully revealed and finished; state is inert until reset.
    Settled,
}

/// A rendered span, or its raw text when the renderer failed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode<N> {
    /// The renderer's parsed representation.
    Rendered(N),
    /// Raw text fallback after a renderer failure.
    Raw(String),
}

impl<N> RenderedNode<N> {
    /// Get the parsed node, if this span rendered successfully.
    pub const fn rendered(&self) -> Option<&N> {
        match self {
            Self::Rendered(node) => Some(node),
            Self::Raw(_) => None,
        }
    }

    /// Check whether this span fell back to raw text.
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Externally observable state published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<N> {
    /// Finalized span, rendered once per anchor and cached.
    pub stable: RenderedNode<N>,
    /// Volatile span, rendered fresh for this snapshot.
    pub streaming: RenderedNode<N>,
    /// Whether a typing indicator should be shown.
    pub is_typing: bool,
    /// Revealed fraction of the source, in `0.0..=1.0`.
    pub progress: f64,
    /// Current lifecycle phase.
    pub phase: Phase,
}

impl<N> Default for Snapshot<N> {
    fn default() -> Self {
        Self {
            stable: RenderedNode::Raw(String::new()),
            streaming: RenderedNode::Raw(String::new()),
            is_typing: false,
            progress: 0.0,
            phase: Phase::Idle,
        }
    }
}
