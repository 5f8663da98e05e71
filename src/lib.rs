//! # Cadence
//!
//! A smooth-reveal streaming markdown engine for Agentic CLIs.
//!
//! Cadence renders an assistant response that arrives in bursty, irregular
//! chunks at a constant visual rate, re-parsing only the small volatile
//! tail of the document and never exposing a syntactically incomplete
//! markdown construct as finalized output.
//!
//! ## Core Concepts
//!
//! - **Rate-controlled drain**: chunks fill a buffer; a fixed
//!   characters-per-second drain empties it, snapped to word boundaries
//! - **Anchor/reveal split**: text below the anchor is finalized and its
//!   rendered tree cached; text between anchor and reveal is re-rendered
//! - **Safe boundaries**: the anchor advances only past blank lines and
//!   closed code fences, so a cached tree is never structurally broken
//! - **Injected clock and oracles**: ticking, visibility, and motion
//!   preference are collaborators, making the engine deterministic in tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use cadence::{Engine, TreeRenderer};
//!
//! let mut engine = Engine::new(TreeRenderer::new());
//! engine.feed("Streaming **markdown** arrives")?;
//! engine.handle_tick(std::time::Duration::from_millis(16));
//! let snapshot = engine.snapshot();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod text;
pub mod reveal;
pub mod clock;
pub mod engine;
pub mod markdown;

// Re-exports for convenience
pub use clock::{Tick, Ticker};
pub use engine::{
    Engine, EngineConfig, EngineError, Phase, RenderError, RenderedNode, Renderer, Snapshot,
    SubscriptionId,
};
pub use markdown::{MarkdownNode, TreeRenderer};
pub use reveal::{RateController, SegmentSplitter, Segments};
