//! Engine: the composition root of the reveal pipeline.
//!
//! Wires the rate controller, segment splitter, and stable cache into the
//! feed/finish/snapshot API a rendering layer consumes:
//!
//! - **Feed**: chunks append to the source; observable state changes only
//!   through ticks (or immediately, under reduced motion).
//! - **Tick**: the host calls [`Engine::handle_tick`] from its frame loop;
//!   the engine advances the reveal, moves the anchor when safe, and
//!   publishes a fresh [`Snapshot`] only when something observable changed.
//! - **Snapshot**: the stable span comes from the cache (rendered once per
//!   anchor), the streaming span is rendered fresh, and a failing renderer
//!   degrades its span to raw text instead of tearing down the view.

mod cache;
mod config;
#[allow(clippy::module_inception)]
mod engine;
mod error;
mod snapshot;
mod traits;

pub use config::EngineConfig;
pub use engine::{Engine, SubscriptionId};
pub use error::{EngineError, RenderError};
pub use snapshot::{Phase, RenderedNode, Snapshot};
pub use traits::{
    AlwaysVisible, FullMotion, MotionPreference, ReducedMotion, Renderer, VisibilityOracle,
};
