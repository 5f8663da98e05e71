//! Text analysis primitives: boundary snapping and fence tracking.
//!
//! These are the pure leaves of the engine. Both operate on a plain `&str`
//! prefix and keep no state, so the rate controller and segment splitter
//! can call them on every tick without lifecycle concerns.

mod boundary;
mod fence;

pub use boundary::snap_to_boundary;
pub use fence::{is_balanced, open_fence, FenceMarker, FenceState};
