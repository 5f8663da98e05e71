//! Reveal pipeline: constant-rate draining and stable/streaming segmentation.
//!
//! Two cooperating stateful pieces sit between the raw chunk stream and the
//! renderer:
//!
//! - [`RateController`] owns the source text and the monotonic reveal
//!   offset, draining it toward the end at a constant characters-per-second
//!   rate regardless of how bursty chunk arrival is.
//! - [`SegmentSplitter`] divides the revealed prefix into a finalized
//!   *stable* span (safe to cache) and a volatile *streaming* span
//!   (re-rendered every publish), advancing its anchor only at offsets
//!   where markdown structure is provably complete.

mod rate;
mod splitter;

pub use rate::RateController;
pub use splitter::{SegmentSplitter, Segments};
