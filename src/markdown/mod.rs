//! Built-in markdown renderer.
//!
//! The engine treats its renderer as a host-supplied pure function; this
//! module supplies a ready-made one so the crate works out of the box. It
//! parses a span with `pulldown-cmark` into a block-level tree suitable
//! for a view layer to walk.

mod tree;

pub use tree::{MarkdownNode, TreeRenderer};
