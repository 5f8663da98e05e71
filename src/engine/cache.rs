//! Stable cache: memoization of the rendered stable span.
//!
//! The stable span only ever changes when the anchor advances, so its
//! rendered tree is computed at most once per anchor. A cheap content hash
//! guards the entry: if upstream somehow corrected already-revealed text,
//! the hash misses and the span re-renders instead of serving a stale tree.

use std::hash::{DefaultHasher, Hash, Hasher};

use super::snapshot::RenderedNode;

/// Single-entry memo for the rendered stable span.
#[derive(Debug, Default)]
pub(crate) struct StableCache<N> {
    entry: Option<CacheEntry<N>>,
}

#[derive(Debug)]
struct CacheEntry<N> {
    anchor: usize,
    hash: u64,
    node: RenderedNode<N>,
}

impl<N: Clone> StableCache<N> {
    pub(crate) const fn new() -> Self {
        Self { entry: None }
    }

    /// Fetch the cached node for `(anchor, stable)`, rendering on miss.
    pub(crate) fn get_or_render(
        &mut self,
        anchor: usize,
        stable: &str,
        render: impl FnOnce(&str) -> RenderedNode<N>,
    ) -> RenderedNode<N> {
        let hash = span_hash(stable);
        if let Some(entry) = &self.entry {
            if entry.anchor == anchor && entry.hash == hash {
                tracing::trace!(anchor, "stable cache hit");
                return entry.node.clone();
            }
        }
        tracing::trace!(anchor, len = stable.len(), "stable cache miss, rendering");
        let node = render(stable);
        self.entry = Some(CacheEntry {
            anchor,
            hash,
            node: node.clone(),
        });
        node
    }

    pub(crate) fn clear(&mut self) {
        self.entry = None;
    }
}

fn span_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
