//! Boundary scanner: snap a reveal target to the nearest safe cut point.
//!
//! The rate controller produces a raw byte target from its character budget.
//! That target may land in the middle of a word or, worse, inside a
//! multi-codepoint grapheme cluster (emoji, combining marks). This module
//! snaps the target back to the closest offset that is safe to reveal.

use unicode_segmentation::UnicodeSegmentation;

/// Punctuation that may trail a revealed span.
///
/// A cut directly after one of these reads as a natural pause, so it is
/// accepted even without following whitespace.
const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '}', '"', '\'', '…', '。', '、', '，',
];

/// Snap `target` to the nearest safe reveal offset at or before it.
///
/// A safe offset is a grapheme-cluster boundary where the revealed prefix
/// ends just before whitespace or just after punctuation, so no word is
/// ever split mid-stream. `window` bounds the backward search in grapheme
/// clusters: if no safe offset exists within it, the grapheme-snapped
/// target itself is returned, which guarantees the reveal keeps making
/// progress through pathological inputs (very long tokens, base64 blobs).
///
/// The result is never greater than `target`. A `target` at or past the
/// end of `text` returns `text.len()`.
pub fn snap_to_boundary(text: &str, target: usize, window: usize) -> usize {
    if target >= text.len() {
        return text.len();
    }

    // Largest grapheme boundary at or before the target, plus the most
    // recent acceptable cut seen on the way there.
    let mut snapped = 0usize;
    let mut snapped_ord = 0usize;
    let mut best: Option<(usize, usize)> = None;
    let mut prev: Option<&str> = None;

    for (ordinal, (offset, grapheme)) in text.grapheme_indices(true).enumerate() {
        if offset > target {
            break;
        }
        snapped = offset;
        snapped_ord = ordinal;

        let ends_word = grapheme.chars().all(char::is_whitespace);
        let trails_punctuation = prev.is_some_and(|p| {
            p.chars()
                .next_back()
                .is_some_and(|c| TRAILING_PUNCTUATION.contains(&c))
        });
        if offset == 0 || ends_word || trails_punctuation {
            best = Some((offset, ordinal));
        }
        prev = Some(grapheme);
    }

    match best {
        Some((offset, ordinal)) if snapped_ord - ordinal <= window => offset,
        _ => snapped,
    }
}
