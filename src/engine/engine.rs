//! Engine: coordinator that ties the reveal pipeline together.
//!
//! The engine owns the rate controller, segment splitter, and stable
//! cache, and exposes the feed/finish/snapshot surface consumed by a
//! rendering layer. It is single-threaded by construction: every state
//! transition happens inside a `&mut self` method, driven by the host's
//! frame loop and chunk arrivals.

use std::time::Duration;

use crate::reveal::{RateController, SegmentSplitter};

use super::cache::StableCache;
use super::config::EngineConfig;
use super::error::{EngineError, RenderError};
use super::snapshot::{DirtyFlags, Phase, RenderedNode, Snapshot};
use super::traits::{AlwaysVisible, FullMotion, MotionPreference, Renderer, VisibilityOracle};

/// Handle returned by [`Engine::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ListenerFn<N> = Box<dyn FnMut(&Snapshot<N>)>;
type RenderErrorHandler = Box<dyn FnMut(&RenderError)>;

struct Listener<N> {
    id: SubscriptionId,
    callback: ListenerFn<N>,
}

/// Scalar fields of the last published snapshot, for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PublishedState {
    revealed: usize,
    anchor: usize,
    is_typing: bool,
    phase: Phase,
}

/// The streaming reveal engine.
///
/// Generic over the host's [`Renderer`]; everything else is injected
/// through setters so tests can drive the engine deterministically.
pub struct Engine<R: Renderer> {
    /// Configuration.
    config: EngineConfig,
    /// Host markdown parser.
    renderer: R,
    /// Visibility signal; ticks are ignored while hidden.
    visibility: Box<dyn VisibilityOracle>,
    /// Motion preference; reduced motion bypasses the rate limiter.
    motion: Box<dyn MotionPreference>,
    /// Rate-controlled drain state.
    rate: RateController,
    /// Anchor/reveal segmentation state.
    splitter: SegmentSplitter,
    /// Memoized stable-span render.
    cache: StableCache<R::Node>,
    /// Snapshot listeners.
    listeners: Vec<Listener<R::Node>>,
    /// Next subscription id.
    next_subscription: u64,
    /// Optional handler for renderer failures.
    on_render_error: Option<RenderErrorHandler>,
    /// Last published snapshot.
    snapshot: Snapshot<R::Node>,
    /// Scalars of the last published snapshot.
    published: PublishedState,
}

impl<R: Renderer> Engine<R> {
    /// Create an engine with the default configuration.
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, EngineConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(renderer: R, config: EngineConfig) -> Self {
        let mut engine = Self {
            rate: RateController::new(
                config.target_cps,
                config.initial_buffer_chars,
                config.min_safe_boundary_window,
            ),
            splitter: SegmentSplitter::new(),
            cache: StableCache::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            on_render_error: None,
            snapshot: Snapshot::default(),
            published: PublishedState::default(),
            visibility: Box::new(AlwaysVisible),
            motion: Box::new(FullMotion),
            renderer,
            config,
        };
        // Render the empty spans once so even the idle snapshot carries the
        // renderer's representation rather than placeholder text.
        engine.publish();
        engine
    }

    /// Get the engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Inject a visibility oracle (default: always visible).
    pub fn set_visibility_oracle(&mut self, oracle: impl VisibilityOracle + 'static) {
        self.visibility = Box::new(oracle);
    }

    /// Inject a motion preference (default: full motion).
    pub fn set_motion_preference(&mut self, preference: impl MotionPreference + 'static) {
        self.motion = Box::new(preference);
    }

    /// Install a handler invoked whenever the renderer fails on a span.
    pub fn set_render_error_handler(&mut self, handler: impl FnMut(&RenderError) + 'static) {
        self.on_render_error = Some(Box::new(handler));
    }

    /// The full accumulated source text, including the hidden remainder.
    pub fn source(&self) -> &str {
        self.rate.source()
    }

    /// Revealed prefix length in bytes.
    pub const fn revealed(&self) -> usize {
        self.rate.revealed()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if !self.rate.is_finished() && self.rate.source().is_empty() {
            return Phase::Idle;
        }
        if self.rate.is_finished() {
            if self.rate.is_fully_revealed() {
                Phase::Settled
            } else {
                Phase::Draining
            }
        } else if self.rate.is_buffering() && self.rate.revealed() == 0 {
            Phase::Buffering
        } else {
            Phase::Streaming
        }
    }

    /// Append a chunk of source text.
    ///
    /// A no-op on the empty string. Fails once the stream is finished;
    /// call [`Engine::reset`] to start a new message.
    pub fn feed(&mut self, chunk: &str) -> Result<(), EngineError> {
        if self.rate.is_finished() {
            return Err(EngineError::StreamFinished);
        }
        if chunk.is_empty() {
            return Ok(());
        }
        tracing::trace!(len = chunk.len(), "feed chunk");
        self.rate.feed(chunk);
        if self.motion.prefers_reduced_motion() {
            self.rate.reveal_all();
            self.splitter.advance(self.rate.source(), self.rate.revealed());
        }
        self.sync();
        Ok(())
    }

    /// Mark the stream complete. Idempotent.
    ///
    /// Draining continues at the configured rate; there is no jump to the
    /// full text unless reduced motion is preferred.
    pub fn finish(&mut self) {
        if self.rate.is_finished() {
            return;
        }
        tracing::debug!(len = self.rate.source().len(), "stream finished");
        self.rate.finish();
        if self.motion.prefers_reduced_motion() {
            self.rate.reveal_all();
        }
        self.settle_if_drained();
        self.sync();
    }

    /// Advance the reveal by one tick of the host's clock.
    ///
    /// Ignored while the visibility oracle reports hidden, so backgrounded
    /// views pause without losing state and resume without a burst.
    pub fn handle_tick(&mut self, delta: Duration) {
        if self.visibility.is_hidden() {
            tracing::trace!("tick ignored while hidden");
            return;
        }
        if matches!(self.phase(), Phase::Idle | Phase::Settled) {
            return;
        }
        let revealed = self.rate.tick(delta);
        self.splitter.advance(self.rate.source(), revealed);
        self.settle_if_drained();
        self.sync();
    }

    /// Return the engine to `Idle`, clearing all stream state.
    ///
    /// Safe to call from teardown paths regardless of clock state.
    pub fn reset(&mut self) {
        tracing::debug!("engine reset");
        self.rate.reset();
        self.splitter.reset();
        self.cache.clear();
        self.sync();
    }

    /// Register a listener invoked on every published snapshot.
    ///
    /// Listeners run only when an observable field changed, never on
    /// internal ticks that observed nothing new.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Snapshot<R::Node>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push(Listener {
            id,
            callback: Box::new(listener),
        });
        id
    }

    /// Remove a listener. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Get the current snapshot.
    ///
    /// Repeated calls between publications return identical snapshots.
    pub fn snapshot(&self) -> Snapshot<R::Node> {
        self.snapshot.clone()
    }

    /// Finalize the splitter once the stream is finished and fully drained.
    fn settle_if_drained(&mut self) {
        if self.rate.is_finished() && self.rate.is_fully_revealed() {
            self.splitter.finalize(self.rate.source());
        }
    }

    /// Publish a snapshot if any observable field changed.
    fn sync(&mut self) {
        let revealed = self.rate.revealed();
        let anchor = self.splitter.anchor();
        let is_typing = self.rate.is_typing();
        let phase = self.phase();
        debug_assert!(anchor <= revealed && revealed <= self.rate.source().len());

        let mut dirty = DirtyFlags::empty();
        if revealed != self.published.revealed {
            dirty |= DirtyFlags::REVEALED;
        }
        if anchor != self.published.anchor {
            dirty |= DirtyFlags::ANCHOR;
        }
        if is_typing != self.published.is_typing {
            dirty |= DirtyFlags::TYPING;
        }
        if phase != self.published.phase {
            dirty |= DirtyFlags::PHASE;
        }
        if dirty.is_empty() {
            return;
        }
        tracing::trace!(?dirty, revealed, anchor, "publishing snapshot");
        self.publish();
        for listener in &mut self.listeners {
            (listener.callback)(&self.snapshot);
        }
    }

    /// Rebuild and store the snapshot from current state.
    fn publish(&mut self) {
        let revealed = self.rate.revealed();
        let anchor = self.splitter.anchor();
        let is_typing = self.rate.is_typing();
        let phase = self.phase();

        let segments = self.splitter.segments(self.rate.source(), revealed);
        let renderer = &self.renderer;
        let on_render_error = &mut self.on_render_error;
        let stable = self.cache.get_or_render(anchor, segments.stable, |text| {
            render_span(renderer, &mut *on_render_error, text)
        });
        let streaming = render_span(renderer, on_render_error, segments.streaming);

        #[allow(clippy::cast_precision_loss)]
        let progress = revealed as f64 / self.rate.source().len().max(1) as f64;

        self.snapshot = Snapshot {
            stable,
            streaming,
            is_typing,
            progress,
            phase,
        };
        self.published = PublishedState {
            revealed,
            anchor,
            is_typing,
            phase,
        };
    }
}

/// Render one span, degrading to raw text when the renderer fails.
fn render_span<R: Renderer>(
    renderer: &R,
    on_render_error: &mut Option<RenderErrorHandler>,
    text: &str,
) -> RenderedNode<R::Node> {
    match renderer.render(text) {
        Ok(node) => RenderedNode::Rendered(node),
        Err(error) => {
            tracing::warn!(%error, len = text.len(), "renderer failed, span degrades to raw text");
            if let Some(handler) = on_render_error {
                handler(&error);
            }
            RenderedNode::Raw(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::traits::ReducedMotion;
    use super::*;
    use crate::text::is_balanced;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Identity renderer: the node is the span text itself.
    fn identity(text: &str) -> Result<String, RenderError> {
        Ok(text.to_string())
    }

    fn fast_engine() -> Engine<fn(&str) -> Result<String, RenderError>> {
        Engine::with_config(
            identity,
            EngineConfig {
                target_cps: 1000.0,
                initial_buffer_chars: 0,
                ..EngineConfig::default()
            },
        )
    }

    fn revealed_text<N>(snapshot: &Snapshot<N>) -> String
    where
        N: Clone + AsRef<str>,
    {
        let mut out = String::new();
        for node in [&snapshot.stable, &snapshot.streaming] {
            match node {
                RenderedNode::Rendered(n) => out.push_str(n.as_ref()),
                RenderedNode::Raw(raw) => out.push_str(raw),
            }
        }
        out
    }

    struct SharedVisibility(Arc<AtomicBool>);

    impl VisibilityOracle for SharedVisibility {
        fn is_hidden(&self) -> bool {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn test_feed_after_finish_errors() {
        let mut engine = fast_engine();
        engine.feed("hello").unwrap();
        engine.finish();
        assert_eq!(engine.feed("more"), Err(EngineError::StreamFinished));
        engine.reset();
        assert!(engine.feed("fresh").is_ok());
    }

    #[test]
    fn test_empty_feed_is_noop() {
        let mut engine = fast_engine();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        engine.subscribe(move |_| seen.set(seen.get() + 1));
        engine.feed("").unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_reveal_is_monotonic_and_bounded() {
        let mut engine = Engine::with_config(
            identity as fn(&str) -> Result<String, RenderError>,
            EngineConfig {
                target_cps: 80.0,
                initial_buffer_chars: 0,
                ..EngineConfig::default()
            },
        );
        let mut last = 0;
        for i in 0..40 {
            if i % 8 == 0 {
                engine.feed("irregular chunks of words arrive ").unwrap();
            }
            engine.handle_tick(Duration::from_millis(50));
            assert!(engine.revealed() >= last);
            assert!(engine.revealed() <= engine.source().len());
            last = engine.revealed();
        }
    }

    #[test]
    fn test_anchor_prefix_stays_balanced_throughout() {
        let mut engine = fast_engine();
        let chunks = [
            "Intro paragraph.\n\n",
            "```rust\nlet a",
            " = 1;\n```",
            "\n\nClosing ",
            "words here.",
        ];
        for chunk in chunks {
            engine.feed(chunk).unwrap();
            engine.handle_tick(Duration::from_millis(100));
            let snapshot = engine.snapshot();
            if let RenderedNode::Rendered(stable) = &snapshot.stable {
                assert!(is_balanced(stable), "unbalanced stable span: {stable:?}");
            }
        }
        engine.finish();
        engine.handle_tick(Duration::from_secs(10));
        assert_eq!(engine.phase(), Phase::Settled);
    }

    #[test]
    fn test_anchor_lands_after_fence_and_blank_line() {
        let mut engine = fast_engine();
        engine
            .feed("Paragraph one.\n\n```js\ncode\n```\n\nParagraph two is still str")
            .unwrap();
        engine.handle_tick(Duration::from_secs(10));
        let snapshot = engine.snapshot();
        assert_eq!(
            snapshot.stable,
            RenderedNode::Rendered("Paragraph one.\n\n```js\ncode\n```\n\n".to_string())
        );
        assert_eq!(
            snapshot.streaming,
            RenderedNode::Rendered("Paragraph two is still str".to_string())
        );
    }

    #[test]
    fn test_open_fence_keeps_tail_streaming_after_settle() {
        let mut engine = fast_engine();
        engine.feed("text\n\n```js\nunfinished").unwrap();
        engine.finish();
        engine.handle_tick(Duration::from_secs(10));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, Phase::Settled);
        assert_eq!(
            snapshot.stable,
            RenderedNode::Rendered("text\n\n".to_string())
        );
        assert_eq!(
            snapshot.streaming,
            RenderedNode::Rendered("```js\nunfinished".to_string())
        );
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut engine = fast_engine();
        engine.feed("First.\n\nSecond paragraph.").unwrap();
        engine.finish();
        engine.handle_tick(Duration::from_secs(10));
        let first = engine.snapshot();
        assert_eq!(first.phase, Phase::Settled);
        assert!((first.progress - 1.0).abs() < f64::EPSILON);
        assert!(!first.is_typing);

        engine.finish();
        engine.handle_tick(Duration::from_secs(1));
        assert_eq!(engine.snapshot(), first);
        assert_eq!(engine.snapshot(), engine.snapshot());
    }

    #[test]
    fn test_settled_document_is_single_stable_segment() {
        let mut engine = fast_engine();
        engine.feed("Only paragraph, no trailing newline").unwrap();
        engine.finish();
        engine.handle_tick(Duration::from_secs(10));
        let snapshot = engine.snapshot();
        assert_eq!(
            snapshot.stable,
            RenderedNode::Rendered("Only paragraph, no trailing newline".to_string())
        );
        assert_eq!(snapshot.streaming, RenderedNode::Rendered(String::new()));
    }

    #[test]
    fn test_listeners_fire_only_on_observable_change() {
        let mut engine = fast_engine();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        engine.subscribe(move |_| seen.set(seen.get() + 1));

        engine.feed("some words to reveal").unwrap();
        let after_feed = count.get();
        assert!(after_feed >= 1);

        // Zero-length ticks observe nothing new.
        for _ in 0..5 {
            engine.handle_tick(Duration::ZERO);
        }
        assert_eq!(count.get(), after_feed);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut engine = fast_engine();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let id = engine.subscribe(move |_| seen.set(seen.get() + 1));
        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.feed("words").unwrap();
        engine.handle_tick(Duration::from_secs(1));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_reduced_motion_reveals_fully_with_no_partial_snapshots() {
        let mut engine = Engine::new(identity as fn(&str) -> Result<String, RenderError>);
        engine.set_motion_preference(ReducedMotion);
        let partials = Rc::new(Cell::new(0));
        let seen = partials.clone();
        engine.subscribe(move |snapshot: &Snapshot<String>| {
            if snapshot.progress < 1.0 {
                seen.set(seen.get() + 1);
            }
        });

        engine.feed("Hello **world**").unwrap();
        engine.finish();
        let snapshot = engine.snapshot();
        assert_eq!(revealed_text(&snapshot), "Hello **world**");
        assert_eq!(snapshot.phase, Phase::Settled);
        assert_eq!(partials.get(), 0, "subscribers observed a partial reveal");
    }

    #[test]
    fn test_pause_resume_without_catchup_burst() {
        let hidden = Arc::new(AtomicBool::new(false));
        let mut engine = Engine::with_config(
            identity as fn(&str) -> Result<String, RenderError>,
            EngineConfig {
                target_cps: 50.0,
                initial_buffer_chars: 0,
                ..EngineConfig::default()
            },
        );
        engine.set_visibility_oracle(SharedVisibility(hidden.clone()));
        engine.feed(&"ab ".repeat(40)).unwrap();

        engine.handle_tick(Duration::from_secs(1));
        let after_one_second = engine.revealed();
        assert!(
            (44..=50).contains(&after_one_second),
            "expected ~50 revealed, got {after_one_second}"
        );

        // Hidden: deltas are ignored entirely.
        hidden.store(true, Ordering::Relaxed);
        engine.handle_tick(Duration::from_secs(2));
        assert_eq!(engine.revealed(), after_one_second);

        hidden.store(false, Ordering::Relaxed);
        engine.handle_tick(Duration::from_secs(1));
        let after_resume = engine.revealed();
        assert!(
            (94..=100).contains(&after_resume),
            "expected ~100 revealed after resume, got {after_resume}"
        );
    }

    #[test]
    fn test_buffering_phase_before_reservoir_fills() {
        let mut engine = Engine::with_config(
            identity as fn(&str) -> Result<String, RenderError>,
            EngineConfig {
                target_cps: 100.0,
                initial_buffer_chars: 50,
                ..EngineConfig::default()
            },
        );
        engine.feed("below threshold").unwrap();
        assert_eq!(engine.phase(), Phase::Buffering);
        engine.handle_tick(Duration::from_secs(1));
        assert_eq!(engine.revealed(), 0);
        assert!(!engine.snapshot().is_typing);

        engine.feed(&"now well past the reservoir size ".repeat(2)).unwrap();
        engine.handle_tick(Duration::from_millis(100));
        assert_eq!(engine.phase(), Phase::Streaming);
        assert!(engine.revealed() > 0);
        assert!(engine.snapshot().is_typing);
    }

    #[test]
    fn test_render_error_degrades_span_to_raw() {
        fn failing(text: &str) -> Result<String, RenderError> {
            if text.contains("boom") {
                Err(RenderError::new("parse exploded"))
            } else {
                Ok(text.to_string())
            }
        }
        let mut engine = Engine::with_config(
            failing as fn(&str) -> Result<String, RenderError>,
            EngineConfig {
                target_cps: 1000.0,
                initial_buffer_chars: 0,
                ..EngineConfig::default()
            },
        );
        let errors = Rc::new(Cell::new(0));
        let seen = errors.clone();
        engine.set_render_error_handler(move |_| seen.set(seen.get() + 1));

        engine.feed("fine text boom").unwrap();
        engine.handle_tick(Duration::from_secs(1));
        let snapshot = engine.snapshot();
        assert_eq!(
            snapshot.streaming,
            RenderedNode::Raw("fine text boom".to_string())
        );
        assert!(errors.get() >= 1);
    }

    #[test]
    fn test_progress_of_empty_source_is_zero() {
        let engine = fast_engine();
        let snapshot = engine.snapshot();
        assert!(snapshot.progress.abs() < f64::EPSILON);
        assert_eq!(snapshot.phase, Phase::Idle);
    }

    #[test]
    fn test_reset_returns_to_idle_and_allows_new_stream() {
        let mut engine = fast_engine();
        engine.feed("First message.").unwrap();
        engine.finish();
        engine.handle_tick(Duration::from_secs(10));
        engine.reset();
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.revealed(), 0);
        engine.feed("Second message.").unwrap();
        engine.handle_tick(Duration::from_secs(1));
        assert!(engine.revealed() > 0);
    }
}
