//! Ticker: dedicated thread for generating timing events.
//!
//! Provides the regular "tick" signal that drives the reveal animation,
//! decoupled from the host's event loop. Ticks carry the delta since the
//! previous tick so the engine's rate math never depends on wall-clock
//! reads of its own.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// Time elapsed since the ticker was started, pauses excluded.
    pub elapsed: Duration,
    /// Time since the previous delivered tick, pauses excluded.
    pub delta: Duration,
}

/// Ticker that generates regular timing events on its own thread.
pub struct Ticker {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Flag to suspend tick delivery.
    paused: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl Ticker {
    /// Spawn a new ticker with the given interval.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between ticks (e.g., 16ms for ~60 FPS).
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let paused = Arc::new(AtomicBool::new(false));
        let paused_clone = paused.clone();

        // Bounded channel with small buffer - we don't want ticks to queue up
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("cadence-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, &paused_clone, interval);
            })
            .expect("Failed to spawn ticker thread");

        Self {
            handle: Some(handle),
            shutdown,
            paused,
            tick_rx,
        }
    }

    /// Get a reference to the tick receiver.
    ///
    /// Use this with `select!` for event-driven loops:
    ///
    /// ```ignore
    /// loop {
    ///     select! {
    ///         recv(chunks) -> chunk => engine.feed(&chunk?)?,
    ///         recv(ticker.receiver()) -> tick => {
    ///             engine.handle_tick(tick?.delta);
    ///         }
    ///     }
    /// }
    /// ```
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Suspend tick delivery (e.g., the view became hidden).
    ///
    /// State on the consumer side is untouched; ticks simply stop arriving.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Resume tick delivery after a pause.
    ///
    /// The first tick after resuming carries a delta measured from the
    /// resume point, so hidden time never turns into a catch-up burst.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    /// Check whether delivery is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Signal the ticker to shutdown. Safe to call more than once.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(
        tick_tx: &Sender<Tick>,
        shutdown: &Arc<AtomicBool>,
        paused: &Arc<AtomicBool>,
        interval: Duration,
    ) {
        let start = Instant::now();
        let mut frame = 0u64;
        let mut active = Duration::ZERO;
        let mut last = start;
        let mut next_tick = start + interval;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            if paused.load(Ordering::Relaxed) {
                thread::sleep(interval.min(Duration::from_millis(5)));
                // Rebase so the pause is excluded from the next delta.
                last = Instant::now();
                next_tick = last + interval;
                continue;
            }

            let now = Instant::now();
            if now >= next_tick {
                let delta = now - last;
                active += delta;
                let tick = Tick {
                    frame,
                    elapsed: active,
                    delta,
                };

                // Non-blocking send - if buffer is full, skip this tick
                // (receiver is too slow, prevent queue buildup)
                let _ = tick_tx.try_send(tick);

                frame += 1;
                last = now;
                next_tick += interval;

                // Handle case where we're behind (catch up without queuing)
                if next_tick < now {
                    next_tick = now + interval;
                }
            } else {
                // Sleep until next tick
                let sleep_duration = next_tick - now;
                thread::sleep(sleep_duration.min(Duration::from_millis(1)));
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
