//! Animation clock: tick generation for the reveal loop.
//!
//! The engine itself is synchronous; something has to call
//! `Engine::handle_tick` at a steady cadence. [`Ticker`] is the standard
//! source: a dedicated thread delivering [`Tick`] events over a bounded
//! channel, built for `select!`-style host loops. Hosts with their own
//! frame clock (or none at all, under reduced motion) simply never spawn
//! it.

mod ticker;

pub use ticker::{Tick, Ticker};
