//! Stale-response guard for overlapping fetches.
//!
//! When filters change faster than requests complete, a slow response for
//! an old filter must not overwrite the state for the new one. Each fetch
//! takes a ticket; only the holder of the latest ticket may apply its
//! result.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation counter for one piece of fetched state.
#[derive(Debug, Default)]
pub struct FetchGuard {
    generation: AtomicU64,
}

/// A ticket for one in-flight fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, invalidating every earlier ticket.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether a completed fetch is still the latest one and may apply its
    /// result.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }
}
