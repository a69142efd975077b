use std::collections::VecDeque;
use tracing::debug;

use super::time::Millis;

/// A label that held for a full window and differs from the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableCommand<L> {
    pub label: L,
    pub at: Millis,
}

/// Edge-triggered debouncer over a noisy per-frame label stream.
///
/// Emits only when the last `capacity` observations are identical **and** the
/// label differs from the last emission. A held gesture therefore fires once;
/// a single misclassified frame delays the edge but never produces one.
///
/// The "nothing recognized" label is an ordinary label here. Settling into it
/// is a legitimate stable state that the mapper turns into a NoOp.
#[derive(Debug, Clone)]
pub struct Stabilizer<L> {
    capacity: usize,
    window: VecDeque<L>,
    // Length of the trailing run of identical labels, capped at capacity.
    // Replaces a full-window rescan per frame.
    run_len: usize,
    observed: u64,
    last_emitted: Option<L>,
}

impl<L: Clone + PartialEq + std::fmt::Debug> Stabilizer<L> {
    /// `capacity` of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            window: VecDeque::with_capacity(capacity),
            run_len: 0,
            observed: 0,
            last_emitted: None,
        }
    }

    pub fn observe(&mut self, label: L, at: Millis) -> Option<StableCommand<L>> {
        // 1. Track the trailing run before the buffer moves
        match self.window.back() {
            Some(prev) if *prev == label => {
                self.run_len = (self.run_len + 1).min(self.capacity);
            }
            _ => self.run_len = 1,
        }

        // 2. FIFO eviction
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(label);
        self.observed += 1;

        // 3. Settled + edge
        if !self.is_settled() {
            return None;
        }

        let label = self.window.back()?;
        if self.last_emitted.as_ref() == Some(label) {
            return None;
        }

        debug!("Stabilized on {:?} after {} frames", label, self.observed);
        self.last_emitted = Some(label.clone());
        Some(StableCommand { label: label.clone(), at })
    }

    /// Full window, all entries equal.
    pub fn is_settled(&self) -> bool {
        self.observed >= self.capacity as u64 && self.run_len >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window(&self) -> &VecDeque<L> {
        &self.window
    }

    pub fn last_emitted(&self) -> Option<&L> {
        self.last_emitted.as_ref()
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }
}
