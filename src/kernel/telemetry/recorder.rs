use std::collections::VecDeque;
use super::event::TelemetryEvent;
use super::metrics::{TelemetrySnapshot, compute_snapshot};

const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// One-line summary for the shutdown log.
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "stable={} actions(gesture={} voice={} command={} pulse={}) announced={} loads(applied={} preserved={} stale={} failed={})",
            s.stable_commands,
            s.action_stats.gesture,
            s.action_stats.voice,
            s.action_stats.command,
            s.action_stats.pulse,
            s.announce_stats.units + s.announce_stats.end_of_text + s.announce_stats.beginning_of_text,
            s.load_stats.applied,
            s.load_stats.preserved,
            s.load_stats.stale,
            s.load_stats.failed,
        )
    }
}
