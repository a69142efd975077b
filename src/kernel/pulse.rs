use tracing::debug;

use super::mapper::Action;
use super::time::Millis;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivePulse {
    action: Action,
    interval_ms: u64,
    next_due: Millis,
    fired: u64,
}

/// Single-slot repeating timer for pulsed actions.
///
/// At most one pulse exists. `start` replaces whatever was running, `cancel`
/// clears it, and the slot dies with its owner, so no timer outlives the
/// reactor. Deadlines are checked against the kernel clock in `poll`; missed
/// intervals are skipped, not replayed.
#[derive(Debug, Clone, Default)]
pub struct PulseTimer {
    active: Option<ActivePulse>,
}

impl PulseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a pulse. The immediate first firing is the caller's job; the first
    /// `poll` hit is one interval after `now`.
    pub fn start(&mut self, action: Action, interval_ms: u64, now: Millis) -> Option<Action> {
        let interval_ms = interval_ms.max(1);
        let replaced = self.active.take().map(|p| p.action);
        debug!("Pulse armed: {:?} every {}ms", action, interval_ms);
        self.active = Some(ActivePulse {
            action,
            interval_ms,
            next_due: now.saturating_add(interval_ms),
            fired: 0,
        });
        replaced
    }

    /// Returns the action that was running, if any.
    pub fn cancel(&mut self) -> Option<Action> {
        let cancelled = self.active.take();
        if let Some(p) = &cancelled {
            debug!("Pulse cancelled: {:?} after {} repeats", p.action, p.fired);
        }
        cancelled.map(|p| p.action)
    }

    /// Fires at most once per call.
    pub fn poll(&mut self, now: Millis) -> Option<Action> {
        let pulse = self.active.as_mut()?;
        if now < pulse.next_due {
            return None;
        }

        // Skip intervals we slept through
        while pulse.next_due <= now {
            pulse.next_due = pulse.next_due.saturating_add(pulse.interval_ms);
        }
        pulse.fired += 1;
        Some(pulse.action)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn action(&self) -> Option<Action> {
        self.active.as_ref().map(|p| p.action)
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.active.as_ref().map(|p| p.next_due)
    }
}
