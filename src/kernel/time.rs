use serde::{Deserialize, Serialize};

/// Logical step counter. One tick per `Reactor::tick_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Tick {
    pub frame: u64,
}

/// Default driver cadence.
pub const TICK_MS: u64 = 20;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }
}

/// Session-relative wall time in milliseconds.
///
/// The kernel never reads a clock itself; the driver stamps every step with a
/// `Millis` and tests pass their own values (fake clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, ms: u64) -> Self {
        Millis(self.0.saturating_add(ms))
    }

    pub fn saturating_sub(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Monotonic session clock backed by `tokio::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: tokio::time::Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self { origin: tokio::time::Instant::now() }
    }

    pub fn now(&self) -> Millis {
        Millis(self.origin.elapsed().as_millis() as u64)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}
