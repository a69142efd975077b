use serde::{Deserialize, Serialize};

use crate::kernel::mapper::{Action, Channel, Gesture};
use crate::kernel::navigator::{AnnouncementKind, LoadToken, SequenceKind};
use crate::kernel::time::Tick;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    /// `gesture` is `None` for labels outside the gesture table.
    StableCommand {
        gesture: Option<Gesture>,
        tick: Tick,
    },

    ActionDispatched {
        action: Action,
        channel: Channel,
    },

    Announced {
        kind: AnnouncementKind,
        silent: bool,
    },

    Load(LoadEvent),

    Pulse(PulseEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadEvent {
    Requested { token: LoadToken, kind: SequenceKind },
    Applied { token: LoadToken, preserved: bool },
    Stale { token: LoadToken },
    Failed { token: LoadToken },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulseEvent {
    Started,
    Fired,
    Cancelled,
}
