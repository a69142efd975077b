use super::navigator::{LoadToken, SequenceKind};
use super::time::Millis;
use crate::error::FetchError;

/// One classified frame from the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignal {
    pub label: String,
    pub at: Millis,
}

impl RawSignal {
    pub fn new(label: &str, at: Millis) -> Self {
        Self { label: label.to_string(), at }
    }
}

/// Everything the kernel reacts to.
#[derive(Debug, Clone)]
pub enum Event {
    /// Per-frame gesture label. Goes through the Stabilizer.
    Frame(RawSignal),
    /// Speech transcript fragment. Already discrete; bypasses the Stabilizer.
    Utterance(String),
    /// Out-of-band command key (remote trigger, console).
    Command(String),
    /// Preferred kind changed (words/sentences toggle). Does not fetch.
    SetKind(SequenceKind),
    /// Async result of a `SideEffect::FetchSequence`.
    SequenceFetched {
        token: LoadToken,
        kind: SequenceKind,
        result: Result<Vec<String>, FetchError>,
    },
}

impl Event {
    pub fn frame(label: &str, at: Millis) -> Self {
        Event::Frame(RawSignal::new(label, at))
    }

    pub fn utterance(text: &str) -> Self {
        Event::Utterance(text.to_string())
    }

    pub fn command(key: &str) -> Self {
        Event::Command(key.to_string())
    }
}
