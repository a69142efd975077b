//! Stabilized gesture labels, voice keywords and out-of-band command keys all
//! resolve to the same closed [`Action`] set here. The tables are total:
//! anything unknown is `NoOp`, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::navigator::SequenceKind;

/// Which sequence a load should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadTarget {
    /// Whatever kind the navigator currently prefers.
    Current,
    Kind(SequenceKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Advance,
    Retreat,
    RepeatCurrent,
    LoadSequence(LoadTarget),
    Capture,
    /// Interrupt speech and cancel any running pulse.
    Stop,
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatPolicy {
    /// Once per stabilization edge.
    OneShot,
    /// Immediately, then every `interval_ms` while the same stable label holds.
    Pulsed { interval_ms: u64 },
}

/// Input modality an action arrived through. Informational only: the
/// navigator never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Gesture,
    Voice,
    Command,
    Pulse,
}

/// Gestures the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    OpenPalm,
    ClosedFist,
    Victory,
    PointingUp,
    PointingLeft,
    OShape,
    NoGesture,
}

impl Gesture {
    /// Accepts both classifier spelling (`Open_Palm`, `No Gesture`) and
    /// kebab spelling (`open-palm`). `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "open-palm" => Some(Gesture::OpenPalm),
            "closed-fist" => Some(Gesture::ClosedFist),
            "victory" => Some(Gesture::Victory),
            "pointing-up" => Some(Gesture::PointingUp),
            "pointing-left" => Some(Gesture::PointingLeft),
            "o" | "o-shape" => Some(Gesture::OShape),
            "no-gesture" | "none" | "" => Some(Gesture::NoGesture),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::OpenPalm => "open-palm",
            Gesture::ClosedFist => "closed-fist",
            Gesture::Victory => "victory",
            Gesture::PointingUp => "pointing-up",
            Gesture::PointingLeft => "pointing-left",
            Gesture::OShape => "o-shape",
            Gesture::NoGesture => "no-gesture",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static label → action tables.
#[derive(Debug, Clone)]
pub struct CommandMapper {
    advance_pulse_ms: u64,
}

impl CommandMapper {
    pub fn new(advance_pulse_ms: u64) -> Self {
        Self { advance_pulse_ms: advance_pulse_ms.max(1) }
    }

    /// Gesture path. Only `pointing-up` pulses.
    pub fn map_gesture(&self, label: &str) -> (Action, RepeatPolicy) {
        let Some(gesture) = Gesture::parse(label) else {
            return (Action::NoOp, RepeatPolicy::OneShot);
        };

        match gesture {
            Gesture::OpenPalm => (Action::LoadSequence(LoadTarget::Current), RepeatPolicy::OneShot),
            Gesture::ClosedFist => (Action::Stop, RepeatPolicy::OneShot),
            Gesture::Victory => (Action::Capture, RepeatPolicy::OneShot),
            Gesture::PointingUp => (
                Action::Advance,
                RepeatPolicy::Pulsed { interval_ms: self.advance_pulse_ms },
            ),
            Gesture::PointingLeft => (Action::Retreat, RepeatPolicy::OneShot),
            Gesture::OShape => (Action::RepeatCurrent, RepeatPolicy::OneShot),
            Gesture::NoGesture => (Action::NoOp, RepeatPolicy::OneShot),
        }
    }

    /// Voice path. Utterances are discrete, so always OneShot.
    pub fn map_voice(&self, word: &str) -> Action {
        match last_word(word).as_str() {
            "play" | "next" | "tab" => Action::Advance,
            "back" | "previous" => Action::Retreat,
            "repeat" | "again" => Action::RepeatCurrent,
            "stop" => Action::Stop,
            "capture" => Action::Capture,
            "read" | "load" => Action::LoadSequence(LoadTarget::Current),
            "words" => Action::LoadSequence(LoadTarget::Kind(SequenceKind::Words)),
            "sentences" | "summarize" => Action::LoadSequence(LoadTarget::Kind(SequenceKind::Sentences)),
            _ => Action::NoOp,
        }
    }

    /// Out-of-band command key: either a gesture table key or a voice keyword.
    /// Always OneShot, even for the key that pulses on the gesture path.
    pub fn map_command(&self, key: &str) -> Action {
        if let Some(gesture) = Gesture::parse(key) {
            return self.map_gesture(gesture.as_str()).0;
        }
        self.map_voice(key)
    }
}

/// Final whitespace-separated token, lowercased, surrounding punctuation removed.
pub fn last_word(transcript: &str) -> String {
    transcript
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
