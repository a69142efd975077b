use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use super::mapper::LoadTarget;
use crate::error::FetchError;

pub const DEFAULT_END_MESSAGE: &str = "End of text";
pub const DEFAULT_BEGINNING_MESSAGE: &str = "Beginning of text";

/// Granularity of the navigable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    #[default]
    Words,
    Sentences,
}

impl SequenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Words => "words",
            SequenceKind::Sentences => "sentences",
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SequenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "words" | "word" => Ok(SequenceKind::Words),
            "sentences" | "sentence" => Ok(SequenceKind::Sentences),
            other => Err(format!("unknown sequence kind '{}'", other)),
        }
    }
}

/// Where blank "nothing to announce" units are placed around the fetched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelMode {
    None,
    #[default]
    Leading,
    LeadingAndTrailing,
}

/// Immutable ordered list of units. Replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    units: Vec<String>,
}

impl Sequence {
    pub fn from_units(units: Vec<String>, sentinel: SentinelMode) -> Self {
        let units = match sentinel {
            SentinelMode::None => units,
            SentinelMode::Leading => std::iter::once(String::new()).chain(units).collect(),
            SentinelMode::LeadingAndTrailing => std::iter::once(String::new())
                .chain(units)
                .chain(std::iter::once(String::new()))
                .collect(),
        };
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.units.get(index).map(String::as_str)
    }

    pub fn position(&self, unit: &str) -> Option<usize> {
        self.units.iter().position(|u| u == unit)
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorState {
    Empty,
    Ready { sequence: Sequence, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnouncementKind {
    Unit,
    EndOfText,
    BeginningOfText,
}

/// Text the announcer should speak. An empty `text` means "say nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub kind: AnnouncementKind,
}

impl Announcement {
    fn unit(text: &str) -> Self {
        Self { text: text.to_string(), kind: AnnouncementKind::Unit }
    }
}

/// Monotonic id of a load request. Only the latest one may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub kind: SequenceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied {
        index: usize,
        preserved: bool,
        announcement: Option<Announcement>,
    },
    /// A newer request was issued after this one; result dropped.
    Stale { token: LoadToken, latest: Option<LoadToken> },
    /// Fetch failed; state untouched.
    Failed(FetchError),
}

/// Navigable-list state machine over the currently loaded sequence.
///
/// `index` only moves through `advance`, `retreat` and `complete_load`.
/// Boundaries saturate and announce a fixed message instead of wrapping.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigatorState,
    kind: SequenceKind,
    sentinel: SentinelMode,
    end_message: String,
    beginning_message: String,
    next_token: u64,
    pending: Option<LoadToken>,
}

impl Navigator {
    pub fn new(kind: SequenceKind, sentinel: SentinelMode) -> Self {
        Self {
            state: NavigatorState::Empty,
            kind,
            sentinel,
            end_message: DEFAULT_END_MESSAGE.to_string(),
            beginning_message: DEFAULT_BEGINNING_MESSAGE.to_string(),
            next_token: 0,
            pending: None,
        }
    }

    pub fn with_messages(mut self, end: impl Into<String>, beginning: impl Into<String>) -> Self {
        self.end_message = end.into();
        self.beginning_message = beginning.into();
        self
    }

    pub fn advance(&mut self) -> Option<Announcement> {
        let end_message = &self.end_message;
        let NavigatorState::Ready { sequence, index } = &mut self.state else {
            return None;
        };
        if sequence.is_empty() {
            return None;
        }

        if *index + 1 < sequence.len() {
            *index += 1;
            sequence.get(*index).map(Announcement::unit)
        } else {
            Some(Announcement { text: end_message.clone(), kind: AnnouncementKind::EndOfText })
        }
    }

    pub fn retreat(&mut self) -> Option<Announcement> {
        let beginning_message = &self.beginning_message;
        let NavigatorState::Ready { sequence, index } = &mut self.state else {
            return None;
        };
        if sequence.is_empty() {
            return None;
        }

        if *index > 0 {
            *index -= 1;
            sequence.get(*index).map(Announcement::unit)
        } else {
            Some(Announcement {
                text: beginning_message.clone(),
                kind: AnnouncementKind::BeginningOfText,
            })
        }
    }

    pub fn repeat_current(&self) -> Option<Announcement> {
        self.current().map(Announcement::unit)
    }

    /// Issue a new load. Supersedes every earlier outstanding request.
    pub fn begin_load(&mut self, target: LoadTarget) -> LoadRequest {
        let kind = match target {
            LoadTarget::Current => self.kind,
            LoadTarget::Kind(kind) => kind,
        };
        self.next_token += 1;
        let token = LoadToken(self.next_token);
        if let Some(prev) = self.pending.replace(token) {
            debug!("Load {:?} superseded by {:?}", prev, token);
        }
        info!("Load requested: {:?} ({})", token, kind);
        LoadRequest { token, kind }
    }

    /// Apply a fetch result. Anything but the latest request is discarded.
    pub fn complete_load(
        &mut self,
        token: LoadToken,
        kind: SequenceKind,
        result: Result<Vec<String>, FetchError>,
    ) -> LoadOutcome {
        if self.pending != Some(token) {
            info!("Discarded stale load {:?} (latest {:?})", token, self.pending);
            return LoadOutcome::Stale { token, latest: self.pending };
        }
        self.pending = None;

        let units = match result {
            Ok(units) => units,
            Err(e) => {
                warn!("Load {:?} failed: {}", token, e);
                return LoadOutcome::Failed(e);
            }
        };

        let sequence = Sequence::from_units(units, self.sentinel);
        let previous = self.current().map(str::to_string);
        let found = previous.as_deref().and_then(|unit| sequence.position(unit));
        let index = found.unwrap_or(0);
        let announcement = sequence.get(index).map(Announcement::unit);

        info!(
            "Load {:?} applied: {} units of {}, index {} (preserved: {})",
            token,
            sequence.len(),
            kind,
            index,
            found.is_some()
        );

        self.kind = kind;
        self.state = NavigatorState::Ready { sequence, index };

        LoadOutcome::Applied { index, preserved: found.is_some(), announcement }
    }

    pub fn set_kind(&mut self, kind: SequenceKind) {
        self.kind = kind;
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, NavigatorState::Ready { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match &self.state {
            NavigatorState::Ready { sequence, index } if !sequence.is_empty() => Some(*index),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        match &self.state {
            NavigatorState::Ready { sequence, index } => sequence.get(*index),
            NavigatorState::Empty => None,
        }
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        match &self.state {
            NavigatorState::Ready { sequence, .. } => Some(sequence),
            NavigatorState::Empty => None,
        }
    }

    pub fn pending_load(&self) -> Option<LoadToken> {
        self.pending
    }
}
