//! sightspeech - gesture and voice navigation over camera-scanned text.
//!
//! Per-frame gesture labels are debounced by the [`Stabilizer`], mapped to an
//! [`Action`], and executed against the [`Navigator`], whose announcements are
//! read aloud by an [`Announcer`]. Voice and command input skip the
//! stabilizer and share the same navigator.

pub mod config;
pub mod error;
pub mod kernel;
pub mod services;
pub mod session;

pub use config::ReactorConfig;
pub use error::{AnnounceError, ConfigError, FetchError, SessionError};
pub use kernel::mapper::{Action, CommandMapper, RepeatPolicy};
pub use kernel::navigator::{Navigator, SequenceKind, SentinelMode};
pub use kernel::reactor::Reactor;
pub use kernel::stabilizer::{StableCommand, Stabilizer};
pub use services::announcer::Announcer;
pub use services::text_source::TextSource;
pub use session::{Session, SessionBuilder, SessionHandle};
