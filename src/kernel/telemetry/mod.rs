//! Session telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (Stabilizer, Mapper, Navigator).
//!
//! # PRIVACY INVARIANT
//! Events carry no scanned text and no transcripts. Only actions, kinds,
//! tokens, indices and counts.

pub mod event;
pub mod metrics;
pub mod recorder;
