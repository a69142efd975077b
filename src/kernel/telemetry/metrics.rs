use std::collections::VecDeque;
use super::event::{LoadEvent, PulseEvent, TelemetryEvent};
use crate::kernel::mapper::Channel;
use crate::kernel::navigator::AnnouncementKind;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub stable_commands: u64,
    pub unknown_gestures: u64,
    pub action_stats: ActionStats,
    pub announce_stats: AnnounceStats,
    pub load_stats: LoadStats,
    pub pulse_stats: PulseStats,
}

#[derive(Debug, Clone, Default)]
pub struct ActionStats {
    pub gesture: u64,
    pub voice: u64,
    pub command: u64,
    pub pulse: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AnnounceStats {
    pub units: u64,
    pub silent: u64,
    pub end_of_text: u64,
    pub beginning_of_text: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub requested: u64,
    pub applied: u64,
    pub preserved: u64,
    pub stale: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PulseStats {
    pub started: u64,
    pub fired: u64,
    pub cancelled: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::StableCommand { gesture, .. } => {
                snap.stable_commands += 1;
                if gesture.is_none() {
                    snap.unknown_gestures += 1;
                }
            }
            TelemetryEvent::ActionDispatched { channel, .. } => match channel {
                Channel::Gesture => snap.action_stats.gesture += 1,
                Channel::Voice => snap.action_stats.voice += 1,
                Channel::Command => snap.action_stats.command += 1,
                Channel::Pulse => snap.action_stats.pulse += 1,
            },
            TelemetryEvent::Announced { kind, silent } => {
                if *silent {
                    snap.announce_stats.silent += 1;
                }
                match kind {
                    AnnouncementKind::Unit => snap.announce_stats.units += 1,
                    AnnouncementKind::EndOfText => snap.announce_stats.end_of_text += 1,
                    AnnouncementKind::BeginningOfText => snap.announce_stats.beginning_of_text += 1,
                }
            }
            TelemetryEvent::Load(load) => match load {
                LoadEvent::Requested { .. } => snap.load_stats.requested += 1,
                LoadEvent::Applied { preserved, .. } => {
                    snap.load_stats.applied += 1;
                    if *preserved {
                        snap.load_stats.preserved += 1;
                    }
                }
                LoadEvent::Stale { .. } => snap.load_stats.stale += 1,
                LoadEvent::Failed { .. } => snap.load_stats.failed += 1,
            },
            TelemetryEvent::Pulse(pulse) => match pulse {
                PulseEvent::Started => snap.pulse_stats.started += 1,
                PulseEvent::Fired => snap.pulse_stats.fired += 1,
                PulseEvent::Cancelled => snap.pulse_stats.cancelled += 1,
            },
        }
    }

    snap
}
