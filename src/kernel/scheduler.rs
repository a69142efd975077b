use super::mapper::Action;
use super::navigator::{Announcement, LoadRequest, LoadToken, Navigator, SequenceKind};

pub struct Scheduler;

/// Work the driver performs on behalf of the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Announce(Announcement),
    StopAnnouncing,
    FetchSequence { token: LoadToken, kind: SequenceKind },
    Capture,
}

impl Scheduler {
    /// Projection: Action + Navigator -> SideEffect.
    /// Navigator mutation happens here and nowhere else for channel-sourced actions.
    pub fn schedule(&self, action: Action, navigator: &mut Navigator) -> Option<SideEffect> {
        match action {
            Action::Advance => navigator.advance().map(SideEffect::Announce),
            Action::Retreat => navigator.retreat().map(SideEffect::Announce),
            Action::RepeatCurrent => navigator.repeat_current().map(SideEffect::Announce),
            Action::LoadSequence(target) => {
                let LoadRequest { token, kind } = navigator.begin_load(target);
                Some(SideEffect::FetchSequence { token, kind })
            }
            Action::Capture => Some(SideEffect::Capture),
            Action::Stop => Some(SideEffect::StopAnnouncing),
            Action::NoOp => None,
        }
    }
}
