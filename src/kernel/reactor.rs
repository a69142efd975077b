use tracing::{debug, info};

use super::event::Event;
use super::mapper::{Action, Channel, CommandMapper, Gesture, RepeatPolicy};
use super::navigator::{LoadOutcome, LoadToken, Navigator, SequenceKind};
use super::pulse::PulseTimer;
use super::scheduler::{Scheduler, SideEffect};
use super::stabilizer::{StableCommand, Stabilizer};
use super::telemetry::event::{LoadEvent, PulseEvent, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::{Millis, Tick};
use crate::config::ReactorConfig;
use crate::error::FetchError;

/// The pure core: Stabilizer → Mapper → Navigator, plus the pulse slot.
///
/// All reads and writes of the navigator's `(sequence, index)` pair happen
/// inside `tick_step` on `&mut self`, so no two actions interleave.
pub struct Reactor {
    pub stabilizer: Stabilizer<String>,
    pub mapper: CommandMapper,
    pub navigator: Navigator,
    pub pulse: PulseTimer,
    pub scheduler: Scheduler,
    pub telemetry: TelemetryRecorder,
    pub tick: Tick,
    pub now: Millis,
}

impl Reactor {
    pub fn new(config: &ReactorConfig) -> Self {
        Self {
            stabilizer: Stabilizer::new(config.window_size),
            mapper: CommandMapper::new(config.advance_pulse_ms),
            navigator: Navigator::new(config.initial_kind, config.sentinel)
                .with_messages(config.end_message.clone(), config.beginning_message.clone()),
            pulse: PulseTimer::new(),
            scheduler: Scheduler,
            telemetry: TelemetryRecorder::new(),
            tick: Tick::new(),
            now: Millis::ZERO,
        }
    }

    /// Pure Tick Step: consume events stamped up to `now`, return SideEffects
    /// for the driver. MUST NOT await I/O or timers.
    pub fn tick_step(&mut self, now: Millis, events: Vec<Event>) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        self.now = now.max(self.now);
        let mut effects = Vec::new();

        // === 1. INPUTS ===
        for event in events {
            match event {
                Event::Frame(signal) => {
                    if let Some(stable) = self.stabilizer.observe(signal.label, signal.at) {
                        self.on_stable(stable, &mut effects);
                    }
                }
                Event::Utterance(text) => {
                    let action = self.mapper.map_voice(&text);
                    self.dispatch(action, Channel::Voice, &mut effects);
                }
                Event::Command(key) => {
                    let action = self.mapper.map_command(&key);
                    self.dispatch(action, Channel::Command, &mut effects);
                }
                Event::SetKind(kind) => {
                    info!("Preferred kind set to {}", kind);
                    self.navigator.set_kind(kind);
                }
                Event::SequenceFetched { token, kind, result } => {
                    self.on_fetched(token, kind, result, &mut effects);
                }
            }
        }

        // === 2. PULSE ===
        // Runs after inputs so a stabilization change in this step wins.
        if let Some(action) = self.pulse.poll(self.now) {
            self.telemetry.record(TelemetryEvent::Pulse(PulseEvent::Fired));
            self.dispatch(action, Channel::Pulse, &mut effects);
        }

        effects
    }

    /// Tear down: no pulse survives the session.
    pub fn shutdown(&mut self) {
        if self.pulse.cancel().is_some() {
            self.telemetry.record(TelemetryEvent::Pulse(PulseEvent::Cancelled));
        }
        info!("Reactor shut down at {:?}: {}", self.tick, self.telemetry.summary());
    }

    fn on_stable(&mut self, stable: StableCommand<String>, effects: &mut Vec<SideEffect>) {
        let gesture = Gesture::parse(&stable.label);
        info!("Stable command '{}' at {}", stable.label, stable.at);
        self.telemetry.record(TelemetryEvent::StableCommand { gesture, tick: self.tick });

        // Any stable change ends the previous pulse, including "no gesture"
        if self.pulse.cancel().is_some() {
            self.telemetry.record(TelemetryEvent::Pulse(PulseEvent::Cancelled));
        }

        let (action, policy) = self.mapper.map_gesture(&stable.label);
        self.dispatch(action, Channel::Gesture, effects);

        if let RepeatPolicy::Pulsed { interval_ms } = policy {
            self.pulse.start(action, interval_ms, self.now);
            self.telemetry.record(TelemetryEvent::Pulse(PulseEvent::Started));
        }
    }

    fn dispatch(&mut self, action: Action, channel: Channel, effects: &mut Vec<SideEffect>) {
        if action == Action::NoOp {
            debug!("NoOp via {:?}", channel);
            return;
        }
        debug!("Dispatch {:?} via {:?}", action, channel);
        self.telemetry.record(TelemetryEvent::ActionDispatched { action, channel });

        if action == Action::Stop && self.pulse.cancel().is_some() {
            self.telemetry.record(TelemetryEvent::Pulse(PulseEvent::Cancelled));
        }

        if let Some(effect) = self.scheduler.schedule(action, &mut self.navigator) {
            self.record_effect(&effect);
            effects.push(effect);
        }
    }

    fn on_fetched(
        &mut self,
        token: LoadToken,
        kind: SequenceKind,
        result: Result<Vec<String>, FetchError>,
        effects: &mut Vec<SideEffect>,
    ) {
        match self.navigator.complete_load(token, kind, result) {
            LoadOutcome::Applied { preserved, announcement, .. } => {
                self.telemetry.record(TelemetryEvent::Load(LoadEvent::Applied { token, preserved }));
                if let Some(announcement) = announcement {
                    let effect = SideEffect::Announce(announcement);
                    self.record_effect(&effect);
                    effects.push(effect);
                }
            }
            LoadOutcome::Stale { .. } => {
                self.telemetry.record(TelemetryEvent::Load(LoadEvent::Stale { token }));
            }
            LoadOutcome::Failed(_) => {
                self.telemetry.record(TelemetryEvent::Load(LoadEvent::Failed { token }));
            }
        }
    }

    fn record_effect(&mut self, effect: &SideEffect) {
        match effect {
            SideEffect::Announce(a) => self.telemetry.record(TelemetryEvent::Announced {
                kind: a.kind,
                silent: a.text.is_empty(),
            }),
            SideEffect::FetchSequence { token, kind } => self
                .telemetry
                .record(TelemetryEvent::Load(LoadEvent::Requested { token: *token, kind: *kind })),
            SideEffect::StopAnnouncing | SideEffect::Capture => {}
        }
    }
}
