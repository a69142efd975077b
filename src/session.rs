//! Runtime driver around the pure [`Reactor`].
//!
//! The reactor never awaits. The session owns the cadence, stamps each step
//! with the session clock, runs side effects against the announcer and text
//! source, and feeds async results back in as events.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ReactorConfig;
use crate::error::{FetchError, SessionError};
use crate::kernel::event::Event;
use crate::kernel::navigator::{LoadToken, SequenceKind};
use crate::kernel::reactor::Reactor;
use crate::kernel::scheduler::SideEffect;
use crate::kernel::telemetry::metrics::TelemetrySnapshot;
use crate::kernel::time::SessionClock;
use crate::services::announcer::Announcer;
use crate::services::text_source::TextSource;

// Internal Driver Events (never reach the handle)
enum DriverEvent {
    Fetched {
        token: LoadToken,
        kind: SequenceKind,
        result: Result<Vec<String>, FetchError>,
    },
}

pub struct SessionBuilder {
    config: ReactorConfig,
    announcer: Option<Arc<dyn Announcer>>,
    text_source: Option<Arc<dyn TextSource>>,
}

impl SessionBuilder {
    pub fn new(config: ReactorConfig) -> Self {
        Self { config, announcer: None, text_source: None }
    }

    pub fn announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    pub fn text_source(mut self, source: Arc<dyn TextSource>) -> Self {
        self.text_source = Some(source);
        self
    }

    /// A missing announcer is a setup error, never a per-call failure.
    pub fn build(self) -> Result<(Session, SessionHandle), SessionError> {
        self.config.validate()?;
        let announcer = self.announcer.ok_or(SessionError::MissingAnnouncer)?;
        let text_source = self.text_source.ok_or(SessionError::MissingTextSource)?;

        let (tx, rx) = mpsc::channel(self.config.event_capacity);
        let (driver_tx, driver_rx) = mpsc::channel(self.config.event_capacity);
        let shutdown = CancellationToken::new();
        let clock = SessionClock::start();

        let session = Session {
            id: Uuid::new_v4(),
            reactor: Reactor::new(&self.config),
            config: self.config,
            receiver: rx,
            driver_tx,
            driver_rx,
            announcer,
            text_source,
            clock,
            shutdown: shutdown.clone(),
            fetch_tasks: HashMap::new(),
            capture_tasks: JoinSet::new(),
        };
        let handle = SessionHandle { tx, clock, shutdown };

        Ok((session, handle))
    }
}

/// Push interface for the external sources. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Event>,
    clock: SessionClock,
    shutdown: CancellationToken,
}

impl SessionHandle {
    /// Called at model inference cadence. Never blocks: when the queue is
    /// full the frame is dropped. Returns whether it was queued.
    pub fn notify_frame(&self, label: &str) -> bool {
        match self.tx.try_send(Event::frame(label, self.clock.now())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Event queue full, dropped frame '{}'", label);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub async fn notify_utterance(&self, transcript: &str) -> Result<(), SessionError> {
        self.send(Event::utterance(transcript)).await
    }

    pub async fn send_command(&self, key: &str) -> Result<(), SessionError> {
        self.send(Event::command(key)).await
    }

    pub async fn set_kind(&self, kind: SequenceKind) -> Result<(), SessionError> {
        self.send(Event::SetKind(kind)).await
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed() || self.shutdown.is_cancelled()
    }

    async fn send(&self, event: Event) -> Result<(), SessionError> {
        self.tx.send(event).await.map_err(|_| SessionError::Closed)
    }
}

pub struct Session {
    id: Uuid,
    config: ReactorConfig,
    reactor: Reactor,
    receiver: mpsc::Receiver<Event>,
    driver_tx: mpsc::Sender<DriverEvent>,
    driver_rx: mpsc::Receiver<DriverEvent>,
    announcer: Arc<dyn Announcer>,
    text_source: Arc<dyn TextSource>,
    clock: SessionClock,
    shutdown: CancellationToken,
    fetch_tasks: HashMap<LoadToken, JoinHandle<()>>,
    capture_tasks: JoinSet<()>,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    /// Drive the kernel until shutdown or until every handle is dropped.
    pub async fn run(mut self) -> TelemetrySnapshot {
        info!("Session {} started. Tick: {}ms", self.id, self.config.tick_ms);

        let mut cadence = tokio::time::interval(Duration::from_millis(self.config.tick_ms));
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = cadence.tick() => {}
            }

            // 1. Drain Driver Events (async results)
            let mut events = Vec::new();
            while let Ok(evt) = self.driver_rx.try_recv() {
                match evt {
                    DriverEvent::Fetched { token, kind, result } => {
                        self.fetch_tasks.remove(&token);
                        events.push(Event::SequenceFetched { token, kind, result });
                    }
                }
            }

            // Reap finished capture requests
            while self.capture_tasks.try_join_next().is_some() {}

            // 2. Drain Inputs
            let mut disconnected = false;
            loop {
                match self.receiver.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }

            // 3. Kernel Step
            let effects = self.reactor.tick_step(self.clock.now(), events);

            // 4. Side Effects
            for effect in effects {
                self.execute(effect);
            }

            if disconnected {
                info!("All session handles dropped");
                break;
            }
        }

        self.teardown()
    }

    fn execute(&mut self, effect: SideEffect) {
        match effect {
            SideEffect::Announce(announcement) => {
                // A failed announce is logged; pulses and navigation carry on
                if let Err(e) = self.announcer.announce(&announcement.text) {
                    warn!("Announce failed: {}", e);
                }
            }
            SideEffect::StopAnnouncing => self.announcer.stop(),
            SideEffect::FetchSequence { token, kind } => {
                let source = self.text_source.clone();
                let tx = self.driver_tx.clone();
                let timeout = Duration::from_millis(self.config.request_timeout_ms);

                let task = tokio::spawn(async move {
                    let result = match tokio::time::timeout(timeout, source.fetch_sequence(kind)).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::Network("request timed out".to_string())),
                    };
                    if let Err(e) = &result {
                        warn!("Fetch {:?} ({}) failed: {}", token, kind, e);
                    }
                    let _ = tx.send(DriverEvent::Fetched { token, kind, result }).await;
                });
                self.fetch_tasks.insert(token, task);
            }
            SideEffect::Capture => {
                let source = self.text_source.clone();
                self.capture_tasks.spawn(async move {
                    if let Err(e) = source.request_capture().await {
                        error!("Capture request failed: {}", e);
                    }
                });
            }
        }
    }

    fn teardown(mut self) -> TelemetrySnapshot {
        for (_, task) in self.fetch_tasks.drain() {
            task.abort();
        }
        self.capture_tasks.abort_all();
        self.announcer.stop();
        self.reactor.shutdown();
        info!("Session {} ended: {}", self.id, self.reactor.telemetry.summary());
        self.reactor.telemetry.snapshot()
    }
}
