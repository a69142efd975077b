use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sightspeech::error::{AnnounceError, FetchError, SessionError};
use sightspeech::kernel::navigator::SequenceKind;
use sightspeech::services::announcer::Announcer;
use sightspeech::services::text_source::{StaticTextSource, TextSource};
use sightspeech::{ReactorConfig, SessionBuilder};

#[derive(Default)]
struct RecordingAnnouncer {
    spoken: Mutex<Vec<String>>,
    stops: Mutex<u32>,
    fail: bool,
}

impl RecordingAnnouncer {
    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) -> Result<(), AnnounceError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(AnnounceError::Spawn("speaker unplugged".into()));
        }
        Ok(())
    }

    fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
    }
}

struct FailingSource;

#[async_trait]
impl TextSource for FailingSource {
    async fn fetch_sequence(&self, _kind: SequenceKind) -> Result<Vec<String>, FetchError> {
        Err(FetchError::Network("connection refused".into()))
    }
}

/// Words are slow, sentences are fast.
struct SkewedSource;

#[async_trait]
impl TextSource for SkewedSource {
    async fn fetch_sequence(&self, kind: SequenceKind) -> Result<Vec<String>, FetchError> {
        match kind {
            SequenceKind::Words => {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok(vec!["slow".to_string()])
            }
            SequenceKind::Sentences => Ok(vec!["Fast sentence.".to_string()]),
        }
    }
}

/// Never answers within any sane timeout.
struct HungSource;

#[async_trait]
impl TextSource for HungSource {
    async fn fetch_sequence(&self, _kind: SequenceKind) -> Result<Vec<String>, FetchError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec!["late".to_string()])
    }
}

/// Counts capture requests; `started` on entry, `finished` after `delay`.
#[derive(Default)]
struct CaptureSource {
    started: AtomicU32,
    finished: AtomicU32,
    delay: Duration,
}

#[async_trait]
impl TextSource for CaptureSource {
    async fn fetch_sequence(&self, _kind: SequenceKind) -> Result<Vec<String>, FetchError> {
        Ok(Vec::new())
    }

    async fn request_capture(&self) -> Result<(), FetchError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..200 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for condition");
}

fn config() -> ReactorConfig {
    ReactorConfig {
        window_size: 3,
        advance_pulse_ms: 10_000,
        tick_ms: 5,
        ..ReactorConfig::default()
    }
}

async fn wait_for(announcer: &RecordingAnnouncer, count: usize) -> Vec<String> {
    for _ in 0..200 {
        let spoken = announcer.spoken();
        if spoken.len() >= count {
            return spoken;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {} announcements, got {:?}", count, announcer.spoken());
}

#[tokio::test]
async fn test_missing_announcer_is_a_setup_error() {
    let result = SessionBuilder::new(config())
        .text_source(Arc::new(StaticTextSource::default()))
        .build();
    assert!(matches!(result, Err(SessionError::MissingAnnouncer)));

    let result = SessionBuilder::new(config())
        .announcer(Arc::new(RecordingAnnouncer::default()))
        .build();
    assert!(matches!(result, Err(SessionError::MissingTextSource)));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let bad = ReactorConfig { window_size: 0, ..config() };
    let result = SessionBuilder::new(bad)
        .announcer(Arc::new(RecordingAnnouncer::default()))
        .text_source(Arc::new(StaticTextSource::default()))
        .build();
    assert!(matches!(result, Err(SessionError::Config(_))));
}

#[tokio::test]
async fn test_end_to_end_gesture_and_voice() {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let (session, handle) = SessionBuilder::new(config())
        .announcer(announcer.clone())
        .text_source(Arc::new(StaticTextSource::new(&["the", "cat"], &["The cat sat."])))
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.send_command("open-palm").await.unwrap();
    assert_eq!(wait_for(&announcer, 1).await, vec![""]);

    handle.notify_utterance("okay play").await.unwrap();
    assert_eq!(wait_for(&announcer, 2).await[1], "the");

    for _ in 0..3 {
        assert!(handle.notify_frame("Pointing_Up"));
    }
    assert_eq!(wait_for(&announcer, 3).await[2], "cat");

    handle.notify_utterance("play").await.unwrap();
    assert_eq!(wait_for(&announcer, 4).await[3], "End of text");

    handle.shutdown();
    let snapshot = runner.await.unwrap();
    assert_eq!(snapshot.stable_commands, 1);
    assert_eq!(snapshot.load_stats.applied, 1);
    assert_eq!(snapshot.announce_stats.end_of_text, 1);
    assert!(*announcer.stops.lock().unwrap() >= 1, "teardown stops speech");
}

#[tokio::test]
async fn test_fetch_failure_keeps_session_alive() {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let (session, handle) = SessionBuilder::new(config())
        .announcer(announcer.clone())
        .text_source(Arc::new(FailingSource))
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.send_command("open-palm").await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.notify_utterance("play").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(announcer.spoken().is_empty());
    assert!(!handle.is_closed());

    handle.shutdown();
    let snapshot = runner.await.unwrap();
    assert_eq!(snapshot.load_stats.failed, 1);
}

#[tokio::test]
async fn test_failed_announce_is_not_fatal() {
    let announcer = Arc::new(RecordingAnnouncer { fail: true, ..Default::default() });
    let (session, handle) = SessionBuilder::new(config())
        .announcer(announcer.clone())
        .text_source(Arc::new(StaticTextSource::new(&["a", "b"], &[])))
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.send_command("open-palm").await.unwrap();
    wait_for(&announcer, 1).await;
    handle.send_command("play").await.unwrap();
    handle.send_command("play").await.unwrap();
    assert_eq!(wait_for(&announcer, 3).await, vec!["", "a", "b"]);

    handle.shutdown();
    runner.await.unwrap();
}

#[tokio::test]
async fn test_superseded_load_does_not_resurrect() {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let (session, handle) = SessionBuilder::new(config())
        .announcer(announcer.clone())
        .text_source(Arc::new(SkewedSource))
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.notify_utterance("words").await.unwrap();
    handle.notify_utterance("sentences").await.unwrap();
    wait_for(&announcer, 1).await;

    // Let the slow words fetch land
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.notify_utterance("play").await.unwrap();
    assert_eq!(wait_for(&announcer, 2).await[1], "Fast sentence.");

    handle.shutdown();
    let snapshot = runner.await.unwrap();
    assert_eq!(snapshot.load_stats.applied, 1);
    assert_eq!(snapshot.load_stats.stale, 1);
}

#[tokio::test]
async fn test_frame_bursts_are_bounded() {
    let cfg = ReactorConfig { event_capacity: 8, ..config() };
    let (_session, handle) = SessionBuilder::new(cfg)
        .announcer(Arc::new(RecordingAnnouncer::default()))
        .text_source(Arc::new(StaticTextSource::default()))
        .build()
        .unwrap();

    // Session not running: nothing drains the queue
    let queued = (0..1000).filter(|_| handle.notify_frame("Pointing_Up")).count();
    assert_eq!(queued, 8);
}

#[tokio::test]
async fn test_dropping_all_handles_ends_session() {
    let (session, handle) = SessionBuilder::new(config())
        .announcer(Arc::new(RecordingAnnouncer::default()))
        .text_source(Arc::new(StaticTextSource::default()))
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());
    drop(handle);

    let result = tokio::time::timeout(Duration::from_secs(2), runner).await;
    assert!(result.is_ok(), "session should exit once its inputs are gone");
}

#[tokio::test]
async fn test_hung_fetch_times_out_as_failure() {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let cfg = ReactorConfig { request_timeout_ms: 50, ..config() };
    let (session, handle) = SessionBuilder::new(cfg)
        .announcer(announcer.clone())
        .text_source(Arc::new(HungSource))
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.send_command("open-palm").await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    handle.shutdown();
    let snapshot = runner.await.unwrap();
    assert_eq!(snapshot.load_stats.failed, 1);
    assert_eq!(snapshot.load_stats.applied, 0);
    assert!(announcer.spoken().is_empty());
}

#[tokio::test]
async fn test_capture_command_reaches_text_source() {
    let source = Arc::new(CaptureSource::default());
    let (session, handle) = SessionBuilder::new(config())
        .announcer(Arc::new(RecordingAnnouncer::default()))
        .text_source(source.clone())
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.send_command("victory").await.unwrap();
    wait_until(|| source.finished.load(Ordering::SeqCst) == 1).await;

    handle.notify_utterance("capture").await.unwrap();
    wait_until(|| source.finished.load(Ordering::SeqCst) == 2).await;

    handle.shutdown();
    runner.await.unwrap();
    assert_eq!(source.started.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_pending_capture_aborted_at_teardown() {
    let source = Arc::new(CaptureSource {
        delay: Duration::from_millis(300),
        ..Default::default()
    });
    let (session, handle) = SessionBuilder::new(config())
        .announcer(Arc::new(RecordingAnnouncer::default()))
        .text_source(source.clone())
        .build()
        .unwrap();
    let runner = tokio::spawn(session.run());

    handle.send_command("victory").await.unwrap();
    wait_until(|| source.started.load(Ordering::SeqCst) == 1).await;

    handle.shutdown();
    runner.await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(source.finished.load(Ordering::SeqCst), 0, "capture outlived the session");
}
