use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::error::AnnounceError;

/// Speech output. A new announcement interrupts the previous one; empty text
/// means "say nothing" and only stops current speech.
pub trait Announcer: Send + Sync {
    fn announce(&self, text: &str) -> Result<(), AnnounceError>;

    fn stop(&self);
}

/// Speaks through the platform `say` command. Must be used inside a tokio runtime.
pub struct SayAnnouncer {
    program: String,
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl SayAnnouncer {
    pub fn new() -> Self {
        Self::with_program("say")
    }

    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            current: Mutex::new(None),
        }
    }

    fn interrupt(&self) {
        let stop_tx = match self.current.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(stop_tx) = stop_tx {
            let _ = stop_tx.send(());
        }
    }
}

impl Default for SayAnnouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Announcer for SayAnnouncer {
    fn announce(&self, text: &str) -> Result<(), AnnounceError> {
        self.interrupt();
        if text.is_empty() {
            return Ok(());
        }

        let mut child = tokio::process::Command::new(&self.program)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AnnounceError::Spawn(e.to_string()))?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        match self.current.lock() {
            Ok(mut guard) => *guard = Some(stop_tx),
            Err(poisoned) => *poisoned.into_inner() = Some(stop_tx),
        }

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        warn!("Speech process failed: {}", e);
                    }
                }
                _ = &mut stop_rx => { let _ = child.kill().await; }
            }
        });
        Ok(())
    }

    fn stop(&self) {
        self.interrupt();
    }
}

/// Headless announcer: writes announcements to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, text: &str) -> Result<(), AnnounceError> {
        if text.is_empty() {
            info!("[ANNOUNCE] (silence)");
        } else {
            info!("[ANNOUNCE] {}", text);
        }
        Ok(())
    }

    fn stop(&self) {
        info!("[ANNOUNCE] stop");
    }
}
