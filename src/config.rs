use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::kernel::navigator::{SentinelMode, SequenceKind, DEFAULT_BEGINNING_MESSAGE, DEFAULT_END_MESSAGE};
use crate::kernel::time::TICK_MS;

/// Tunables for one reading session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    /// Stabilizer window N. Observed values in the field: 20 and 100.
    pub window_size: usize,
    pub advance_pulse_ms: u64,
    pub sentinel: SentinelMode,
    pub initial_kind: SequenceKind,
    pub end_message: String,
    pub beginning_message: String,
    pub tick_ms: u64,
    pub event_capacity: usize,
    pub backend_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            advance_pulse_ms: 1500,
            sentinel: SentinelMode::Leading,
            initial_kind: SequenceKind::Words,
            end_message: DEFAULT_END_MESSAGE.to_string(),
            beginning_message: DEFAULT_BEGINNING_MESSAGE.to_string(),
            tick_ms: TICK_MS,
            event_capacity: 256,
            backend_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 2000,
        }
    }
}

impl ReactorConfig {
    /// Read a JSON file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ReactorConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(key: &str, message: &str) -> ConfigError {
            ConfigError::Invalid { key: key.to_string(), message: message.to_string() }
        }

        if self.window_size == 0 {
            return Err(invalid("window_size", "must be at least 1"));
        }
        if self.advance_pulse_ms == 0 {
            return Err(invalid("advance_pulse_ms", "must be at least 1"));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "must be at least 1"));
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "must be at least 1"));
        }
        if self.backend_url.trim().is_empty() {
            return Err(invalid("backend_url", "must not be empty"));
        }
        Ok(())
    }
}
