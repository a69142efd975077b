use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::kernel::navigator::SequenceKind;

/// Backend that supplies the scanned text.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_sequence(&self, kind: SequenceKind) -> Result<Vec<String>, FetchError>;

    /// Ask the backend to capture and scan a new frame.
    async fn request_capture(&self) -> Result<(), FetchError> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct SequencePayload {
    words: Vec<String>,
}

#[derive(Serialize)]
struct CommandRequest<'a> {
    key: &'a str,
}

/// JSON-over-HTTP text source.
///
/// `GET {base}/data/words` and `GET {base}/data/sentences` both answer with
/// `{"words": [...]}`; capture is `POST {base}/data {"key": "capture"}`.
#[derive(Clone)]
pub struct HttpTextSource {
    client: Client,
    base_url: String,
}

impl HttpTextSource {
    /// Fails only if the HTTP client cannot be built (TLS backend init).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, kind: SequenceKind) -> String {
        format!("{}/data/{}", self.base_url, kind.as_str())
    }
}

#[async_trait]
impl TextSource for HttpTextSource {
    async fn fetch_sequence(&self, kind: SequenceKind) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(kind);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;
        check_status(response.status())?;

        let body = response.text().await?;
        parse_sequence(&body)
    }

    async fn request_capture(&self) -> Result<(), FetchError> {
        let response = self
            .client
            .post(format!("{}/data", self.base_url))
            .json(&CommandRequest { key: "capture" })
            .send()
            .await?;

        if let Err(e) = check_status(response.status()) {
            warn!("Capture request rejected: {}", response.status());
            return Err(e);
        }
        Ok(())
    }
}

/// Any non-2xx answer is a `Status` error carrying the code.
pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

/// Decode a `{"words": [...]}` body.
pub fn parse_sequence(body: &str) -> Result<Vec<String>, FetchError> {
    let payload: SequencePayload = serde_json::from_str(body)?;
    Ok(payload.words)
}

/// Fixed in-memory source for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTextSource {
    pub words: Vec<String>,
    pub sentences: Vec<String>,
}

impl StaticTextSource {
    pub fn new(words: &[&str], sentences: &[&str]) -> Self {
        Self {
            words: words.iter().map(|s| s.to_string()).collect(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl TextSource for StaticTextSource {
    async fn fetch_sequence(&self, kind: SequenceKind) -> Result<Vec<String>, FetchError> {
        Ok(match kind {
            SequenceKind::Words => self.words.clone(),
            SequenceKind::Sentences => self.sentences.clone(),
        })
    }
}
