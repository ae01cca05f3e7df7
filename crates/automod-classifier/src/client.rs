//! Streaming classification client
//!
//! Sends each message to an OpenAI-compatible guard model with `stream: true`,
//! decodes the streamed body line by line, and parses the accumulated text
//! into a [`Verdict`].

use crate::classifier::Classifier;
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::parser::{RegexVerdictParser, VerdictParser};
use async_trait::async_trait;
use automod_core::{ChatMessage, Result, StreamDecoder, Verdict};
use futures::StreamExt;
use parking_lot::RwLock;
use serde::Serialize;
use std::time::Instant;
use tokio_util::codec::{AnyDelimiterCodec, FramedRead};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

/// Request body for a streamed chat completion
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Client for the remote classification model
#[derive(Debug)]
pub struct ClassificationClient {
    config: ClassifierConfig,
    session: RwLock<Option<reqwest::Client>>,
    decoder: StreamDecoder,
    parser: Box<dyn VerdictParser>,
}

impl ClassificationClient {
    /// Create a client and open its HTTP session
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        Self::with_parser(config, Box::new(RegexVerdictParser::new()?))
    }

    /// Create a client with a custom verdict parser
    pub fn with_parser(config: ClassifierConfig, parser: Box<dyn VerdictParser>) -> Result<Self> {
        let http = reqwest::Client::builder().build().map_err(|e| {
            automod_core::Error::config(format!("Failed to build HTTP client: {}", e))
        })?;

        if config.api_key().is_none() {
            warn!("No classification API key configured; every verdict will be Unknown");
        }

        Ok(Self {
            config,
            session: RwLock::new(Some(http)),
            decoder: StreamDecoder::new(),
            parser,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Whether the HTTP session is still open
    pub fn is_open(&self) -> bool {
        self.session.read().is_some()
    }

    fn http(&self) -> Option<reqwest::Client> {
        self.session.read().clone()
    }

    /// Release the HTTP session. Later calls classify as Unknown.
    pub fn close(&self) {
        if self.session.write().take().is_some() {
            debug!("Classification session closed");
        }
    }

    /// Run one classification exchange, surfacing every failure
    pub async fn request_verdict(&self, text: &str) -> std::result::Result<Verdict, ClassifyError> {
        let http = self
            .http()
            .ok_or(ClassifyError::Unavailable("no active session"))?;
        let api_key = self
            .config
            .api_key()
            .ok_or(ClassifyError::Unavailable("no API key configured"))?;

        let body = CompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage::user(text)],
            stream: true,
        };

        let response = http
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .timeout(self.config.timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        let lines = FramedRead::new(
            StreamReader::new(body),
            AnyDelimiterCodec::new(b"\n".to_vec(), Vec::new()),
        );
        let mut lines = std::pin::pin!(lines);

        let mut full_text = String::new();
        while let Some(line) = lines.next().await {
            let line = line?;
            for fragment in self.decoder.decode(&line) {
                full_text.push_str(&fragment);
            }
        }

        let full_text = full_text.trim();
        debug!(response = ?full_text, "Guard model response");

        let verdict = self.parser.parse(full_text);
        if !verdict.is_known() {
            debug!("Guard model response carried no safety marker");
        }

        Ok(verdict)
    }
}

#[async_trait]
impl Classifier for ClassificationClient {
    async fn classify(&self, text: &str) -> Verdict {
        let start = Instant::now();

        let verdict = match self.request_verdict(text).await {
            Ok(verdict) => verdict,
            Err(ClassifyError::Unavailable(reason)) => {
                debug!(%reason, "Skipping classification");
                Verdict::unknown()
            }
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.config.timeout_secs, "Classification request timed out");
                metrics::counter!("automod_classification_errors_total", "kind" => "timeout")
                    .increment(1);
                Verdict::unknown()
            }
            Err(ClassifyError::Status(status)) => {
                warn!(%status, "Classification service error");
                metrics::counter!("automod_classification_errors_total", "kind" => "status")
                    .increment(1);
                Verdict::unknown()
            }
            Err(e) => {
                warn!(error = %e, "Classification request failed");
                metrics::counter!("automod_classification_errors_total", "kind" => "transport")
                    .increment(1);
                Verdict::unknown()
            }
        };

        metrics::counter!("automod_classifications_total", "safety" => verdict.safety.as_str())
            .increment(1);
        metrics::histogram!("automod_classification_latency_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);

        verdict
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
