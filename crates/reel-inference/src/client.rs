//! Inference service HTTP client and the shared busy/retry poll.

use std::time::Duration;

use reel_models::MediaRoot;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::{InferenceError, InferenceResult};
use crate::types::ServiceResponse;

/// Fixed pause between attempts while a service is busy.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Attempt ceiling for the heavier diarization and transcription jobs.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// One remote inference service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Short name used in logs, metrics and errors
    pub name: String,
    /// URL the job is POSTed to
    pub url: String,
    /// Attempt ceiling; `None` keeps retrying for as long as the service is busy
    pub max_attempts: Option<u32>,
}

impl ServiceEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>, max_attempts: Option<u32>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            max_attempts,
        }
    }

    fn from_env(
        name: &str,
        url_key: &str,
        default_url: &str,
        attempts_key: &str,
        default_attempts: Option<u32>,
    ) -> Self {
        let url = std::env::var(url_key).unwrap_or_else(|_| default_url.to_string());
        let max_attempts = match std::env::var(attempts_key) {
            Ok(raw) => parse_max_attempts(&raw).unwrap_or_else(|| {
                warn!(key = attempts_key, value = %raw, "Ignoring invalid attempt ceiling");
                default_attempts
            }),
            Err(_) => default_attempts,
        };
        Self::new(name, url, max_attempts)
    }
}

/// Parse an attempt ceiling.
///
/// `0`, `unbounded` and `none` mean no ceiling. Returns `None` when the value
/// is not understood.
pub fn parse_max_attempts(raw: &str) -> Option<Option<u32>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unbounded") || raw.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    match raw.parse::<u32>() {
        Ok(0) => Some(None),
        Ok(n) => Some(Some(n)),
        Err(_) => None,
    }
}

/// Configuration for the inference client.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Speech synthesis
    pub tts: ServiceEndpoint,
    /// Speaker diarization
    pub diarization: ServiceEndpoint,
    /// Subtitle transcription
    pub srt: ServiceEndpoint,
    /// Pause between busy attempts
    pub retry_delay: Duration,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Sent as `production` in every payload
    pub production: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            tts: ServiceEndpoint::new("tts", "http://localhost:5001/tts", None),
            diarization: ServiceEndpoint::new(
                "diarization",
                "http://localhost:5002/diarize",
                Some(DEFAULT_MAX_ATTEMPTS),
            ),
            srt: ServiceEndpoint::new("srt", "http://localhost:5003/srt", Some(DEFAULT_MAX_ATTEMPTS)),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            production: false,
        }
    }
}

impl InferenceConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tts: ServiceEndpoint::from_env(
                "tts",
                "TTS_SERVER_URL",
                &defaults.tts.url,
                "TTS_MAX_ATTEMPTS",
                defaults.tts.max_attempts,
            ),
            diarization: ServiceEndpoint::from_env(
                "diarization",
                "DIARIZATION_SERVER_URL",
                &defaults.diarization.url,
                "DIARIZATION_MAX_ATTEMPTS",
                defaults.diarization.max_attempts,
            ),
            srt: ServiceEndpoint::from_env(
                "srt",
                "SRT_SERVER_URL",
                &defaults.srt.url,
                "SRT_MAX_ATTEMPTS",
                defaults.srt.max_attempts,
            ),
            retry_delay: Duration::from_millis(
                std::env::var("INFERENCE_RETRY_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
            timeout: Duration::from_secs(
                std::env::var("INFERENCE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            production: std::env::var("REEL_ENV")
                .map(|env| env.trim() == "production")
                .unwrap_or(false),
        }
    }
}

/// Client for the speech, diarization and transcription services.
///
/// All three share one contract: POST a JSON job, and while the reply says
/// `{"status": "busy"}` wait a fixed delay and send it again. Any other status
/// ends the job.
pub struct InferenceClient {
    http: Client,
    config: InferenceConfig,
    root: MediaRoot,
}

impl InferenceClient {
    /// Create a new client. Service outputs are read from `root`.
    pub fn new(config: InferenceConfig, root: MediaRoot) -> InferenceResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(InferenceError::Network)?;

        Ok(Self { http, config, root })
    }

    /// Create from environment variables.
    pub fn from_env() -> InferenceResult<Self> {
        Self::new(InferenceConfig::from_env(), MediaRoot::from_env())
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn root(&self) -> &MediaRoot {
        &self.root
    }

    /// POST `body` as JSON to `endpoint` until the service stops reporting busy.
    pub async fn poll<B>(
        &self,
        endpoint: &ServiceEndpoint,
        job: &str,
        body: &B,
    ) -> InferenceResult<ServiceResponse>
    where
        B: Serialize + ?Sized,
    {
        self.poll_with(
            &endpoint.name,
            job,
            endpoint.max_attempts,
            || self.http.post(&endpoint.url).json(body),
            ServiceResponse::is_busy,
        )
        .await
    }

    /// Generic busy/retry loop.
    ///
    /// `build` produces a fresh request for every attempt and `is_busy` decides
    /// whether a parsed reply means "try again". A busy reply is honoured
    /// whatever its HTTP status; any other non-2xx reply fails immediately.
    /// After `max_attempts` busy replies the job fails with
    /// [`InferenceError::Exhausted`]. No delay follows the final attempt.
    pub async fn poll_with<F, P>(
        &self,
        service: &str,
        job: &str,
        max_attempts: Option<u32>,
        build: F,
        is_busy: P,
    ) -> InferenceResult<ServiceResponse>
    where
        F: Fn() -> RequestBuilder,
        P: Fn(&ServiceResponse) -> bool,
    {
        let span = info_span!("inference", service, job);

        async {
            let mut attempt: u32 = 0;
            loop {
                attempt += 1;
                metrics::counter!("reel_inference_attempts_total", "service" => service.to_string())
                    .increment(1);

                let (status, body) = self.send(build()).await?;
                match serde_json::from_str::<ServiceResponse>(&body) {
                    Ok(response) if is_busy(&response) => {}
                    Ok(response) if status.is_success() => {
                        debug!(attempt, path = ?response.path, "Inference job finished");
                        return Ok(response);
                    }
                    Err(e) if status.is_success() => {
                        return Err(InferenceError::InvalidResponse(format!("{}: {}", e, body)));
                    }
                    _ => {
                        return Err(InferenceError::RequestFailed(format!(
                            "{} service returned {}: {}",
                            service, status, body
                        )));
                    }
                }

                metrics::counter!("reel_inference_busy_total", "service" => service.to_string())
                    .increment(1);

                if let Some(max) = max_attempts {
                    if attempt >= max {
                        metrics::counter!("reel_inference_exhausted_total", "service" => service.to_string())
                            .increment(1);
                        return Err(InferenceError::Exhausted {
                            service: service.to_string(),
                            job: job.to_string(),
                            attempts: attempt,
                        });
                    }
                }

                warn!(
                    attempt,
                    max_attempts = ?max_attempts,
                    delay_ms = self.config.retry_delay.as_millis() as u64,
                    "{} service busy, retrying",
                    service
                );
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
        .instrument(span)
        .await
    }

    async fn send(&self, request: RequestBuilder) -> InferenceResult<(StatusCode, String)> {
        let response = request.send().await.map_err(|e| self.network_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.network_error(e))?;
        Ok((status, body))
    }

    fn network_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.config.timeout.as_secs())
        } else {
            InferenceError::Network(err)
        }
    }
}
