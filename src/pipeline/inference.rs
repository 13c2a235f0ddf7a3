//! Remote question answering: one (question, context) pair per call.
//!
//! The request is `{"inputs": {"question": ..., "context": ...}}`, POSTed to
//! the configured endpoint with an optional bearer token.
//!
//! ## Retry Strategy
//!
//! Hosted inference endpoints answer `503` while the model is being loaded
//! and `429` when the caller is rate limited. Both are transient, as is a
//! request timeout. Each transient condition has its own fixed wait
//! (20 s / 10 s / 5 s by default) and all of them share one attempt budget
//! (3 sends by default). Any other failure ends the call immediately.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Idle ──▶ Sent ──▶ Success
//!           │  ▲
//!           ▼  │
//!      WaitingRetry ──▶ Failed   (budget exhausted)
//!           Sent ───────▶ Failed (rejected / transport / decode)
//! ```
//!
//! [`RetryPolicy::next_state`] is the pure transition function; the I/O
//! edges go through the [`Transport`] and [`Sleeper`] traits so the policy
//! can be exercised without a network or real delays.

use crate::config::FillConfig;
use crate::error::{FormFillError, InferenceError};
use crate::output::Answer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// HTTP status the endpoint uses while the model is still loading.
pub const STATUS_MODEL_LOADING: u16 = 503;

/// HTTP status the endpoint uses when the caller is rate limited.
pub const STATUS_RATE_LIMITED: u16 = 429;

/// Maximum number of body bytes kept in a [`InferenceError::Rejected`].
const MAX_ERROR_BODY: usize = 200;

// ── Wire format ──────────────────────────────────────────────────────────

/// Body of an inference request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPayload {
    pub inputs: QaInputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaInputs {
    pub question: String,
    pub context: String,
}

impl QaPayload {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            inputs: QaInputs {
                question: question.into(),
                context: context.into(),
            },
        }
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// A request that never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

// ── Seams ────────────────────────────────────────────────────────────────

/// Sends one payload to the inference endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: &QaPayload) -> Result<TransportResponse, TransportError>;
}

/// Waits between attempts and between questions.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpTransport {
    /// Build a client with the configured request timeout.
    pub fn new(config: &FillConfig) -> Result<Self, FormFillError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FormFillError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: &QaPayload) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(e.to_string())
    }
}

// ── State machine ────────────────────────────────────────────────────────

/// What one send produced, before the policy decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answered(String),
    ModelLoading,
    RateLimited,
    TimedOut,
    Rejected { status: u16, body: String },
    TransportFailed(String),
    Undecodable(String),
}

impl Outcome {
    /// Classify the result of a transport call.
    pub fn classify(result: Result<TransportResponse, TransportError>) -> Self {
        match result {
            Ok(resp) if (200..300).contains(&resp.status) => match parse_answer(&resp.body) {
                Ok(answer) => Outcome::Answered(answer),
                Err(detail) => Outcome::Undecodable(detail),
            },
            Ok(resp) if resp.status == STATUS_MODEL_LOADING => Outcome::ModelLoading,
            Ok(resp) if resp.status == STATUS_RATE_LIMITED => Outcome::RateLimited,
            Ok(resp) => Outcome::Rejected {
                status: resp.status,
                body: clip(&resp.body, MAX_ERROR_BODY),
            },
            Err(TransportError::Timeout) => Outcome::TimedOut,
            Err(TransportError::Other(detail)) => Outcome::TransportFailed(detail),
        }
    }
}

/// Which transient condition triggered a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientReason {
    ModelLoading,
    RateLimited,
    Timeout,
}

impl fmt::Display for TransientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransientReason::ModelLoading => write!(f, "model loading"),
            TransientReason::RateLimited => write!(f, "rate limited"),
            TransientReason::Timeout => write!(f, "request timed out"),
        }
    }
}

/// Progress of one inference call. `attempt` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Sent {
        attempt: u32,
    },
    WaitingRetry {
        attempt: u32,
        delay: Duration,
        reason: TransientReason,
    },
    Success(String),
    Failed(InferenceError),
}

/// Attempt budget and per-condition waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub model_loading_backoff: Duration,
    pub rate_limit_backoff: Duration,
    pub timeout_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FillConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            model_loading_backoff: config.model_loading_backoff,
            rate_limit_backoff: config.rate_limit_backoff,
            timeout_backoff: config.timeout_backoff,
        }
    }

    pub fn backoff_for(&self, reason: TransientReason) -> Duration {
        match reason {
            TransientReason::ModelLoading => self.model_loading_backoff,
            TransientReason::RateLimited => self.rate_limit_backoff,
            TransientReason::Timeout => self.timeout_backoff,
        }
    }

    /// Decide the state that follows attempt number `attempt`.
    pub fn next_state(&self, attempt: u32, outcome: Outcome) -> RetryState {
        match outcome {
            Outcome::Answered(answer) => {
                let answer = answer.trim();
                if answer.is_empty() {
                    RetryState::Failed(InferenceError::EmptyAnswer)
                } else {
                    RetryState::Success(answer.to_string())
                }
            }
            Outcome::ModelLoading => self.transient(attempt, TransientReason::ModelLoading),
            Outcome::RateLimited => self.transient(attempt, TransientReason::RateLimited),
            Outcome::TimedOut => self.transient(attempt, TransientReason::Timeout),
            Outcome::Rejected { status, body } => {
                RetryState::Failed(InferenceError::Rejected { status, body })
            }
            Outcome::TransportFailed(detail) => {
                RetryState::Failed(InferenceError::Transport(detail))
            }
            Outcome::Undecodable(detail) => RetryState::Failed(InferenceError::Decode(detail)),
        }
    }

    fn transient(&self, attempt: u32, reason: TransientReason) -> RetryState {
        if attempt < self.max_attempts {
            RetryState::WaitingRetry {
                attempt,
                delay: self.backoff_for(reason),
                reason,
            }
        } else {
            RetryState::Failed(InferenceError::RetriesExhausted {
                attempts: attempt,
                last: reason.to_string(),
            })
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// Question-answering client with bounded retries.
///
/// Cheap to clone; the transport and sleeper are shared.
#[derive(Clone)]
pub struct InferenceClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl InferenceClient {
    /// Client talking HTTP to `config.endpoint`, sleeping on the tokio timer.
    pub fn new(config: &FillConfig) -> Result<Self, FormFillError> {
        Ok(Self::with_parts(
            Arc::new(HttpTransport::new(config)?),
            Arc::new(TokioSleeper),
            RetryPolicy::from_config(config),
        ))
    }

    pub fn with_parts(
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The sleeper used for backoff; the answer pipeline reuses it for the
    /// pause between questions.
    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    /// Ask one question. Never returns an error: every failure becomes
    /// [`Answer::NotFound`].
    pub async fn answer(&self, question: &str, context: &str) -> Answer {
        let payload = QaPayload::new(question, context);
        let mut state = RetryState::Idle;

        loop {
            state = match state {
                RetryState::Idle => RetryState::Sent { attempt: 1 },
                RetryState::Sent { attempt } => {
                    debug!(
                        "Sending question ({} chars, context {} chars), attempt {}/{}",
                        question.len(),
                        context.len(),
                        attempt,
                        self.policy.max_attempts
                    );
                    let outcome = Outcome::classify(self.transport.send(&payload).await);
                    self.policy.next_state(attempt, outcome)
                }
                RetryState::WaitingRetry {
                    attempt,
                    delay,
                    reason,
                } => {
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, self.policy.max_attempts, reason, delay
                    );
                    self.sleeper.sleep(delay).await;
                    RetryState::Sent {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Success(answer) => return Answer::Found(answer),
                RetryState::Failed(err) => {
                    match &err {
                        InferenceError::EmptyAnswer => debug!("No answer for {:?}", question),
                        other => warn!("No answer for {:?}: {}", question, other),
                    }
                    return Answer::NotFound(err);
                }
            };
        }
    }
}

/// Pull the `answer` field out of a success body.
///
/// Accepts a single object or a list of objects (first element wins); a
/// missing field is an empty answer.
pub fn parse_answer(body: &str) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let object = match &value {
        serde_json::Value::Array(items) => items.first(),
        other => Some(other),
    };
    Ok(object
        .and_then(|o| o.get("answer"))
        .and_then(|a| a.as_str())
        .unwrap_or_default()
        .to_string())
}

fn clip(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}
