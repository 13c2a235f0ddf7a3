//! Configuration types for a form fill.
//!
//! Every knob of the pipeline lives in [`FillConfig`], built via its
//! [`FillConfigBuilder`]. The defaults are the reference constants: a 30 s
//! request timeout, three attempts, 20 s / 10 s / 5 s backoffs for model
//! loading / rate limiting / timeouts, a 4000-character context budget and a
//! one second pause between questions.
//!
//! Nothing here is read from globals. The only environment lookup is
//! [`FillConfig::from_env`], which reads the endpoint credential.

use crate::error::FormFillError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the bearer token for the inference endpoint.
pub const API_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Default question-answering endpoint (Hugging Face hosted inference).
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/deepset/roberta-base-squad2";

/// Answer recorded for a question the endpoint could not answer.
pub const DEFAULT_PLACEHOLDER: &str = "No answer found";

/// Configuration for one form fill.
///
/// Built via [`FillConfig::builder()`] or using [`FillConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_form_filler::FillConfig;
/// use std::time::Duration;
///
/// let config = FillConfig::builder()
///     .api_token("hf_xxx")
///     .max_attempts(5)
///     .inter_request_delay(Duration::from_millis(250))
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 5);
/// ```
#[derive(Clone)]
pub struct FillConfig {
    /// URL the `{"inputs": {...}}` payload is POSTed to.
    pub endpoint: String,

    /// Bearer token. `None` sends the request without an `Authorization` header.
    pub api_token: Option<String>,

    /// Per-request timeout. Default: 30 s.
    pub request_timeout: Duration,

    /// Total number of sends per question, first attempt included. Default: 3.
    pub max_attempts: u32,

    /// Wait after a "model loading" (503) response. Default: 20 s.
    pub model_loading_backoff: Duration,

    /// Wait after a "rate limited" (429) response. Default: 10 s.
    pub rate_limit_backoff: Duration,

    /// Wait after a request timeout. Default: 5 s.
    pub timeout_backoff: Duration,

    /// Context budget in characters. Default: 4000.
    pub max_context_chars: usize,

    /// Appended to the context when it was cut. Default: `"..."`.
    pub truncation_marker: String,

    /// Below this many trimmed characters the data document is rejected. Default: 10.
    pub min_context_chars: usize,

    /// Pause between two consecutive inference calls. Default: 1 s.
    pub inter_request_delay: Duration,

    /// A question line must be strictly longer than this once trimmed. Default: 3,
    /// so a short prompt like `Age?` still counts.
    pub min_question_len: usize,

    /// Answer text used when no answer was found. Default: [`DEFAULT_PLACEHOLDER`].
    pub placeholder_answer: String,

    /// Page geometry and wrapping for the rendered answers document.
    pub layout: LayoutConfig,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            model_loading_backoff: Duration::from_secs(20),
            rate_limit_backoff: Duration::from_secs(10),
            timeout_backoff: Duration::from_secs(5),
            max_context_chars: 4000,
            truncation_marker: "...".to_string(),
            min_context_chars: 10,
            inter_request_delay: Duration::from_secs(1),
            min_question_len: 3,
            placeholder_answer: DEFAULT_PLACEHOLDER.to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl fmt::Debug for FillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("model_loading_backoff", &self.model_loading_backoff)
            .field("rate_limit_backoff", &self.rate_limit_backoff)
            .field("timeout_backoff", &self.timeout_backoff)
            .field("max_context_chars", &self.max_context_chars)
            .field("min_context_chars", &self.min_context_chars)
            .field("inter_request_delay", &self.inter_request_delay)
            .field("min_question_len", &self.min_question_len)
            .field("layout", &self.layout)
            .finish()
    }
}

impl FillConfig {
    /// Create a new builder for `FillConfig`.
    pub fn builder() -> FillConfigBuilder {
        FillConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default configuration with the credential taken from [`API_TOKEN_ENV`].
    ///
    /// An unset or empty variable leaves `api_token` as `None`.
    pub fn from_env() -> Self {
        Self {
            api_token: token_from_env(),
            ..Self::default()
        }
    }
}

fn token_from_env() -> Option<String> {
    std::env::var(API_TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Builder for [`FillConfig`].
#[derive(Debug)]
pub struct FillConfigBuilder {
    config: FillConfig,
}

impl FillConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.config.api_token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn model_loading_backoff(mut self, d: Duration) -> Self {
        self.config.model_loading_backoff = d;
        self
    }

    pub fn rate_limit_backoff(mut self, d: Duration) -> Self {
        self.config.rate_limit_backoff = d;
        self
    }

    pub fn timeout_backoff(mut self, d: Duration) -> Self {
        self.config.timeout_backoff = d;
        self
    }

    pub fn max_context_chars(mut self, n: usize) -> Self {
        self.config.max_context_chars = n;
        self
    }

    pub fn truncation_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.truncation_marker = marker.into();
        self
    }

    pub fn min_context_chars(mut self, n: usize) -> Self {
        self.config.min_context_chars = n;
        self
    }

    pub fn inter_request_delay(mut self, d: Duration) -> Self {
        self.config.inter_request_delay = d;
        self
    }

    pub fn min_question_len(mut self, n: usize) -> Self {
        self.config.min_question_len = n;
        self
    }

    pub fn placeholder_answer(mut self, text: impl Into<String>) -> Self {
        self.config.placeholder_answer = text.into();
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    /// Set every backoff and the inter-request delay to zero.
    ///
    /// Meant for tests and local mock endpoints.
    pub fn without_delays(mut self) -> Self {
        self.config.model_loading_backoff = Duration::ZERO;
        self.config.rate_limit_backoff = Duration::ZERO;
        self.config.timeout_backoff = Duration::ZERO;
        self.config.inter_request_delay = Duration::ZERO;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FillConfig, FormFillError> {
        let c = &self.config;
        if c.endpoint.trim().is_empty() {
            return Err(FormFillError::InvalidConfig(
                "Endpoint URL must not be empty".into(),
            ));
        }
        if c.max_attempts == 0 {
            return Err(FormFillError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.max_context_chars == 0 {
            return Err(FormFillError::InvalidConfig(
                "max_context_chars must be ≥ 1".into(),
            ));
        }
        if c.request_timeout.is_zero() {
            return Err(FormFillError::InvalidConfig(
                "request_timeout must be greater than zero".into(),
            ));
        }
        c.layout.validate()?;
        Ok(self.config)
    }
}

// ── Layout ───────────────────────────────────────────────────────────────

/// Geometry of the rendered answers document, in PDF points.
///
/// Defaults describe a US-letter page with the question prefix drawn at
/// x = 30 and continuation / answer lines indented to x = 50.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    /// Distance from the top edge to the first baseline.
    pub top_margin: f32,
    /// A new page starts once the cursor drops below this height.
    pub bottom_margin: f32,
    /// Vertical advance per drawn line.
    pub line_height: f32,
    /// Extra vertical space after each question/answer pair.
    pub pair_gap: f32,
    /// x of the first line of each question.
    pub question_indent: f32,
    /// x of question continuation lines and of every answer line.
    pub answer_indent: f32,
    /// Maximum characters per drawn line.
    pub wrap_width: usize,
    pub font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            top_margin: 50.0,
            bottom_margin: 50.0,
            line_height: 15.0,
            pair_gap: 15.0,
            question_indent: 30.0,
            answer_indent: 50.0,
            wrap_width: 80,
            font_size: 10.0,
        }
    }
}

impl LayoutConfig {
    /// Maximum number of lines that fit on one page.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height - self.top_margin - self.bottom_margin;
        (usable / self.line_height).floor() as usize + 1
    }

    fn validate(&self) -> Result<(), FormFillError> {
        if self.wrap_width < 10 {
            return Err(FormFillError::InvalidConfig(format!(
                "wrap_width must be ≥ 10, got {}",
                self.wrap_width
            )));
        }
        if self.line_height <= 0.0 {
            return Err(FormFillError::InvalidConfig(
                "line_height must be positive".into(),
            ));
        }
        if self.top_margin + self.bottom_margin >= self.page_height {
            return Err(FormFillError::InvalidConfig(
                "margins leave no room on the page".into(),
            ));
        }
        Ok(())
    }
}
