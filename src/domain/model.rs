use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Mailbox whose code is requested. Never inspected beyond being non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_non_empty_string("email", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base URL of the code relay service, stored without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    base: String,
}

impl ServerEndpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        let base = raw.trim().trim_end_matches('/');
        validate_url("server_url", base)?;
        Ok(Self {
            base: base.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub fn health_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}/health", self.base))?)
    }

    /// `{base}/get_code?email=...` with the address percent-encoded once.
    pub fn code_url(&self, email: &EmailAddress) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/get_code", self.base))?;
        url.query_pairs_mut().append_pair("email", email.as_str());
        // Form encoding writes spaces as '+' and a literal '+' as %2B, so every
        // remaining '+' is a space.
        let query = url.query().unwrap_or_default().replace('+', "%20");
        url.set_query(Some(&query));
        Ok(url)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// Opaque code returned by the service, passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a single `get_code` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PollOutcome {
    Success(VerificationCode),
    /// 200 response without a usable code.
    NotYet,
    TransportError(String),
    /// Non-200 status code.
    ProtocolError(u16),
    /// 200 response whose body is not a JSON object.
    MalformedBody(String),
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollAttempt {
    /// 1-based.
    pub index: u32,
    /// Wait that preceded this attempt; zero for the first one.
    pub waited: Duration,
    pub outcome: PollOutcome,
}

/// Every attempt made by one poll run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    attempts: Vec<PollAttempt>,
}

impl PollReport {
    pub fn new(attempts: Vec<PollAttempt>) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> &[PollAttempt] {
        &self.attempts
    }

    pub fn request_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.attempts
            .iter()
            .skip(1)
            .map(|attempt| attempt.waited)
            .collect()
    }

    pub fn code(&self) -> Option<&VerificationCode> {
        match self.attempts.last().map(|attempt| &attempt.outcome) {
            Some(PollOutcome::Success(code)) => Some(code),
            _ => None,
        }
    }

    pub fn into_code(self) -> Option<VerificationCode> {
        match self.attempts.into_iter().last().map(|attempt| attempt.outcome) {
            Some(PollOutcome::Success(code)) => Some(code),
            _ => None,
        }
    }
}

/// Retry budget for the code poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub base_interval: Duration,
    pub request_timeout: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, base_interval: Duration, request_timeout: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(FetchError::InvalidConfigValueError {
                field: "max_attempts".to_string(),
                value: max_attempts.to_string(),
                reason: "At least one attempt is required".to_string(),
            });
        }
        Ok(Self {
            max_attempts,
            base_interval,
            request_timeout,
        })
    }

    /// Linear backoff: `base_interval * attempt`, or `None` after the last attempt.
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if attempt < self.max_attempts {
            Some(self.base_interval.saturating_mul(attempt))
        } else {
            None
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
