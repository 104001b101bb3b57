use crate::domain::model::{
    EmailAddress, PollPolicy, ServerEndpoint, DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_INTERVAL_SECS,
};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MAX_ATTEMPTS_LIMIT: u32 = 20;
pub const MAX_RETRY_INTERVAL_SECS: u64 = 300;

/// Everything one fetch run needs. Server URL and email have no defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    pub server_url: String,
    pub email: String,
    pub max_attempts: u32,
    pub retry_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub health_timeout_secs: u64,
    pub skip_health: bool,
}

impl FetchSettings {
    pub fn new(server_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            email: email.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_interval_secs: DEFAULT_RETRY_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            skip_health: false,
        }
    }

    pub fn endpoint(&self) -> Result<ServerEndpoint> {
        ServerEndpoint::parse(&self.server_url)
    }

    pub fn email_address(&self) -> Result<EmailAddress> {
        EmailAddress::new(self.email.clone())
    }

    pub fn poll_policy(&self) -> Result<PollPolicy> {
        PollPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.retry_interval_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

impl Validate for FetchSettings {
    fn validate(&self) -> Result<()> {
        validate_url("server_url", self.server_url.trim().trim_end_matches('/'))?;
        validate_non_empty_string("email", &self.email)?;
        validate_range("max_attempts", self.max_attempts, 1, MAX_ATTEMPTS_LIMIT)?;
        validate_range(
            "retry_interval_secs",
            self.retry_interval_secs,
            0,
            MAX_RETRY_INTERVAL_SECS,
        )?;
        validate_positive_number("request_timeout_secs", self.request_timeout_secs, 1)?;
        validate_positive_number("health_timeout_secs", self.health_timeout_secs, 1)?;
        Ok(())
    }
}
