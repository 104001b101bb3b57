use crate::adapters::{HttpCodeApi, TokioSleeper};
use crate::config::settings::FetchSettings;
use crate::core::health::HealthProber;
use crate::core::poller::CodePoller;
use crate::domain::model::{EmailAddress, VerificationCode};
use crate::domain::ports::{CodeApi, Sleeper};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(VerificationCode),
    Unhealthy,
    Exhausted,
}

impl FetchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchOutcome::Found(_) => 0,
            FetchOutcome::Unhealthy => 2,
            FetchOutcome::Exhausted => 3,
        }
    }
}

/// Health gate followed by the code poller. Without a prober the gate is skipped.
pub struct CodeFetcher<A: CodeApi = HttpCodeApi, S: Sleeper = TokioSleeper> {
    prober: Option<HealthProber>,
    poller: CodePoller<A, S>,
}

impl CodeFetcher {
    pub fn from_settings(settings: &FetchSettings) -> Result<Self> {
        let endpoint = settings.endpoint()?;
        let prober = if settings.skip_health {
            None
        } else {
            Some(HealthProber::new(&endpoint, settings.health_timeout())?)
        };
        let poller = CodePoller::http(endpoint, settings.poll_policy()?)?;
        Ok(Self::new(prober, poller))
    }
}

impl<A: CodeApi, S: Sleeper> CodeFetcher<A, S> {
    pub fn new(prober: Option<HealthProber>, poller: CodePoller<A, S>) -> Self {
        Self { prober, poller }
    }

    pub fn poller(&self) -> &CodePoller<A, S> {
        &self.poller
    }

    pub async fn run(&self, email: &EmailAddress) -> FetchOutcome {
        match &self.prober {
            Some(prober) => {
                if !prober.check().await {
                    tracing::error!("❌ Service health check failed, not polling for a code");
                    return FetchOutcome::Unhealthy;
                }
            }
            None => tracing::debug!("Health check skipped"),
        }

        let report = self.poller.poll(email).await;
        if let Ok(json) = serde_json::to_string(&report) {
            tracing::debug!("Poll report: {}", json);
        }

        match report.into_code() {
            Some(code) => FetchOutcome::Found(code),
            None => FetchOutcome::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(FetchOutcome::Found(VerificationCode::new("1")).exit_code(), 0);
        assert_eq!(FetchOutcome::Unhealthy.exit_code(), 2);
        assert_eq!(FetchOutcome::Exhausted.exit_code(), 3);
    }

    #[test]
    fn test_from_settings_skips_prober() {
        let mut settings = FetchSettings::new("http://svc:5362/", "abc123@example.com");
        settings.skip_health = true;
        let fetcher = CodeFetcher::from_settings(&settings).unwrap();
        assert!(fetcher.prober.is_none());
        assert_eq!(fetcher.poller().policy().max_attempts, 3);

        settings.skip_health = false;
        let fetcher = CodeFetcher::from_settings(&settings).unwrap();
        assert!(fetcher.prober.is_some());
    }

    #[test]
    fn test_from_settings_rejects_bad_url() {
        let settings = FetchSettings::new("not a url", "abc123@example.com");
        assert!(CodeFetcher::from_settings(&settings).is_err());
    }
}
