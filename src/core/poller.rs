use crate::adapters::{HttpCodeApi, TokioSleeper};
use crate::domain::model::{
    EmailAddress, PollAttempt, PollOutcome, PollPolicy, PollReport, ServerEndpoint,
    VerificationCode,
};
use crate::domain::ports::{CodeApi, Sleeper};
use crate::utils::error::Result;
use std::time::Duration;

/// Bounded retry loop over a [`CodeApi`], with linear backoff between attempts.
///
/// The loop never returns an error: transport and protocol faults only decide
/// whether to wait and try again. Exhausting the attempt budget yields an
/// empty result.
pub struct CodePoller<A: CodeApi = HttpCodeApi, S: Sleeper = TokioSleeper> {
    api: A,
    sleeper: S,
    policy: PollPolicy,
}

impl CodePoller {
    pub fn http(endpoint: ServerEndpoint, policy: PollPolicy) -> Result<Self> {
        let api = HttpCodeApi::new(endpoint, policy.request_timeout)?;
        Ok(Self::new(api, TokioSleeper, policy))
    }
}

impl<A: CodeApi, S: Sleeper> CodePoller<A, S> {
    pub fn new(api: A, sleeper: S, policy: PollPolicy) -> Self {
        Self {
            api,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    #[cfg(test)]
    fn api(&self) -> &A {
        &self.api
    }

    #[cfg(test)]
    fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub async fn fetch_code(&self, email: &EmailAddress) -> Option<VerificationCode> {
        self.poll(email).await.into_code()
    }

    /// Runs the full attempt sequence and keeps every outcome.
    pub async fn poll(&self, email: &EmailAddress) -> PollReport {
        let max_attempts = self.policy.max_attempts;
        tracing::info!("📨 Fetching verification code for {}", email);

        let mut attempts = Vec::with_capacity(max_attempts as usize);
        let mut waited = Duration::ZERO;

        for index in 1..=max_attempts {
            tracing::info!(
                "🔄 Attempt {}/{}: requesting verification code",
                index,
                max_attempts
            );
            let outcome = self.api.request_code(email).await;
            log_outcome(&outcome);

            let done = outcome.is_success();
            attempts.push(PollAttempt {
                index,
                waited,
                outcome,
            });
            if done {
                return PollReport::new(attempts);
            }

            if let Some(wait) = self.policy.backoff_after(index) {
                tracing::info!("⏳ Waiting {:?} before retrying", wait);
                self.sleeper.sleep(wait).await;
                waited = wait;
            }
        }

        tracing::warn!(
            "❌ Reached maximum attempts ({}), no verification code received",
            max_attempts
        );
        PollReport::new(attempts)
    }
}

fn log_outcome(outcome: &PollOutcome) {
    match outcome {
        PollOutcome::Success(code) => tracing::info!("✅ Received verification code: {}", code),
        PollOutcome::NotYet => tracing::info!("📭 No verification code yet"),
        PollOutcome::TransportError(detail) => tracing::warn!("⚠️ Request error: {}", detail),
        PollOutcome::ProtocolError(status) => {
            tracing::warn!("⚠️ Request failed with status code {}", status)
        }
        PollOutcome::MalformedBody(detail) => {
            tracing::warn!("⚠️ Unexpected response body: {}", detail)
        }
    }
}

/// One-call form over HTTP: default attempt budget and timeout, caller-chosen interval.
pub async fn fetch_code(
    endpoint: &ServerEndpoint,
    email: &EmailAddress,
    retry_interval: Duration,
) -> Option<VerificationCode> {
    let policy = PollPolicy {
        base_interval: retry_interval,
        ..PollPolicy::default()
    };
    match CodePoller::http(endpoint.clone(), policy) {
        Ok(poller) => poller.fetch_code(email).await,
        Err(e) => {
            tracing::error!("❌ Could not build code poller: {}", e);
            None
        }
    }
}
