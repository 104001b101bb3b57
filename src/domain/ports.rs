use crate::domain::model::{EmailAddress, PollOutcome};
use async_trait::async_trait;
use std::time::Duration;

/// One request against the code endpoint. Implementations never fail; every
/// fault is folded into the returned outcome.
#[async_trait]
pub trait CodeApi: Send + Sync {
    async fn request_code(&self, email: &EmailAddress) -> PollOutcome;
}

/// Wait between poll attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
