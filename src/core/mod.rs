pub mod fetcher;
pub mod health;
pub mod poller;

pub use crate::domain::model::{
    EmailAddress, PollAttempt, PollOutcome, PollPolicy, PollReport, ServerEndpoint,
    VerificationCode,
};
pub use crate::domain::ports::{CodeApi, Sleeper};
pub use crate::utils::error::Result;
