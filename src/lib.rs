pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{FetchSettings, TomlConfig};

pub use adapters::{HttpCodeApi, TokioSleeper};
pub use core::{
    fetcher::{CodeFetcher, FetchOutcome},
    health::{check_health, HealthProber},
    poller::{fetch_code, CodePoller},
};
pub use domain::model::{
    EmailAddress, PollAttempt, PollOutcome, PollPolicy, PollReport, ServerEndpoint,
    VerificationCode,
};
pub use domain::ports::{CodeApi, Sleeper};
pub use utils::error::{FetchError, Result};
