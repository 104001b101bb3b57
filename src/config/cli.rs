use crate::config::settings::FetchSettings;
use crate::config::toml_config::TomlConfig;
use crate::utils::error::{FetchError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "otp-fetch")]
#[command(about = "Fetch a one-time verification code for an email address")]
pub struct CliConfig {
    /// Base URL of the code relay service, e.g. http://host:5362
    #[arg(requires = "email")]
    pub server_url: Option<String>,

    /// Mailbox whose verification code should be fetched
    pub email: Option<String>,

    /// TOML file providing a [fetch] table; used when no positional arguments are given
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Maximum number of code requests")]
    pub max_attempts: Option<u32>,

    #[arg(long, help = "Base retry interval in seconds; the wait grows linearly per attempt")]
    pub interval: Option<u64>,

    #[arg(long, help = "Per-request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Health check timeout in seconds")]
    pub health_timeout: Option<u64>,

    #[arg(long, help = "Poll without checking /health first")]
    pub skip_health: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Merges the optional config file with the command line. Positional
    /// arguments win over the file; flags win over file values.
    pub fn resolve(&self) -> Result<FetchSettings> {
        let file = match &self.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let mut settings = match (&self.server_url, &self.email, &file) {
            (Some(server_url), Some(email), _) => FetchSettings::new(server_url, email),
            (None, None, Some(file)) => {
                let settings = file.to_settings()?;
                tracing::info!("No positional arguments given, using configured values:");
                tracing::info!("Server URL: {}", settings.server_url);
                tracing::info!("Email: {}", settings.email);
                settings
            }
            (None, None, None) => {
                return Err(FetchError::MissingConfigError {
                    field: "server_url".to_string(),
                })
            }
            (_, None, _) => {
                return Err(FetchError::MissingConfigError {
                    field: "email".to_string(),
                })
            }
            (None, _, _) => {
                return Err(FetchError::MissingConfigError {
                    field: "server_url".to_string(),
                })
            }
        };

        if let Some(file) = &file {
            file.apply_overrides(&mut settings);
        }
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut FetchSettings) {
        if let Some(max_attempts) = self.max_attempts {
            settings.max_attempts = max_attempts;
        }
        if let Some(interval) = self.interval {
            settings.retry_interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_secs = timeout;
        }
        if let Some(timeout) = self.health_timeout {
            settings.health_timeout_secs = timeout;
        }
        if self.skip_health {
            settings.skip_health = true;
        }
    }
}
