use crate::config::settings::FetchSettings;
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::validate_required_field;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk configuration. Every value is optional so the command line can
/// fill in or override any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub fetch: FetchSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchSection {
    pub server_url: Option<String>,
    pub email: Option<String>,
    pub max_attempts: Option<u32>,
    pub retry_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub health_timeout_secs: Option<u64>,
    pub skip_health: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FetchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        // 支援 [fetch] 表格或頂層平鋪的鍵
        let table: toml::Table = Self::parse_toml(&processed_content)?;
        if table.contains_key("fetch") {
            Self::parse_toml(&processed_content)
        } else {
            let fetch: FetchSection = Self::parse_toml(&processed_content)?;
            Ok(Self { fetch })
        }
    }

    fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
        toml::from_str(content).map_err(|e| FetchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RELAY_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FetchError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Builds settings from the file alone; server URL and email must be present.
    pub fn to_settings(&self) -> Result<FetchSettings> {
        let server_url = validate_required_field("server_url", &self.fetch.server_url)?;
        let email = validate_required_field("email", &self.fetch.email)?;
        let mut settings = FetchSettings::new(server_url.clone(), email.clone());
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    /// Copies the tuning values present in the file onto `settings`.
    pub fn apply_overrides(&self, settings: &mut FetchSettings) {
        let fetch = &self.fetch;
        if let Some(max_attempts) = fetch.max_attempts {
            settings.max_attempts = max_attempts;
        }
        if let Some(interval) = fetch.retry_interval_secs {
            settings.retry_interval_secs = interval;
        }
        if let Some(timeout) = fetch.request_timeout_secs {
            settings.request_timeout_secs = timeout;
        }
        if let Some(timeout) = fetch.health_timeout_secs {
            settings.health_timeout_secs = timeout;
        }
        if let Some(skip) = fetch.skip_health {
            settings.skip_health = skip;
        }
    }
}
