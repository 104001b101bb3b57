use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::HttpClientError(_) => ErrorCategory::Network,
            FetchError::IoError(_) => ErrorCategory::System,
            FetchError::UrlError(_)
            | FetchError::ConfigError { .. }
            | FetchError::MissingConfigError { .. }
            | FetchError::InvalidConfigValueError { .. }
            | FetchError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FetchError::HttpClientError(_) => {
                "Check TLS support and proxy settings, then try again".to_string()
            }
            FetchError::UrlError(_) => {
                "Use a full base URL such as http://host:5362 without a path suffix".to_string()
            }
            FetchError::IoError(_) => "Make sure the config file exists and is readable".to_string(),
            FetchError::ConfigError { .. } | FetchError::ConfigValidationError { .. } => {
                "Review the configuration file for syntax errors".to_string()
            }
            FetchError::MissingConfigError { field } => format!(
                "Pass SERVER_URL and EMAIL as arguments, or set '{}' in the config file (top level or under [fetch])",
                field
            ),
            FetchError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and run again", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FetchError::HttpClientError(_) => "Could not set up the HTTP client".to_string(),
            FetchError::UrlError(e) => format!("The server URL is not valid: {}", e),
            FetchError::IoError(e) => format!("Could not read configuration: {}", e),
            FetchError::ConfigError { message } => format!("Configuration problem: {}", message),
            FetchError::MissingConfigError { field } => format!("No value given for {}", field),
            FetchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            FetchError::ConfigValidationError { field, message } => {
                format!("Invalid configuration ({}): {}", field, message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
