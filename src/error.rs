//! Error types for monitoring construction

use thiserror::Error;

/// Main error type for monitoring and dashboard construction
#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error(
        "The feature flag '{flag}' must be enabled in the context of stack '{stack}' \
         to resolve metric dimensions for {resource}"
    )]
    MissingFeatureFlag {
        flag: String,
        stack: String,
        resource: String,
    },

    #[error("Invalid alarm configuration for '{alarm}': {reason}")]
    InvalidAlarmConfig { alarm: String, reason: String },

    #[error("There is already a construct with id '{id}' in '{path}'")]
    DuplicateConstruct { id: String, path: String },

    #[error("Invalid construct id '{0}': ids must be non-empty and must not contain '/'")]
    InvalidConstructId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonitoringError {
    pub(crate) fn invalid_alarm(alarm: impl Into<String>, reason: impl Into<String>) -> Self {
        MonitoringError::InvalidAlarmConfig {
            alarm: alarm.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for monitoring operations
pub type Result<T> = std::result::Result<T, MonitoringError>;
