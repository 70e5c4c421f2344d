//! # Design
//!
//! - Constant-message errors with the offending field and value captured as
//!   structured context.

use thiserror::Error;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was absent.
    #[error("required environment variable missing")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// An environment variable held a value that failed validation.
    #[error("environment variable invalid")]
    InvalidField {
        /// Name of the offending variable.
        name: &'static str,
        /// Static reason for the rejection.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_constant() {
        assert_eq!(
            ConfigError::MissingEnv { name: "API_TOKEN" }.to_string(),
            "required environment variable missing"
        );
        assert_eq!(
            ConfigError::InvalidField {
                name: "POLL_MS",
                reason: "not_a_number",
                value: Some("abc".to_string()),
            }
            .to_string(),
            "environment variable invalid"
        );
    }
}
