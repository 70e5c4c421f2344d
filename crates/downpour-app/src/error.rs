//! # Design
//!
//! - One structured error type for bootstrap and serve failures.
//! - Constant messages; operational context captured in fields.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while bootstrapping or running the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded from the environment.
    #[error("configuration loading failed")]
    Config {
        /// Underlying configuration error.
        #[source]
        source: downpour_config::ConfigError,
    },
    /// The persistent store could not be reached or migrated.
    #[error("store initialisation failed")]
    Store {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The engine adapter could not be constructed.
    #[error("engine adapter initialisation failed")]
    Adapter {
        /// Underlying core error.
        #[source]
        source: downpour_core::Error,
    },
    /// The API listener failed to bind or serve.
    #[error("api server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
