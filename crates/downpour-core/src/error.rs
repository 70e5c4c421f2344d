//! # Design
//!
//! - One tagged error type for the whole lifecycle chain so kinds survive
//!   layer crossings without string matching.
//! - Constant messages; operational context captured in structured fields.
//! - Sources preserved for diagnostics without interpolating them into
//!   messages.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for lifecycle, repository, and adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable classification of a failure, preserved through wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No such row, or the engine no longer knows the handle.
    NotFound,
    /// Fingerprint collision, or a target-file collision at the engine.
    Conflict,
    /// Desired status outside the accepted set.
    BadStatus,
    /// Source was empty after normalisation.
    InvalidSource,
    /// Target path was empty after normalisation.
    InvalidTarget,
    /// Safe-delete containment violation.
    OutsideBase,
    /// RPC or network failure.
    Transport,
    /// Malformed payload from the engine or a client.
    Decode,
    /// Invariant violation or unrecoverable local failure.
    Fatal,
}

/// Errors produced by the download lifecycle chain.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested entity does not exist.
    #[error("{entity} not found")]
    NotFound {
        /// Entity class that was looked up.
        entity: &'static str,
        /// Identifier used for the lookup.
        id: String,
    },
    /// The operation collided with existing state.
    #[error("conflict: {reason}")]
    Conflict {
        /// Static description of the colliding constraint.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Desired status value outside the accepted set.
    #[error("desired status not accepted")]
    BadStatus {
        /// The rejected value.
        value: String,
    },
    /// Source was blank after normalisation.
    #[error("source must not be empty")]
    InvalidSource,
    /// Target path was blank after normalisation.
    #[error("target path must not be empty")]
    InvalidTarget,
    /// A deletion candidate escaped the declared target path.
    #[error("path escapes the download target")]
    OutsideBase {
        /// Path that failed the containment check.
        path: PathBuf,
        /// Base directory the path must stay inside.
        base: PathBuf,
    },
    /// The engine transport failed.
    #[error("engine transport failure")]
    Transport {
        /// Operation that was in flight.
        operation: &'static str,
        /// Underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A payload could not be decoded.
    #[error("payload decode failure")]
    Decode {
        /// Operation that was decoding.
        operation: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A local filesystem operation failed during payload cleanup.
    #[error("filesystem operation failed")]
    Io {
        /// Operation that was in flight.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A repository invariant was violated.
    #[error("repository invariant violated")]
    Fatal {
        /// Description of the violated invariant.
        detail: String,
    },
}

impl Error {
    /// Classify the error for layer-boundary dispatch.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::BadStatus { .. } => ErrorKind::BadStatus,
            Self::InvalidSource => ErrorKind::InvalidSource,
            Self::InvalidTarget => ErrorKind::InvalidTarget,
            Self::OutsideBase { .. } => ErrorKind::OutsideBase,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Io { .. } | Self::Fatal { .. } => ErrorKind::Fatal,
        }
    }

    /// Construct a [`Error::NotFound`] for the given entity and identifier.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Construct a [`Error::Conflict`] with an optional offending value.
    pub fn conflict(reason: &'static str, value: Option<String>) -> Self {
        Self::Conflict { reason, value }
    }

    /// Construct a [`Error::Transport`] from any transport-level source.
    pub fn transport(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            operation,
            source: Box::new(source),
        }
    }

    /// Construct a [`Error::Decode`] from a JSON error.
    pub const fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { operation, source }
    }
}
