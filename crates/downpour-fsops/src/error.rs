//! # Design
//!
//! - Constant-message errors; paths and operations captured as structured
//!   context so failures are reproducible in tests.
//! - Conversion into the core error type preserves the failure kind.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem cleanup.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while removing download payloads.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// A candidate path escaped the declared target directory.
    #[error("removal candidate escapes the target directory")]
    OutsideBase {
        /// Path that failed the containment check.
        path: PathBuf,
        /// Base directory the path must stay inside.
        base: PathBuf,
    },
    /// IO failure while removing a path.
    #[error("cleanup io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

impl From<FsOpsError> for downpour_core::Error {
    fn from(error: FsOpsError) -> Self {
        match error {
            FsOpsError::OutsideBase { path, base } => Self::OutsideBase { path, base },
            FsOpsError::Io {
                operation,
                path,
                source,
            } => Self::Io {
                operation,
                path,
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downpour_core::ErrorKind;
    use std::error::Error as _;

    #[test]
    fn conversion_preserves_kind() {
        let outside = FsOpsError::OutsideBase {
            path: PathBuf::from("/etc/passwd"),
            base: PathBuf::from("/data"),
        };
        assert_eq!(
            downpour_core::Error::from(outside).kind(),
            ErrorKind::OutsideBase
        );

        let io_err = FsOpsError::io("remove_payload", "/data/x", io::Error::other("denied"));
        let converted = downpour_core::Error::from(io_err);
        assert_eq!(converted.kind(), ErrorKind::Fatal);
        assert!(converted.source().is_some());
    }
}
