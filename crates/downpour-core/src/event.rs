//! Events emitted by the backend adapter and consumed by the reconciler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::DownloadFile;

/// Adapter-emitted lifecycle events for a single download.
///
/// For one GID the adapter guarantees: `Started` first, then any number of
/// `Meta`/`Progress`/`Paused`/`GidUpdate` events, then at most one terminal
/// of `Completed`/`Cancelled`/`Failed`, after which the GID goes silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// The engine accepted the transfer and assigned a handle.
    Started {
        /// Download identifier.
        id: Uuid,
        /// Engine handle for the transfer.
        gid: String,
    },
    /// Metadata became available for the transfer.
    Meta {
        /// Download identifier.
        id: Uuid,
        /// Engine handle the metadata belongs to.
        gid: String,
        /// Derived display name, when one could be determined.
        name: Option<String>,
        /// Basename-projected file listing, when reported.
        files: Option<Vec<DownloadFile>>,
    },
    /// Periodic transfer progress; not persisted.
    Progress {
        /// Download identifier.
        id: Uuid,
        /// Engine handle being polled.
        gid: String,
        /// Bytes downloaded so far.
        completed: u64,
        /// Total bytes expected.
        total: u64,
        /// Current download speed in bytes per second.
        speed: u64,
    },
    /// The engine paused the transfer.
    Paused {
        /// Download identifier.
        id: Uuid,
        /// Engine handle that was paused.
        gid: String,
    },
    /// The transfer was removed at the user's request.
    Cancelled {
        /// Download identifier.
        id: Uuid,
        /// Engine handle that was removed.
        gid: String,
    },
    /// The payload finished downloading.
    Completed {
        /// Download identifier.
        id: Uuid,
        /// Engine handle that completed.
        gid: String,
    },
    /// The engine reported an unrecoverable error.
    Failed {
        /// Download identifier.
        id: Uuid,
        /// Engine handle that failed.
        gid: String,
    },
    /// A magnet metadata handle was replaced by the real transfer handle.
    GidUpdate {
        /// Download identifier.
        id: Uuid,
        /// Metadata handle being retired.
        old_gid: String,
        /// Real transfer handle replacing it.
        new_gid: String,
    },
}

impl DownloadEvent {
    /// Machine-friendly discriminator for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Meta { .. } => "meta",
            Self::Progress { .. } => "progress",
            Self::Paused { .. } => "paused",
            Self::Cancelled { .. } => "cancelled",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::GidUpdate { .. } => "gid_update",
        }
    }

    /// Download identifier the event applies to.
    #[must_use]
    pub const fn download_id(&self) -> Uuid {
        match self {
            Self::Started { id, .. }
            | Self::Meta { id, .. }
            | Self::Progress { id, .. }
            | Self::Paused { id, .. }
            | Self::Cancelled { id, .. }
            | Self::Completed { id, .. }
            | Self::Failed { id, .. }
            | Self::GidUpdate { id, .. } => *id,
        }
    }

    /// Whether the event ends the stream for its GID.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled { .. } | Self::Completed { .. } | Self::Failed { .. }
        )
    }
}
