//! Domain model for managed downloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Observed lifecycle state reported for a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Download is registered but the engine has not been asked to run it.
    Queued,
    /// Engine holds a live handle and the transfer is in progress.
    Active,
    /// Transfer exists at the engine but is paused.
    Paused,
    /// Payload finished downloading.
    Complete,
    /// Transfer was cancelled by the user.
    Cancelled,
    /// Transfer failed at the engine or during a lifecycle transition.
    Failed,
}

impl Status {
    /// Whether the state is terminal; terminal rows must carry no engine handle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Failed)
    }

    /// Canonical lowercase label used for persistence and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

/// User-declared intent for a download, distinct from the observed [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredStatus {
    /// Keep the download registered without starting it.
    Queued,
    /// Run the transfer.
    Active,
    /// Hold the transfer at the engine.
    Paused,
    /// Transient intent: continue a paused or stopped transfer. Never persisted.
    Resume,
    /// Abandon the transfer.
    Cancelled,
}

impl DesiredStatus {
    /// Canonical lowercase label used for persistence and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Resume => "resume",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Individual file within a download payload. Paths are basenames only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFile {
    /// Basename of the file; never contains directory separators.
    pub path: String,
    /// Total size of the file in bytes.
    pub length: u64,
    /// Bytes downloaded so far for this file.
    pub completed: u64,
}

/// A managed download and its durable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    /// Opaque stable identifier, unique within a store.
    pub id: Uuid,
    /// User-supplied origin: HTTP(S) URL or magnet URI.
    pub source: String,
    /// Absolute directory the payload is written into.
    pub target_path: String,
    /// Human-friendly label derived from engine metadata or the source.
    pub name: Option<String>,
    /// Files reported by the engine, basename-projected.
    pub files: Vec<DownloadFile>,
    /// Observed lifecycle state.
    pub status: Status,
    /// User-declared intent.
    pub desired_status: DesiredStatus,
    /// Current engine identifier; `None` when no live handle exists.
    pub gid: Option<String>,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
    /// Deterministic hash over the normalised (source, target) pair.
    pub fingerprint: String,
}

impl Download {
    /// Whether the source looks like a magnet link.
    #[must_use]
    pub fn is_magnet(&self) -> bool {
        self.source.starts_with("magnet:")
    }

    /// Whether the source describes torrent content (magnet or `.torrent`).
    #[must_use]
    pub fn is_torrent_like(&self) -> bool {
        self.is_magnet() || self.source.ends_with(".torrent")
    }
}
