//! Service and engine traits at the seams between the API surface, the
//! lifecycle service, and the backend adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{DesiredStatus, Download};

/// Request payload for admitting a download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDownload {
    /// HTTP(S) URL or magnet URI to fetch.
    pub source: String,
    /// Absolute directory the payload is written into.
    pub target_path: String,
    /// Optional initial intent; defaults to queued.
    #[serde(default)]
    pub desired_status: Option<DesiredStatus>,
}

/// Result of an admission request.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// The stored row (freshly created or the existing duplicate).
    pub download: Download,
    /// Whether a new row was created by this call.
    pub created: bool,
}

/// Lifecycle façade exposed to the API layer; the sole external mutator.
#[async_trait]
pub trait DownloadWorkflow: Send + Sync {
    /// Admit a download, idempotent on the creation fingerprint.
    async fn add(&self, request: NewDownload) -> Result<AddOutcome>;

    /// Apply a desired-status transition.
    async fn update_desired_status(&self, id: Uuid, desired: DesiredStatus) -> Result<Download>;

    /// Remove a download, optionally deleting its payload from disk.
    async fn delete(&self, id: Uuid, delete_files: bool) -> Result<()>;
}

/// Read-only inspection used by API consumers.
#[async_trait]
pub trait DownloadInspector: Send + Sync {
    /// Snapshot of all downloads.
    async fn list(&self) -> Result<Vec<Download>>;

    /// Snapshot of a single download.
    async fn get(&self, id: Uuid) -> Result<Download>;
}

/// Backend engine operations implemented by adapters.
#[async_trait]
pub trait DownloadEngine: Send + Sync {
    /// Hand the transfer to the engine; returns the engine handle to persist.
    async fn start(&self, download: &Download) -> Result<String>;

    /// Pause the transfer at the engine.
    async fn pause(&self, download: &Download) -> Result<()>;

    /// Continue a paused transfer.
    async fn resume(&self, download: &Download) -> Result<()>;

    /// Remove the transfer from the engine.
    async fn cancel(&self, download: &Download) -> Result<()>;

    /// Cancel if needed, then perform filesystem cleanup. `files_hint`
    /// carries the authoritative engine file list captured before the
    /// cancel, because the engine discards it afterwards.
    async fn delete(
        &self,
        download: &Download,
        delete_files: bool,
        files_hint: Option<Vec<String>>,
    ) -> Result<()>;

    /// Absolute payload paths the engine currently reports for a handle.
    async fn get_files(&self, gid: &str) -> Result<Vec<String>>;

    /// Cheap liveness probe against the engine.
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::Status;
    use chrono::Utc;

    struct StubEngine;

    #[async_trait]
    impl DownloadEngine for StubEngine {
        async fn start(&self, _download: &Download) -> Result<String> {
            Ok("gid-1".to_string())
        }

        async fn pause(&self, _download: &Download) -> Result<()> {
            Ok(())
        }

        async fn resume(&self, _download: &Download) -> Result<()> {
            Ok(())
        }

        async fn cancel(&self, download: &Download) -> Result<()> {
            if download.gid.is_none() {
                return Err(Error::not_found("gid", download.id.to_string()));
            }
            Ok(())
        }

        async fn delete(
            &self,
            _download: &Download,
            _delete_files: bool,
            _files_hint: Option<Vec<String>>,
        ) -> Result<()> {
            Ok(())
        }

        async fn get_files(&self, _gid: &str) -> Result<Vec<String>> {
            Ok(vec!["/data/demo/file.bin".to_string()])
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn sample_download(gid: Option<String>) -> Download {
        Download {
            id: Uuid::new_v4(),
            source: "https://example.org/file.bin".to_string(),
            target_path: "/data".to_string(),
            name: None,
            files: Vec::new(),
            status: Status::Queued,
            desired_status: DesiredStatus::Queued,
            gid,
            created_at: Utc::now(),
            fingerprint: "fp".to_string(),
        }
    }

    #[tokio::test]
    async fn stub_engine_round_trip() {
        let engine = StubEngine;
        let download = sample_download(Some("gid-1".to_string()));

        assert_eq!(engine.start(&download).await.unwrap(), "gid-1");
        engine.pause(&download).await.unwrap();
        engine.cancel(&download).await.unwrap();
        assert_eq!(
            engine.get_files("gid-1").await.unwrap(),
            vec!["/data/demo/file.bin".to_string()]
        );
    }

    #[tokio::test]
    async fn cancel_without_gid_reports_not_found() {
        let engine = StubEngine;
        let download = sample_download(None);
        let err = engine.cancel(&download).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
