//! Wire DTOs for the download endpoints.
//!
//! Request bodies deny unknown fields so read-only attributes (id, status,
//! gid, name, files, createdAt) are rejected rather than ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use downpour_core::{DesiredStatus, Download, DownloadFile, Status};

/// Desired status vocabulary accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum DesiredStatusParam {
    /// Keep the download registered without starting it.
    Queued,
    /// Run the transfer.
    Active,
    /// Hold the transfer at the engine.
    Paused,
    /// Continue a paused or stopped transfer.
    Resume,
    /// Abandon the transfer.
    Cancelled,
}

impl From<DesiredStatusParam> for DesiredStatus {
    fn from(param: DesiredStatusParam) -> Self {
        match param {
            DesiredStatusParam::Queued => Self::Queued,
            DesiredStatusParam::Active => Self::Active,
            DesiredStatusParam::Paused => Self::Paused,
            DesiredStatusParam::Resume => Self::Resume,
            DesiredStatusParam::Cancelled => Self::Cancelled,
        }
    }
}

impl From<DesiredStatus> for DesiredStatusParam {
    fn from(desired: DesiredStatus) -> Self {
        match desired {
            DesiredStatus::Queued => Self::Queued,
            DesiredStatus::Active => Self::Active,
            DesiredStatus::Paused => Self::Paused,
            DesiredStatus::Resume => Self::Resume,
            DesiredStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Observed status vocabulary surfaced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum StatusView {
    /// Registered, engine not yet asked to run it.
    Queued,
    /// Transfer in progress.
    Active,
    /// Held at the engine.
    Paused,
    /// Payload finished downloading.
    Complete,
    /// Abandoned by the user.
    Cancelled,
    /// Failed at the engine or during a transition.
    Failed,
}

impl From<Status> for StatusView {
    fn from(status: Status) -> Self {
        match status {
            Status::Queued => Self::Queued,
            Status::Active => Self::Active,
            Status::Paused => Self::Paused,
            Status::Complete => Self::Complete,
            Status::Cancelled => Self::Cancelled,
            Status::Failed => Self::Failed,
        }
    }
}

/// Body for `POST /v1/downloads`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CreateDownloadRequest {
    pub(crate) source: String,
    pub(crate) target_path: String,
    #[serde(default)]
    pub(crate) desired_status: Option<DesiredStatusParam>,
}

/// Body for `PATCH /v1/downloads/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct PatchDownloadRequest {
    pub(crate) desired_status: DesiredStatusParam,
}

/// Optional body for `DELETE /v1/downloads/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct DeleteDownloadRequest {
    #[serde(default)]
    pub(crate) delete_files: bool,
}

/// One payload file in a response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileView {
    pub(crate) path: String,
    pub(crate) length: u64,
    pub(crate) completed: u64,
}

/// Download representation returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DownloadView {
    pub(crate) id: Uuid,
    pub(crate) source: String,
    pub(crate) target_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    pub(crate) files: Vec<FileView>,
    pub(crate) status: StatusView,
    pub(crate) desired_status: DesiredStatusParam,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) gid: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Download> for DownloadView {
    fn from(download: Download) -> Self {
        Self {
            id: download.id,
            source: download.source,
            target_path: download.target_path,
            name: download.name,
            files: download.files.into_iter().map(FileView::from).collect(),
            status: download.status.into(),
            desired_status: download.desired_status.into(),
            gid: download.gid,
            created_at: download.created_at,
        }
    }
}

impl From<DownloadFile> for FileView {
    fn from(file: DownloadFile) -> Self {
        Self {
            path: file.path,
            length: file.length,
            completed: file.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_read_only_fields() {
        let err = serde_json::from_str::<CreateDownloadRequest>(
            r#"{"source":"magnet:?x","targetPath":"/t","status":"Active"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("status"));

        let ok: CreateDownloadRequest = serde_json::from_str(
            r#"{"source":"magnet:?x","targetPath":"/t","desiredStatus":"Active"}"#,
        )
        .expect("valid body parses");
        assert_eq!(ok.desired_status, Some(DesiredStatusParam::Active));
    }

    #[test]
    fn patch_request_accepts_the_documented_vocabulary() {
        for (raw, expected) in [
            ("Active", DesiredStatusParam::Active),
            ("Paused", DesiredStatusParam::Paused),
            ("Resume", DesiredStatusParam::Resume),
            ("Cancelled", DesiredStatusParam::Cancelled),
        ] {
            let body = format!(r#"{{"desiredStatus":"{raw}"}}"#);
            let parsed: PatchDownloadRequest =
                serde_json::from_str(&body).expect("valid body parses");
            assert_eq!(parsed.desired_status, expected);
        }
        assert!(serde_json::from_str::<PatchDownloadRequest>(r#"{"desiredStatus":"Seeding"}"#)
            .is_err());
    }

    #[test]
    fn delete_request_defaults_to_keeping_files() {
        let parsed: DeleteDownloadRequest = serde_json::from_str("{}").expect("empty body parses");
        assert!(!parsed.delete_files);
        let parsed: DeleteDownloadRequest =
            serde_json::from_str(r#"{"deleteFiles":true}"#).expect("body parses");
        assert!(parsed.delete_files);
    }

    #[test]
    fn view_serialises_camel_case_fields() {
        let view = DownloadView {
            id: Uuid::nil(),
            source: "magnet:?x".to_string(),
            target_path: "/t".to_string(),
            name: None,
            files: Vec::new(),
            status: StatusView::Queued,
            desired_status: DesiredStatusParam::Queued,
            gid: None,
            created_at: Utc::now(),
        };
        let encoded = serde_json::to_value(&view).expect("view serialises");
        assert!(encoded.get("targetPath").is_some());
        assert!(encoded.get("createdAt").is_some());
        assert!(encoded.get("gid").is_none(), "empty gid omitted");
    }
}
