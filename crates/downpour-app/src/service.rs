//! Lifecycle service: the sole entry point for external mutation.
//!
//! Composes repository and adapter calls in the order the lifecycle
//! requires, enforces idempotent creation via the fingerprint, and persists
//! every status change through a single repository update so writes stay
//! linearised.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use downpour_core::{
    AddOutcome, DesiredStatus, Download, DownloadEngine, DownloadInspector, DownloadWorkflow,
    Error, NewDownload, Repository, Result, Status, fingerprint, normalise_source,
    normalise_target,
};

/// Lifecycle façade over the repository and the backend adapter.
pub struct LifecycleService {
    repository: Arc<dyn Repository>,
    engine: Arc<dyn DownloadEngine>,
}

impl LifecycleService {
    /// Construct the service from shared repository and engine handles.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, engine: Arc<dyn DownloadEngine>) -> Self {
        Self { repository, engine }
    }

    /// Start the transfer on a detached task so the caller returns promptly.
    /// The task outlives the request, so it runs on a fresh root context
    /// rather than the request's.
    fn spawn_start(&self, download: Download) {
        let repository = Arc::clone(&self.repository);
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            let id = download.id;
            match engine.start(&download).await {
                Ok(gid) => {
                    let outcome = repository
                        .update(
                            id,
                            Box::new(move |row| {
                                row.status = Status::Active;
                                row.gid = Some(gid);
                            }),
                        )
                        .await;
                    if let Err(err) = outcome {
                        warn!(download_id = %id, error = %err, "failed to persist started transfer");
                    }
                }
                Err(err) => {
                    warn!(download_id = %id, error = %err, "detached start failed");
                    record_failure(repository.as_ref(), id, true).await;
                }
            }
        });
    }
}

/// Persist a failed transition. The engine handle is cleared only when the
/// backend never confirmed one.
async fn record_failure(repository: &dyn Repository, id: Uuid, clear_gid: bool) {
    let outcome = repository
        .update(
            id,
            Box::new(move |row| {
                row.status = Status::Failed;
                if clear_gid {
                    row.gid = None;
                }
            }),
        )
        .await;
    if let Err(err) = outcome {
        warn!(download_id = %id, error = %err, "failed to persist failure status");
    }
}

#[async_trait]
impl DownloadWorkflow for LifecycleService {
    async fn add(&self, request: NewDownload) -> Result<AddOutcome> {
        let source = normalise_source(&request.source);
        if source.is_empty() {
            return Err(Error::InvalidSource);
        }
        let target_path = normalise_target(&request.target_path);
        if target_path.is_empty() {
            return Err(Error::InvalidTarget);
        }

        // Resume is a transient intent and is never stored.
        let desired = match request.desired_status.unwrap_or(DesiredStatus::Queued) {
            DesiredStatus::Resume => DesiredStatus::Active,
            other => other,
        };

        let fingerprint = fingerprint(&source, &target_path);
        let download = Download {
            id: Uuid::new_v4(),
            source,
            target_path,
            name: None,
            files: Vec::new(),
            status: Status::Queued,
            desired_status: desired,
            gid: None,
            created_at: Utc::now(),
            fingerprint,
        };

        let (stored, created) = self.repository.add_if_absent(download).await?;
        if created {
            info!(download_id = %stored.id, "download registered");
            if stored.desired_status == DesiredStatus::Active {
                self.spawn_start(stored.clone());
            }
        }
        Ok(AddOutcome {
            download: stored,
            created,
        })
    }

    async fn update_desired_status(&self, id: Uuid, desired: DesiredStatus) -> Result<Download> {
        if desired == DesiredStatus::Queued {
            return Err(Error::BadStatus {
                value: desired.as_str().to_string(),
            });
        }

        let current = self.repository.get(id).await?;
        let has_gid = current.gid.as_deref().is_some_and(|gid| !gid.is_empty());

        match desired {
            DesiredStatus::Active => {
                if current.status == Status::Active && has_gid {
                    // Already running with a live handle; re-asserting the
                    // intent must not start a second transfer.
                    return self
                        .repository
                        .update(
                            id,
                            Box::new(|row| row.desired_status = DesiredStatus::Active),
                        )
                        .await;
                }
                match self.engine.start(&current).await {
                    Ok(gid) => {
                        self.repository
                            .update(
                                id,
                                Box::new(move |row| {
                                    row.desired_status = DesiredStatus::Active;
                                    row.status = Status::Active;
                                    row.gid = Some(gid);
                                }),
                            )
                            .await
                    }
                    Err(err) => {
                        record_failure(self.repository.as_ref(), id, true).await;
                        Err(err)
                    }
                }
            }
            DesiredStatus::Paused => {
                if has_gid {
                    if let Err(err) = self.engine.pause(&current).await {
                        record_failure(self.repository.as_ref(), id, false).await;
                        return Err(err);
                    }
                }
                self.repository
                    .update(
                        id,
                        Box::new(|row| {
                            row.desired_status = DesiredStatus::Paused;
                            row.status = Status::Paused;
                        }),
                    )
                    .await
            }
            DesiredStatus::Resume => {
                if has_gid {
                    if let Err(err) = self.engine.resume(&current).await {
                        record_failure(self.repository.as_ref(), id, false).await;
                        return Err(err);
                    }
                    self.repository
                        .update(
                            id,
                            Box::new(|row| {
                                row.desired_status = DesiredStatus::Active;
                                row.status = Status::Active;
                            }),
                        )
                        .await
                } else {
                    // No engine handle to continue; start afresh on a
                    // detached task so the call returns promptly.
                    let updated = self
                        .repository
                        .update(
                            id,
                            Box::new(|row| {
                                row.desired_status = DesiredStatus::Active;
                                row.status = Status::Active;
                            }),
                        )
                        .await?;
                    self.spawn_start(updated.clone());
                    Ok(updated)
                }
            }
            DesiredStatus::Cancelled => {
                if has_gid {
                    if let Err(err) = self.engine.cancel(&current).await {
                        record_failure(self.repository.as_ref(), id, false).await;
                        return Err(err);
                    }
                }
                self.repository
                    .update(
                        id,
                        Box::new(|row| {
                            row.desired_status = DesiredStatus::Cancelled;
                            row.status = Status::Cancelled;
                            row.gid = None;
                        }),
                    )
                    .await
            }
            DesiredStatus::Queued => Err(Error::BadStatus {
                value: desired.as_str().to_string(),
            }),
        }
    }

    async fn delete(&self, id: Uuid, delete_files: bool) -> Result<()> {
        let download = self.repository.get(id).await?;

        // The engine discards the file list once the transfer is cancelled,
        // so the authoritative snapshot has to be taken first.
        let files_hint = match download.gid.as_deref().filter(|gid| !gid.is_empty()) {
            Some(gid) if delete_files => match self.engine.get_files(gid).await {
                Ok(files) if !files.is_empty() => Some(files),
                Ok(_) => None,
                Err(err) => {
                    warn!(download_id = %id, error = %err, "file list snapshot failed");
                    None
                }
            },
            _ => None,
        };

        self.engine.delete(&download, delete_files, files_hint).await?;
        self.repository.delete(id).await?;
        info!(download_id = %id, delete_files, "download removed");
        Ok(())
    }
}

#[async_trait]
impl DownloadInspector for LifecycleService {
    async fn list(&self) -> Result<Vec<Download>> {
        self.repository.list().await
    }

    async fn get(&self, id: Uuid) -> Result<Download> {
        self.repository.get(id).await
    }
}
