//! Single consumer of the adapter event channel.
//!
//! Translates events into repository mutations. Errors are logged and the
//! loop moves on; the next event is the next chance to converge.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use downpour_core::{DownloadEvent, Repository, Status};

/// Reconciler task handle.
pub struct Reconciler;

impl Reconciler {
    /// Spawn the reconciliation loop. It runs until the channel closes or
    /// `shutdown` fires; no further events are drained after a stop signal.
    #[must_use]
    pub fn spawn(
        repository: Arc<dyn Repository>,
        events: mpsc::Receiver<DownloadEvent>,
        shutdown: oneshot::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(run(repository, events, shutdown))
    }
}

async fn run(
    repository: Arc<dyn Repository>,
    mut events: mpsc::Receiver<DownloadEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => apply(repository.as_ref(), event).await,
                    None => break,
                }
            }
            _ = &mut shutdown => break,
        }
    }
    debug!("reconciler stopped");
}

async fn apply(repository: &dyn Repository, event: DownloadEvent) {
    let id = event.download_id();
    let kind = event.kind();

    let outcome = match event {
        DownloadEvent::Started { .. } => {
            // The service wrote the GID; only the observed status moves.
            repository
                .update(id, Box::new(|row| row.status = Status::Active))
                .await
        }
        DownloadEvent::Paused { .. } => {
            repository
                .update(id, Box::new(|row| row.status = Status::Paused))
                .await
        }
        DownloadEvent::Cancelled { .. } => {
            repository
                .update(
                    id,
                    Box::new(|row| {
                        row.status = Status::Cancelled;
                        row.gid = None;
                    }),
                )
                .await
        }
        DownloadEvent::Completed { .. } => {
            repository
                .update(
                    id,
                    Box::new(|row| {
                        row.status = Status::Complete;
                        row.gid = None;
                    }),
                )
                .await
        }
        DownloadEvent::Failed { .. } => {
            repository
                .update(
                    id,
                    Box::new(|row| {
                        row.status = Status::Failed;
                        row.gid = None;
                    }),
                )
                .await
        }
        DownloadEvent::Progress {
            completed,
            total,
            speed,
            ..
        } => {
            // Transient; never persisted.
            debug!(download_id = %id, completed, total, speed, "progress");
            return;
        }
        DownloadEvent::Meta { name, files, .. } => {
            repository
                .update(
                    id,
                    Box::new(move |row| {
                        if let Some(name) = name {
                            row.name = Some(name);
                        }
                        if let Some(files) = files {
                            row.files = files;
                        }
                    }),
                )
                .await
        }
        DownloadEvent::GidUpdate { new_gid, .. } => {
            repository
                .update(id, Box::new(move |row| row.gid = Some(new_gid)))
                .await
        }
    };

    if let Err(err) = outcome {
        warn!(download_id = %id, event = kind, error = %err, "reconciliation update failed");
    }
}
