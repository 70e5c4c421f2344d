//! In-memory repository used by tests and DSN-less deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use downpour_core::{Download, Error, Mutation, Repository, Result};

#[derive(Default)]
struct State {
    rows: HashMap<Uuid, Download>,
    by_fingerprint: HashMap<String, Uuid>,
}

/// Map-backed repository; one RW lock is the linearisation point for every
/// operation, which trivially satisfies the per-row and fingerprint
/// guarantees.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    /// Construct an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Download>> {
        let state = self.state.read().await;
        let mut rows: Vec<Download> = state.rows.values().cloned().collect();
        rows.sort_by_key(|row| (row.created_at, row.id));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Download> {
        let state = self.state.read().await;
        state
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("download", id.to_string()))
    }

    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Download> {
        let state = self.state.read().await;
        state
            .by_fingerprint
            .get(fingerprint)
            .and_then(|id| state.rows.get(id))
            .cloned()
            .ok_or_else(|| Error::not_found("download", fingerprint.to_string()))
    }

    async fn add(&self, download: Download) -> Result<Download> {
        let mut state = self.state.write().await;
        if state.by_fingerprint.contains_key(&download.fingerprint) {
            return Err(Error::conflict(
                "fingerprint already exists",
                Some(download.fingerprint),
            ));
        }
        if state.rows.contains_key(&download.id) {
            return Err(Error::Fatal {
                detail: format!("duplicate download id {}", download.id),
            });
        }
        state
            .by_fingerprint
            .insert(download.fingerprint.clone(), download.id);
        state.rows.insert(download.id, download.clone());
        Ok(download)
    }

    async fn add_if_absent(&self, download: Download) -> Result<(Download, bool)> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .by_fingerprint
            .get(&download.fingerprint)
            .and_then(|id| state.rows.get(id))
        {
            return Ok((existing.clone(), false));
        }
        if state.rows.contains_key(&download.id) {
            return Err(Error::Fatal {
                detail: format!("duplicate download id {}", download.id),
            });
        }
        state
            .by_fingerprint
            .insert(download.fingerprint.clone(), download.id);
        state.rows.insert(download.id, download.clone());
        Ok((download, true))
    }

    async fn update(&self, id: Uuid, mutate: Mutation) -> Result<Download> {
        let mut state = self.state.write().await;
        let Some(current) = state.rows.get(&id).cloned() else {
            return Err(Error::not_found("download", id.to_string()));
        };

        let mut working = current.clone();
        mutate(&mut working);
        working.id = id;

        if working.fingerprint != current.fingerprint {
            if state.by_fingerprint.contains_key(&working.fingerprint) {
                return Err(Error::conflict(
                    "fingerprint already exists",
                    Some(working.fingerprint),
                ));
            }
            state.by_fingerprint.remove(&current.fingerprint);
            state.by_fingerprint.insert(working.fingerprint.clone(), id);
        }

        state.rows.insert(id, working.clone());
        Ok(working)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(removed) = state.rows.remove(&id) else {
            return Err(Error::not_found("download", id.to_string()));
        };
        state.by_fingerprint.remove(&removed.fingerprint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use downpour_core::{DesiredStatus, ErrorKind, Status, fingerprint};

    fn sample(source: &str, target: &str) -> Download {
        Download {
            id: Uuid::new_v4(),
            source: source.to_string(),
            target_path: target.to_string(),
            name: None,
            files: Vec::new(),
            status: Status::Queued,
            desired_status: DesiredStatus::Queued,
            gid: None,
            created_at: Utc::now(),
            fingerprint: fingerprint(source, target),
        }
    }

    #[tokio::test]
    async fn add_if_absent_is_idempotent_on_fingerprint() {
        let repo = MemoryRepository::new();
        let first = sample("magnet:?xt=urn:btih:abc", "/data");
        let (stored, created) = repo.add_if_absent(first.clone()).await.unwrap();
        assert!(created);
        assert_eq!(stored.id, first.id);

        let duplicate = sample("magnet:?xt=urn:btih:abc", "/data");
        let (existing, created) = repo.add_if_absent(duplicate).await.unwrap();
        assert!(!created);
        assert_eq!(existing.id, first.id);
    }

    #[tokio::test]
    async fn add_rejects_fingerprint_collision() {
        let repo = MemoryRepository::new();
        repo.add(sample("magnet:?xt=urn:btih:abc", "/data"))
            .await
            .unwrap();
        let err = repo
            .add(sample("magnet:?xt=urn:btih:abc", "/data"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn update_returns_post_state_and_missing_rows_fail() {
        let repo = MemoryRepository::new();
        let row = repo.add(sample("https://x/file", "/data")).await.unwrap();

        let updated = repo
            .update(
                row.id,
                Box::new(|download| {
                    download.status = Status::Active;
                    download.gid = Some("g1".to_string());
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, Status::Active);
        assert_eq!(updated.gid.as_deref(), Some("g1"));

        let err = repo
            .update(Uuid::new_v4(), Box::new(|_| {}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let repo = MemoryRepository::new();
        let row = repo.add(sample("https://x/file", "/data")).await.unwrap();
        repo.delete(row.id).await.unwrap();
        let err = repo.delete(row.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn list_returns_detached_snapshots() {
        let repo = MemoryRepository::new();
        let row = repo.add(sample("https://x/file", "/data")).await.unwrap();

        let mut snapshot = repo.list().await.unwrap();
        snapshot[0].status = Status::Failed;

        let stored = repo.get(row.id).await.unwrap();
        assert_eq!(stored.status, Status::Queued, "snapshot must be a clone");
    }
}
