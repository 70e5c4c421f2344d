//! Repository contract for the authoritative download store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::Download;

/// Closure applied to a working copy of a row inside [`Repository::update`].
pub type Mutation = Box<dyn FnOnce(&mut Download) + Send>;

/// Authoritative store of downloads with serialised mutation per row.
///
/// Implementations guarantee that `update` is linearisable with respect to
/// other `update`/`get`/`delete` calls on the same id, and that `add`/
/// `add_if_absent` are linearisable globally on the fingerprint uniqueness
/// constraint. Snapshot reads return clones the caller may mutate freely.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Snapshot of all downloads.
    async fn list(&self) -> Result<Vec<Download>>;

    /// Fetch a download by identifier.
    async fn get(&self, id: Uuid) -> Result<Download>;

    /// Fetch a download by creation fingerprint.
    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Download>;

    /// Insert a new download. The caller must have set the fingerprint.
    async fn add(&self, download: Download) -> Result<Download>;

    /// Atomic check-then-insert keyed on the fingerprint. On collision the
    /// existing row is returned with `false`.
    async fn add_if_absent(&self, download: Download) -> Result<(Download, bool)>;

    /// Load the row under an exclusive lock, apply `mutate` to a working
    /// copy, write it back if changed, and return the post-state.
    async fn update(&self, id: Uuid, mutate: Mutation) -> Result<Download>;

    /// Remove a download.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
