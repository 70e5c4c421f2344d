//! Lifecycle operations against the engine plus the in-process GID tables.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use downpour_core::{
    Download, DownloadEngine, DownloadEvent, DownloadFile, Error, ErrorKind, Result,
};
use downpour_fsops::{RemovalRequest, remove_download};

use crate::notifications;
use crate::poller;
use crate::rpc::{RpcClient, RpcError};
use crate::types::{Aria2File, Aria2Status, parse_decimal};

/// Bounded capacity of the adapter event channel. Emitters block when the
/// reconciler falls behind, which throttles the notification loop and the
/// poller.
pub const EVENT_BUFFER: usize = 256;

const STATUS_KEYS_META: [&str; 3] = ["followedBy", "bittorrent", "files"];
const STATUS_KEYS_PROGRESS: [&str; 3] = ["totalLength", "completedLength", "downloadSpeed"];

/// Connection parameters for the engine endpoint.
#[derive(Debug, Clone)]
pub struct Aria2Config {
    /// Base URL for the JSON-RPC endpoint.
    pub rpc_url: String,
    /// Secret token prepended to RPC params, when configured.
    pub rpc_secret: Option<String>,
    /// Per-RPC HTTP timeout.
    pub rpc_timeout: Duration,
    /// Progress poll period.
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProgressSnapshot {
    pub(crate) completed: u64,
    pub(crate) total: u64,
    pub(crate) speed: u64,
}

/// The three tracking tables, guarded by one RW lock. Swaps mutate all of
/// them in a single write-lock section.
#[derive(Default)]
pub(crate) struct TrackingState {
    pub(crate) gid_to_id: HashMap<String, Uuid>,
    pub(crate) active_gids: HashSet<String>,
    pub(crate) last_progress: HashMap<String, ProgressSnapshot>,
}

/// Adapter owning the JSON-RPC client and notification stream for one
/// engine instance.
pub struct Aria2Adapter {
    rpc: RpcClient,
    events: mpsc::Sender<DownloadEvent>,
    state: RwLock<TrackingState>,
    notification_url: String,
    poll_interval: Duration,
}

impl Aria2Adapter {
    /// Construct an adapter from connection parameters and the event sender.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built or the RPC URL
    /// cannot be rewritten into a notification URL.
    pub fn new(config: Aria2Config, events: mpsc::Sender<DownloadEvent>) -> Result<Self> {
        let rpc = RpcClient::new(
            config.rpc_url.clone(),
            config.rpc_secret,
            config.rpc_timeout,
        )?;
        let notification_url = notification_url(&config.rpc_url)?;
        Ok(Self {
            rpc,
            events,
            state: RwLock::new(TrackingState::default()),
            notification_url,
            poll_interval: config.poll_interval,
        })
    }

    /// Spawn the notification consumer; it runs until `shutdown` fires.
    #[must_use]
    pub fn spawn_notifications(self: &Arc<Self>, shutdown: oneshot::Receiver<()>) -> JoinHandle<()> {
        let adapter = Arc::clone(self);
        let url = adapter.notification_url.clone();
        tokio::spawn(async move { notifications::run(adapter, url, shutdown).await })
    }

    /// Spawn the progress poller; it runs until `shutdown` fires.
    #[must_use]
    pub fn spawn_poller(self: &Arc<Self>, shutdown: oneshot::Receiver<()>) -> JoinHandle<()> {
        let adapter = Arc::clone(self);
        let interval = adapter.poll_interval;
        tokio::spawn(async move { poller::run(adapter, interval, shutdown).await })
    }

    pub(crate) async fn emit(&self, event: DownloadEvent) {
        if self.events.send(event).await.is_err() {
            warn!("event channel closed; dropping adapter event");
        }
    }

    pub(crate) async fn lookup(&self, gid: &str) -> Option<Uuid> {
        self.state.read().await.gid_to_id.get(gid).copied()
    }

    /// Register a GID for a download and mark it active.
    async fn track(&self, gid: &str, id: Uuid) {
        let mut state = self.state.write().await;
        state.gid_to_id.insert(gid.to_string(), id);
        state.active_gids.insert(gid.to_string());
        state.last_progress.remove(gid);
    }

    /// Drop a GID from all three tables in one write-lock section.
    pub(crate) async fn clear_tracking(&self, gid: &str) {
        let mut state = self.state.write().await;
        state.gid_to_id.remove(gid);
        state.active_gids.remove(gid);
        state.last_progress.remove(gid);
    }

    pub(crate) async fn active_snapshot(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .active_gids
            .iter()
            .cloned()
            .collect()
    }

    /// Replace a metadata GID with the real transfer GID. The tables are
    /// mutated and `GidUpdate` is emitted under one write-lock section so no
    /// event for the new GID can precede the update.
    pub(crate) async fn swap_gid(&self, old_gid: &str, new_gid: &str) -> Option<Uuid> {
        let mut state = self.state.write().await;
        let id = state.gid_to_id.remove(old_gid)?;
        state.gid_to_id.insert(new_gid.to_string(), id);
        if let Some(progress) = state.last_progress.remove(old_gid) {
            state.last_progress.insert(new_gid.to_string(), progress);
        }
        state.active_gids.remove(old_gid);
        state.active_gids.insert(new_gid.to_string());
        info!(download_id = %id, old_gid, new_gid, "metadata gid swapped for real transfer gid");
        self.emit(DownloadEvent::GidUpdate {
            id,
            old_gid: old_gid.to_string(),
            new_gid: new_gid.to_string(),
        })
        .await;
        Some(id)
    }

    /// Fetch metadata for a GID and emit `Meta` when anything was derived.
    pub(crate) async fn emit_meta(&self, id: Uuid, gid: &str, source: &str) {
        match self.fetch_status(gid, &STATUS_KEYS_META).await {
            Ok(status) => {
                self.emit_meta_from_status(id, gid, source, &status).await;
            }
            Err(err) => {
                warn!(gid, error = %err, "failed to fetch metadata after gid swap");
            }
        }
    }

    async fn emit_meta_from_status(&self, id: Uuid, gid: &str, source: &str, status: &Aria2Status) {
        let name = derive_name(Some(status), source);
        let files = project_files(&status.files);
        let files = if files.is_empty() { None } else { Some(files) };
        if name.is_some() || files.is_some() {
            self.emit(DownloadEvent::Meta {
                id,
                gid: gid.to_string(),
                name,
                files,
            })
            .await;
        }
    }

    /// Query the progress fields for a GID and emit `Progress` when the
    /// completed count or speed moved since the last emission. The table
    /// update and the emission share one write-lock section so a concurrent
    /// swap or terminal cleanup cannot interleave.
    pub(crate) async fn emit_progress_snapshot(&self, gid: &str) {
        let status = match self.fetch_status(gid, &STATUS_KEYS_PROGRESS).await {
            Ok(status) => status,
            Err(err) => {
                warn!(gid, error = %err, "progress query failed");
                return;
            }
        };
        let snapshot = ProgressSnapshot {
            completed: parse_decimal(status.completed_length.as_deref()),
            total: parse_decimal(status.total_length.as_deref()),
            speed: parse_decimal(status.download_speed.as_deref()),
        };

        let mut state = self.state.write().await;
        let Some(id) = state.gid_to_id.get(gid).copied() else {
            return;
        };
        if let Some(last) = state.last_progress.get(gid)
            && last.completed == snapshot.completed
            && last.speed == snapshot.speed
        {
            return;
        }
        state.last_progress.insert(gid.to_string(), snapshot);
        self.emit(DownloadEvent::Progress {
            id,
            gid: gid.to_string(),
            completed: snapshot.completed,
            total: snapshot.total,
            speed: snapshot.speed,
        })
        .await;
    }

    pub(crate) async fn fetch_status(
        &self,
        gid: &str,
        keys: &[&str],
    ) -> std::result::Result<Aria2Status, RpcError> {
        self.rpc
            .call("aria2.tellStatus", vec![json!(gid), json!(keys)])
            .await
    }

    /// Handle a completion notification: a metadata GID followed by a real
    /// GID swaps instead of completing.
    pub(crate) async fn handle_complete(&self, gid: &str, id: Uuid) {
        let followed_by = match self.fetch_status(gid, &STATUS_KEYS_META).await {
            Ok(status) => status.followed_by_gid().map(ToString::to_string),
            Err(err) => {
                warn!(gid, error = %err, "status query after completion failed");
                None
            }
        };

        if let Some(new_gid) = followed_by {
            if self.swap_gid(gid, &new_gid).await.is_some() {
                // Re-read the source lazily: metadata-only handles never
                // carry a useful one, so derive purely from engine state.
                self.emit_meta(id, &new_gid, "").await;
            }
            return;
        }

        self.clear_tracking(gid).await;
        self.emit(DownloadEvent::Completed {
            id,
            gid: gid.to_string(),
        })
        .await;
    }

    fn require_gid(download: &Download) -> Result<&str> {
        download
            .gid
            .as_deref()
            .filter(|gid| !gid.is_empty())
            .ok_or_else(|| Error::not_found("gid", download.id.to_string()))
    }
}

#[async_trait]
impl DownloadEngine for Aria2Adapter {
    async fn start(&self, download: &Download) -> Result<String> {
        let params = vec![
            json!([download.source]),
            json!({ "dir": download.target_path }),
        ];
        let gid: String = self
            .rpc
            .call("aria2.addUri", params)
            .await
            .map_err(|err| map_engine_error("aria2.addUri", err))?;

        // The returned GID is a metadata handle for magnets; the real
        // transfer GID arrives in followedBy and is the one worth keeping.
        let status = match self.fetch_status(&gid, &STATUS_KEYS_META).await {
            Ok(status) => Some(status),
            Err(err) => {
                warn!(gid = %gid, error = %err, "status query after addUri failed");
                None
            }
        };
        let real_gid = status
            .as_ref()
            .and_then(Aria2Status::followed_by_gid)
            .map_or_else(|| gid.clone(), ToString::to_string);

        self.track(&real_gid, download.id).await;
        info!(
            download_id = %download.id,
            gid = %real_gid,
            "transfer handed to engine"
        );
        self.emit(DownloadEvent::Started {
            id: download.id,
            gid: real_gid.clone(),
        })
        .await;

        if let Some(status) = &status {
            self.emit_meta_from_status(download.id, &real_gid, &download.source, status)
                .await;
        } else if let Some(name) = derive_name(None, &download.source) {
            self.emit(DownloadEvent::Meta {
                id: download.id,
                gid: real_gid.clone(),
                name: Some(name),
                files: None,
            })
            .await;
        }

        Ok(real_gid)
    }

    async fn pause(&self, download: &Download) -> Result<()> {
        let gid = Self::require_gid(download)?;
        self.rpc
            .call::<String>("aria2.pause", vec![json!(gid)])
            .await
            .map_err(|err| map_engine_error("aria2.pause", err))?;
        self.emit(DownloadEvent::Paused {
            id: download.id,
            gid: gid.to_string(),
        })
        .await;
        Ok(())
    }

    async fn resume(&self, download: &Download) -> Result<()> {
        let gid = Self::require_gid(download)?;
        self.rpc
            .call::<String>("aria2.unpause", vec![json!(gid)])
            .await
            .map_err(|err| map_engine_error("aria2.unpause", err))?;
        self.track(gid, download.id).await;

        // A magnet resumed after metadata completion may already have been
        // followed by the real transfer handle.
        if let Ok(status) = self.fetch_status(gid, &STATUS_KEYS_META).await
            && let Some(new_gid) = status.followed_by_gid().map(ToString::to_string)
            && self.swap_gid(gid, &new_gid).await.is_some()
        {
            self.emit_meta(download.id, &new_gid, &download.source).await;
        }
        Ok(())
    }

    async fn cancel(&self, download: &Download) -> Result<()> {
        let gid = Self::require_gid(download)?;
        if let Err(err) = self
            .rpc
            .call::<String>("aria2.remove", vec![json!(gid)])
            .await
        {
            let mapped = map_engine_error("aria2.remove", err);
            if mapped.kind() == ErrorKind::NotFound {
                // The engine already forgot the handle; drop ours too.
                self.clear_tracking(gid).await;
            }
            return Err(mapped);
        }
        self.clear_tracking(gid).await;
        self.emit(DownloadEvent::Cancelled {
            id: download.id,
            gid: gid.to_string(),
        })
        .await;
        Ok(())
    }

    async fn delete(
        &self,
        download: &Download,
        delete_files: bool,
        files_hint: Option<Vec<String>>,
    ) -> Result<()> {
        if let Some(gid) = download.gid.as_deref().filter(|gid| !gid.is_empty()) {
            match self.cancel(download).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
            // Engine-side result state is cosmetic; failure to purge it must
            // not block the delete.
            if let Err(err) = self
                .rpc
                .call::<String>("aria2.removeDownloadResult", vec![json!(gid)])
                .await
            {
                debug!(gid, error = %err, "failed to purge engine result state");
            }
        }

        if !delete_files {
            return Ok(());
        }

        let engine_files: Option<Vec<PathBuf>> =
            files_hint.map(|paths| paths.into_iter().map(PathBuf::from).collect());
        let basenames: Vec<String> = download
            .files
            .iter()
            .map(|file| file.path.clone())
            .collect();
        let request = RemovalRequest {
            id: download.id,
            target_path: &download.target_path,
            name: download.name.as_deref(),
            file_basenames: &basenames,
            engine_files: engine_files.as_deref(),
            torrent_like: download.is_torrent_like(),
        };
        let report = remove_download(&request).map_err(downpour_core::Error::from)?;
        info!(
            download_id = %download.id,
            removed = report.removed.len(),
            pruned = report.pruned,
            "payload cleanup finished"
        );
        Ok(())
    }

    async fn get_files(&self, gid: &str) -> Result<Vec<String>> {
        let files: Vec<Aria2File> = self
            .rpc
            .call("aria2.getFiles", vec![json!(gid)])
            .await
            .map_err(|err| map_engine_error("aria2.getFiles", err))?;
        Ok(files
            .into_iter()
            .map(|file| file.path)
            .filter(|path| !path.is_empty())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.rpc
            .call::<Value>("aria2.getVersion", Vec::new())
            .await
            .map_err(|err| map_engine_error("aria2.getVersion", err))?;
        Ok(())
    }
}

/// Classify an RPC failure, recognising the engine messages that map onto
/// `Conflict` and `NotFound`. Message matching lives here and nowhere else.
fn map_engine_error(operation: &'static str, err: RpcError) -> Error {
    if let Some(message) = err.engine_message() {
        if is_file_collision(message) {
            return Error::conflict("target file already exists", Some(message.to_string()));
        }
        if is_gid_missing(message) {
            return Error::not_found("gid", message.to_string());
        }
    }
    err.into_core(operation)
}

fn is_file_collision(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("file already exists") || lowered.contains("file exists")
}

fn is_gid_missing(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("not found")
}

/// Derive a display name: engine bittorrent metadata, then the first file's
/// basename, then the magnet `dn` parameter, then the URL path basename.
pub(crate) fn derive_name(status: Option<&Aria2Status>, source: &str) -> Option<String> {
    if let Some(status) = status {
        if let Some(name) = status
            .bittorrent
            .as_ref()
            .and_then(|bt| bt.info.as_ref())
            .and_then(|info| info.name.as_deref())
            .filter(|name| !name.is_empty())
        {
            return Some(name.to_string());
        }
        if let Some(basename) = status
            .files
            .first()
            .map(|file| wire_basename(&file.path))
            .filter(|basename| !basename.is_empty() && *basename != ".")
        {
            return Some(basename.to_string());
        }
    }

    if source.starts_with("magnet:") {
        return magnet_display_name(source);
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        return url_basename(source);
    }
    None
}

fn magnet_display_name(source: &str) -> Option<String> {
    let parsed = Url::parse(source).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "dn")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn url_basename(source: &str) -> Option<String> {
    let parsed = Url::parse(source).ok()?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
}

/// Basename of an engine-reported path; engine paths are `/`-separated.
fn wire_basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Project engine files into the domain shape: basenames only, dropping
/// entries whose basename is empty or `.`; decimal parse failures yield 0.
pub(crate) fn project_files(files: &[Aria2File]) -> Vec<DownloadFile> {
    files
        .iter()
        .filter_map(|file| {
            let basename = wire_basename(&file.path);
            if basename.is_empty() || basename == "." {
                return None;
            }
            Some(DownloadFile {
                path: basename.to_string(),
                length: parse_decimal(file.length.as_deref()),
                completed: parse_decimal(file.completed_length.as_deref()),
            })
        })
        .collect()
}

/// Rewrite the RPC URL into the notification endpoint: same host and path,
/// `ws`/`wss` scheme.
fn notification_url(rpc_url: &str) -> Result<String> {
    rpc_url.strip_prefix("http://").map_or_else(
        || {
            rpc_url.strip_prefix("https://").map_or_else(
                || {
                    Err(Error::conflict(
                        "rpc url must use http or https",
                        Some(rpc_url.to_string()),
                    ))
                },
                |rest| Ok(format!("wss://{rest}")),
            )
        },
        |rest| Ok(format!("ws://{rest}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> Arc<Aria2Adapter> {
        let (events, _rx) = mpsc::channel(EVENT_BUFFER);
        Arc::new(
            Aria2Adapter::new(
                Aria2Config {
                    rpc_url: "http://127.0.0.1:6800/jsonrpc".to_string(),
                    rpc_secret: None,
                    rpc_timeout: Duration::from_millis(3_000),
                    poll_interval: Duration::from_millis(1_000),
                },
                events,
            )
            .expect("adapter builds"),
        )
    }

    #[test]
    fn notification_url_swaps_scheme() {
        assert_eq!(
            notification_url("http://127.0.0.1:6800/jsonrpc").unwrap(),
            "ws://127.0.0.1:6800/jsonrpc"
        );
        assert_eq!(
            notification_url("https://aria2.internal/jsonrpc").unwrap(),
            "wss://aria2.internal/jsonrpc"
        );
        assert!(notification_url("ftp://mirror/jsonrpc").is_err());
    }

    #[test]
    fn engine_message_matchers_classify_known_failures() {
        let collision = RpcError::Engine {
            code: 1,
            message: "File /t/x already exists".to_string(),
        };
        assert_eq!(
            map_engine_error("aria2.addUri", collision).kind(),
            ErrorKind::Conflict
        );

        let missing = RpcError::Engine {
            code: 1,
            message: "GID abc123 is not found".to_string(),
        };
        assert_eq!(
            map_engine_error("aria2.remove", missing).kind(),
            ErrorKind::NotFound
        );

        let other = RpcError::Engine {
            code: 1,
            message: "internal engine failure".to_string(),
        };
        assert_eq!(
            map_engine_error("aria2.pause", other).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn name_derivation_follows_priority_order() {
        let status: Aria2Status = serde_json::from_str(
            r#"{
                "bittorrent": {"info": {"name": "Title"}},
                "files": [{"path": "/t/other/E01.mkv"}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            derive_name(Some(&status), "magnet:?dn=fallback").as_deref(),
            Some("Title")
        );

        let status: Aria2Status =
            serde_json::from_str(r#"{"files": [{"path": "/t/other/E01.mkv"}]}"#).unwrap();
        assert_eq!(
            derive_name(Some(&status), "magnet:?dn=fallback").as_deref(),
            Some("E01.mkv")
        );

        let status: Aria2Status = serde_json::from_str(r#"{"files": [{"path": "."}]}"#).unwrap();
        assert_eq!(
            derive_name(Some(&status), "magnet:?xt=urn:btih:x&dn=Display+Name").as_deref(),
            Some("Display Name")
        );

        assert_eq!(
            derive_name(None, "https://example.org/dist/app.tar.gz").as_deref(),
            Some("app.tar.gz")
        );
        assert_eq!(derive_name(None, "magnet:?xt=urn:btih:x"), None);
    }

    #[test]
    fn files_projection_drops_unusable_basenames_and_parses_lengths() {
        let files = vec![
            Aria2File {
                path: "/t/Show/E01.mkv".to_string(),
                length: Some("2048".to_string()),
                completed_length: Some("1024".to_string()),
            },
            Aria2File {
                path: ".".to_string(),
                length: Some("10".to_string()),
                completed_length: None,
            },
            Aria2File {
                path: String::new(),
                length: None,
                completed_length: None,
            },
            Aria2File {
                path: "/t/Show/E02.mkv".to_string(),
                length: Some("garbage".to_string()),
                completed_length: None,
            },
        ];
        let projected = project_files(&files);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[0].path, "E01.mkv");
        assert_eq!(projected[0].length, 2048);
        assert_eq!(projected[0].completed, 1024);
        assert_eq!(projected[1].path, "E02.mkv");
        assert_eq!(projected[1].length, 0, "parse failures yield zero");
    }

    #[tokio::test]
    async fn swap_moves_every_table_and_emits_gid_update() {
        let (events, mut rx) = mpsc::channel(EVENT_BUFFER);
        let adapter = Aria2Adapter::new(
            Aria2Config {
                rpc_url: "http://127.0.0.1:6800/jsonrpc".to_string(),
                rpc_secret: None,
                rpc_timeout: Duration::from_millis(3_000),
                poll_interval: Duration::from_millis(1_000),
            },
            events,
        )
        .expect("adapter builds");

        let id = Uuid::new_v4();
        adapter.track("metaG", id).await;
        {
            let mut state = adapter.state.write().await;
            state.last_progress.insert(
                "metaG".to_string(),
                ProgressSnapshot {
                    completed: 7,
                    total: 7,
                    speed: 0,
                },
            );
        }

        assert_eq!(adapter.swap_gid("metaG", "realG").await, Some(id));

        let state = adapter.state.read().await;
        assert!(!state.gid_to_id.contains_key("metaG"));
        assert_eq!(state.gid_to_id.get("realG"), Some(&id));
        assert!(state.active_gids.contains("realG"));
        assert!(!state.active_gids.contains("metaG"));
        assert_eq!(
            state.last_progress.get("realG"),
            Some(&ProgressSnapshot {
                completed: 7,
                total: 7,
                speed: 0,
            })
        );
        drop(state);

        match rx.recv().await {
            Some(DownloadEvent::GidUpdate {
                id: event_id,
                old_gid,
                new_gid,
            }) => {
                assert_eq!(event_id, id);
                assert_eq!(old_gid, "metaG");
                assert_eq!(new_gid, "realG");
            }
            other => panic!("expected gid update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn swap_of_unknown_gid_is_ignored() {
        let adapter = adapter();
        assert_eq!(adapter.swap_gid("ghost", "realG").await, None);
        assert!(adapter.lookup("realG").await.is_none());
    }

    #[tokio::test]
    async fn clear_tracking_empties_all_tables() {
        let adapter = adapter();
        let id = Uuid::new_v4();
        adapter.track("g1", id).await;
        assert_eq!(adapter.lookup("g1").await, Some(id));
        assert_eq!(adapter.active_snapshot().await, vec!["g1".to_string()]);

        adapter.clear_tracking("g1").await;
        assert!(adapter.lookup("g1").await.is_none());
        assert!(adapter.active_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn require_gid_rejects_empty_handles() {
        use chrono::Utc;
        use downpour_core::{DesiredStatus, Status};
        let download = Download {
            id: Uuid::new_v4(),
            source: "magnet:?xt=urn:btih:abc".to_string(),
            target_path: "/data".to_string(),
            name: None,
            files: Vec::new(),
            status: Status::Queued,
            desired_status: DesiredStatus::Queued,
            gid: None,
            created_at: Utc::now(),
            fingerprint: "fp".to_string(),
        };
        let err = Aria2Adapter::require_gid(&download).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
