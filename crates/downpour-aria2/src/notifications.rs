//! WebSocket notification consumer — subscribes to the engine's event
//! socket and translates notifications into adapter events.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use downpour_core::DownloadEvent;

use crate::adapter::Aria2Adapter;
use crate::types::Notification;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Consume the engine notification stream until `shutdown` fires,
/// reconnecting with a fixed delay when the socket drops.
pub(crate) async fn run(
    adapter: Arc<Aria2Adapter>,
    url: String,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let stream = tokio::select! {
            connection = tokio_tungstenite::connect_async(&url) => connection,
            _ = &mut shutdown => return,
        };
        let ws = match stream {
            Ok((ws, _)) => {
                info!(url = %url, "notification stream connected");
                ws
            }
            Err(err) => {
                warn!(url = %url, error = %err, "notification connect failed; retrying");
                tokio::select! {
                    () = tokio::time::sleep(RECONNECT_DELAY) => continue,
                    _ = &mut shutdown => return,
                }
            }
        };

        let (_, mut read) = ws.split();
        loop {
            tokio::select! {
                message = read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            dispatch(&adapter, &text).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "notification stream closed by engine");
                            break;
                        }
                        Some(Ok(_)) => {} // Ping/Pong/Binary
                        Some(Err(err)) => {
                            warn!(error = %err, "notification stream error");
                            break;
                        }
                        None => {
                            info!("notification stream ended");
                            break;
                        }
                    }
                }
                _ = &mut shutdown => return,
            }
        }

        tokio::select! {
            () = tokio::time::sleep(RECONNECT_DELAY) => {}
            _ = &mut shutdown => return,
        }
    }
}

/// Parse one socket frame into `(method, gid)`; frames that do not carry a
/// GID are skipped.
pub(crate) fn parse_frame(text: &str) -> Option<(String, String)> {
    let notification: Notification = serde_json::from_str(text).ok()?;
    let gid = notification
        .params
        .first()
        .map(|param| param.gid.clone())
        .filter(|gid| !gid.is_empty())?;
    // The engine prefixes methods with its own namespace.
    let method = notification
        .method
        .strip_prefix("aria2.")
        .unwrap_or(&notification.method)
        .to_string();
    Some((method, gid))
}

async fn dispatch(adapter: &Arc<Aria2Adapter>, text: &str) {
    let Some((method, gid)) = parse_frame(text) else {
        debug!("skipping unparseable notification frame");
        return;
    };
    // Events for GIDs we no longer track may arrive after local cleanup.
    let Some(id) = adapter.lookup(&gid).await else {
        debug!(gid = %gid, method = %method, "notification for untracked gid ignored");
        return;
    };

    match method.as_str() {
        "onDownloadStart" => {
            adapter.emit_progress_snapshot(&gid).await;
        }
        "onDownloadPause" => {
            adapter
                .emit(DownloadEvent::Paused {
                    id,
                    gid: gid.clone(),
                })
                .await;
            adapter.emit_progress_snapshot(&gid).await;
        }
        "onDownloadStop" => {
            adapter.clear_tracking(&gid).await;
            adapter.emit(DownloadEvent::Cancelled { id, gid }).await;
        }
        "onDownloadComplete" => {
            adapter.handle_complete(&gid, id).await;
        }
        "onDownloadError" => {
            adapter.clear_tracking(&gid).await;
            adapter.emit(DownloadEvent::Failed { id, gid }).await;
        }
        other => {
            debug!(method = other, gid = %gid, "unhandled notification method");
        }
    }
}
