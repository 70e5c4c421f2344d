//! Periodic progress poller over the active GID set.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::adapter::Aria2Adapter;

/// Poll progress for every active GID until `shutdown` fires. Change
/// suppression and RPC error tolerance live in the adapter's snapshot
/// helper; a failed poll round never stops the loop.
pub(crate) async fn run(
    adapter: Arc<Aria2Adapter>,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for gid in adapter.active_snapshot().await {
                    adapter.emit_progress_snapshot(&gid).await;
                }
            }
            _ = &mut shutdown => return,
        }
    }
}
