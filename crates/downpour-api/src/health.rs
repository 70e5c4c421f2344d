//! Liveness and readiness endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ApiState;

/// Readiness probes must answer quickly even when the engine hangs.
const READY_PROBE_TIMEOUT: Duration = Duration::from_millis(300);

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn readyz(State(state): State<Arc<ApiState>>) -> Result<&'static str, ApiError> {
    match tokio::time::timeout(READY_PROBE_TIMEOUT, state.handles.engine().ping()).await {
        Ok(Ok(())) => Ok("ready"),
        Ok(Err(err)) => {
            warn!(error = %err, "readiness probe failed");
            Err(ApiError::service_unavailable("engine is unreachable"))
        }
        Err(_) => {
            warn!("readiness probe timed out");
            Err(ApiError::service_unavailable("engine probe timed out"))
        }
    }
}
