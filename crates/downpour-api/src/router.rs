//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer_token;
use crate::handlers::{
    create_download, delete_download, get_download, list_downloads, patch_download,
};
use crate::health::{healthz, readyz};
use crate::state::{ApiState, DownloadHandles};

/// Request bodies are capped at 1 MiB.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Axum router wrapper hosting the downpour API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server with shared handles and the API bearer token.
    #[must_use]
    pub fn new(handles: DownloadHandles, api_token: String) -> Self {
        let state = Arc::new(ApiState::new(handles, api_token));
        let require_auth = middleware::from_fn_with_state(state.clone(), require_bearer_token);

        let v1 = Router::new()
            .route("/v1/downloads", get(list_downloads).post(create_download))
            .route(
                "/v1/downloads/{id}",
                get(get_download)
                    .patch(patch_download)
                    .delete(delete_download),
            )
            .route_layer(require_auth)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

        let router = Router::new()
            .route("/healthz", get(healthz))
            .route("/readyz", get(readyz))
            .merge(v1)
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }

    /// Serve the API on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server
    /// terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> std::io::Result<()> {
        tracing::info!(addr = %addr, "starting api listener");
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service()).await
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }
}
