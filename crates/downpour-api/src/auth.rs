//! Bearer-token authentication middleware for the `/v1` routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn require_bearer_token(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let supplied = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match supplied {
        Some(token) if token == state.api_token => Ok(next.run(request).await),
        Some(_) => {
            warn!(path = %request.uri().path(), "rejected request with wrong api token");
            Err(ApiError::unauthorized("invalid api token"))
        }
        None => Err(ApiError::unauthorized("bearer token required")),
    }
}
