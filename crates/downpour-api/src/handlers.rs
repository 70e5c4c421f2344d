//! Download route handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::info;
use uuid::Uuid;

use downpour_core::NewDownload;

use crate::errors::ApiError;
use crate::models::{
    CreateDownloadRequest, DeleteDownloadRequest, DownloadView, PatchDownloadRequest,
};
use crate::state::ApiState;

pub(crate) async fn list_downloads(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<DownloadView>>, ApiError> {
    let downloads = state.handles.inspector().list().await?;
    Ok(Json(downloads.into_iter().map(DownloadView::from).collect()))
}

pub(crate) async fn get_download(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadView>, ApiError> {
    let download = state.handles.inspector().get(id).await?;
    Ok(Json(DownloadView::from(download)))
}

pub(crate) async fn create_download(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CreateDownloadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(map_json_rejection)?;
    let outcome = state
        .handles
        .workflow()
        .add(NewDownload {
            source: request.source,
            target_path: request.target_path,
            desired_status: request.desired_status.map(Into::into),
        })
        .await?;

    info!(
        download_id = %outcome.download.id,
        created = outcome.created,
        "download admission handled"
    );
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DownloadView::from(outcome.download))).into_response())
}

pub(crate) async fn patch_download(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<PatchDownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadView>, ApiError> {
    let Json(request) = payload.map_err(map_json_rejection)?;
    let download = state
        .handles
        .workflow()
        .update_desired_status(id, request.desired_status.into())
        .await?;
    Ok(Json(DownloadView::from(download)))
}

pub(crate) async fn delete_download(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let request = parse_delete_body(&headers, &body)?;
    state
        .handles
        .workflow()
        .delete(id, request.delete_files)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The delete body is optional; when present it must be JSON and well
/// formed. Malformed bodies and foreign content types are a 400 here, not a
/// 415, because the body itself is optional.
fn parse_delete_body(headers: &HeaderMap, body: &Bytes) -> Result<DeleteDownloadRequest, ApiError> {
    if body.is_empty() {
        return Ok(DeleteDownloadRequest::default());
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("application/json") {
        return Err(ApiError::bad_request(
            "delete body must be application/json",
        ));
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("malformed delete body: {err}")))
}

/// One mapping for every JSON extraction failure. Oversized bodies are a
/// 400 per the API contract, and only a wrong content type earns a 415.
fn map_json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(rejection) => {
            ApiError::unsupported_media_type(rejection.body_text())
        }
        JsonRejection::JsonDataError(rejection) => ApiError::bad_request(rejection.body_text()),
        JsonRejection::JsonSyntaxError(rejection) => ApiError::bad_request(rejection.body_text()),
        JsonRejection::BytesRejection(rejection) => ApiError::bad_request(rejection.body_text()),
        other => ApiError::bad_request(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_body_parsing_covers_the_contract() {
        let empty = HeaderMap::new();
        let parsed = parse_delete_body(&empty, &Bytes::new()).expect("empty body ok");
        assert!(!parsed.delete_files);

        let mut json_headers = HeaderMap::new();
        json_headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        let parsed = parse_delete_body(&json_headers, &Bytes::from(r#"{"deleteFiles":true}"#))
            .expect("json body ok");
        assert!(parsed.delete_files);

        let err = parse_delete_body(&json_headers, &Bytes::from("{nope"))
            .expect_err("malformed body rejected");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut text_headers = HeaderMap::new();
        text_headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        let err = parse_delete_body(&text_headers, &Bytes::from("deleteFiles"))
            .expect_err("foreign content type rejected");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = parse_delete_body(&json_headers, &Bytes::from(r#"{"deleteFiles":true,"x":1}"#))
            .expect_err("unknown field rejected");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
