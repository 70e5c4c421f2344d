//! Structured API error with a single kind-to-status mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use downpour_core::ErrorKind;

/// API-facing error: constant title, optional detail, response status.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    title: &'static str,
    detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl ApiError {
    const fn new(status: StatusCode, title: &'static str) -> Self {
        Self {
            status,
            title,
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication required").with_detail(detail)
    }

    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "resource not found").with_detail(detail)
    }

    pub(crate) fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict").with_detail(detail)
    }

    pub(crate) fn unsupported_media_type(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported media type",
        )
        .with_detail(detail)
    }

    pub(crate) fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service unavailable").with_detail(detail)
    }

    pub(crate) fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "engine unavailable").with_detail(detail)
    }

    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error").with_detail(detail)
    }
}

impl From<downpour_core::Error> for ApiError {
    fn from(error: downpour_core::Error) -> Self {
        let detail = error.to_string();
        match error.kind() {
            ErrorKind::NotFound => Self::not_found(detail),
            // A containment refusal is a deliberate conflict with stored
            // state, not a malformed request.
            ErrorKind::Conflict | ErrorKind::OutsideBase => Self::conflict(detail),
            ErrorKind::BadStatus
            | ErrorKind::InvalidSource
            | ErrorKind::InvalidTarget
            | ErrorKind::Decode => Self::bad_request(detail),
            ErrorKind::Transport => Self::bad_gateway(detail),
            ErrorKind::Fatal => Self::internal(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.title,
            detail: self.detail.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downpour_core::Error;

    #[test]
    fn core_kinds_map_to_expected_statuses() {
        let cases = [
            (
                Error::not_found("download", "x"),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::conflict("fingerprint already exists", None),
                StatusCode::CONFLICT,
            ),
            (
                Error::BadStatus {
                    value: "bogus".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (Error::InvalidSource, StatusCode::BAD_REQUEST),
            (Error::InvalidTarget, StatusCode::BAD_REQUEST),
            (
                Error::OutsideBase {
                    path: "/etc".into(),
                    base: "/data".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                Error::transport("addUri", std::io::Error::other("down")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Error::Fatal {
                    detail: "bad row".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status, expected);
        }
    }
}
