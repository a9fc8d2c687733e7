//! HTTP mapping of store outcomes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use a1_core::error::{A1Error, ErrorKind};

#[derive(Debug)]
pub enum ApiError {
    Store(A1Error),
    Body(JsonRejection),
    Path(PathRejection),
}

impl From<A1Error> for ApiError {
    fn from(e: A1Error) -> Self {
        ApiError::Store(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::Path(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Body(e)
    }
}

/// Conflicts are 400 on A1-P: the caller sent something redundant or inconsistent.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Conflict | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Store(e) => {
                let kind = e.kind();
                (status_for(kind), kind.as_str(), e.to_string())
            }
            ApiError::Body(JsonRejection::MissingJsonContentType(e)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE", e.body_text())
            }
            ApiError::Body(e) => (StatusCode::BAD_REQUEST, ErrorKind::BadRequest.as_str(), e.body_text()),
            ApiError::Path(e) if e.status().is_client_error() => {
                (StatusCode::BAD_REQUEST, ErrorKind::BadRequest.as_str(), e.body_text())
            }
            ApiError::Path(e) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal.as_str(), e.body_text()),
        };
        let body = Json(json!({
            "error": code,
            "message": message,
        }));
        (status, body).into_response()
    }
}
