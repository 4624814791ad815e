//! Error handling utilities for route handlers
//!
//! Handlers return `ApiError`, which renders as `{"detail": "..."}` with the
//! matching status code.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clipguard_policy::PolicyError;
use serde_json::json;

use crate::pipeline::PipelineError;
use crate::services::video_url::InvalidVideoUrl;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::Rejected(_) => StatusCode::BAD_REQUEST,
            PipelineError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Unavailable(_) | PipelineError::InvalidResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        ApiError::new(status, err.to_string())
    }
}

/// The pipeline handed back numbers the policy refuses to decide on.
impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            format!("Analysis produced an invalid result: {err}"),
        )
    }
}

impl From<InvalidVideoUrl> for ApiError {
    fn from(err: InvalidVideoUrl) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), err.body_text())
    }
}

/// The request body was not a multipart form at all
impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

/// Bad JSON, wrong content type, or missing fields
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

/// Extension trait for logging errors and converting to `ApiError`
pub trait LogErr<T, E> {
    /// Log error with context and convert it with its `From` mapping
    fn log_api(self, context: &str) -> Result<T, ApiError>
    where
        E: Into<ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T, E> for Result<T, E> {
    fn log_api(self, context: &str) -> Result<T, ApiError>
    where
        E: Into<ApiError>,
    {
        self.map_err(|e| {
            let err: ApiError = e.into();
            log_at(err.status, context, &err.detail);
            err
        })
    }
}

/// Client mistakes are warnings; anything upstream or internal is an error.
fn log_at(status: StatusCode, context: &str, err: &dyn std::fmt::Display) {
    if status.is_client_error() {
        log::warn!("{}: {}", context, err);
    } else {
        log::error!("{}: {}", context, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_gateway_statuses() {
        let cases = [
            (PipelineError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                PipelineError::Unavailable("connection refused".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                PipelineError::InvalidResponse("missing field".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                PipelineError::Rejected("Live videos are not supported".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn rejected_detail_is_passed_through() {
        let err = ApiError::from(PipelineError::Rejected("Video is private".into()));
        assert_eq!(err.detail, "Video is private");
    }

    #[test]
    fn log_api_uses_from_mapping() {
        let result: Result<(), InvalidVideoUrl> = Err(InvalidVideoUrl::Unrecognized);
        let err = result.log_api("[test] Bad URL").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "Invalid YouTube URL format");
    }

    #[tokio::test]
    async fn renders_detail_body() {
        let response = ApiError::bad_request("File must be a video").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "detail": "File must be a video" }));
    }
}
