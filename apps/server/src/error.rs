// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use layout_lite_core::LayoutError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing field '{0}' in request")]
    MissingField(&'static str),

    #[error("File too large: maximum size is {max_mb} MB")]
    FileTooLarge { max_mb: usize },

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Inference is not configured (set INFERENCE_URL)")]
    InferenceUnavailable,

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    /// Status code and machine-readable code for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            ApiError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, "MULTIPART_ERROR"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Layout(err) => match err {
                LayoutError::Image(_) | LayoutError::Json(_) | LayoutError::ShapeMismatch { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_INPUT")
                }
                LayoutError::Io(_) | LayoutError::Geometry(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR")
                }
                _ => (StatusCode::UNPROCESSABLE_ENTITY, "LAYOUT_ERROR"),
            },
            ApiError::InferenceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "INFERENCE_UNAVAILABLE"),
            ApiError::Inference(_) => (StatusCode::BAD_GATEWAY, "INFERENCE_ERROR"),
            ApiError::Cache(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<layout_lite_geometry::Error> for ApiError {
    fn from(err: layout_lite_geometry::Error) -> Self {
        ApiError::Layout(LayoutError::Geometry(err))
    }
}

impl From<cacache::Error> for ApiError {
    fn from(err: cacache::Error) -> Self {
        ApiError::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Inference(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_errors_map_to_client_statuses() {
        let err = ApiError::from(LayoutError::InsufficientPeaks {
            found: 2,
            required: 4,
        });
        assert_eq!(err.status(), (StatusCode::UNPROCESSABLE_ENTITY, "LAYOUT_ERROR"));

        let err = ApiError::from(LayoutError::ShapeMismatch {
            what: "boundary channels",
            expected: "2".into(),
            found: "3".into(),
        });
        assert_eq!(err.status().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_inference_is_unavailable() {
        assert_eq!(
            ApiError::InferenceUnavailable.status().0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
