//! Error types for lafz-server
//!
//! Every failure aborts the request with a single JSON error response.
//! Client mistakes map to 4xx; tool and internal failures map to 5xx.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Multipart body could not be read (status chosen by axum, e.g. 413)
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Transcoder or aligner failed
    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    /// Transcoder or aligner exceeded its time budget and was killed
    #[error("{tool} did not finish within {seconds}s")]
    ToolTimeout { tool: String, seconds: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// lafz-common error
    #[error(transparent)]
    Common(#[from] lafz_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use lafz_common::Error as Common;

        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(err) => err.status(),
            ApiError::ToolTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Common(Common::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Common(Common::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::ExternalTool { .. }
            | ApiError::Io(_)
            | ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        use lafz_common::Error as Common;

        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Multipart(_) => "MULTIPART_ERROR",
            ApiError::ExternalTool { .. } => "EXTERNAL_TOOL_ERROR",
            ApiError::ToolTimeout { .. } => "TOOL_TIMEOUT",
            ApiError::Io(_) => "IO_ERROR",
            ApiError::Common(err) => match err {
                Common::Validation(_) => "VALIDATION_ERROR",
                Common::NotFound(_) => "NOT_FOUND",
                Common::Io(_) => "IO_ERROR",
                Common::Parse(_) => "PARSE_ERROR",
                Common::Mismatch { .. } => "MISMATCH_ERROR",
                Common::Corpus(_) => "CORPUS_ERROR",
                Common::Config(_) => "CONFIG_ERROR",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, "{}", message);
        } else {
            tracing::warn!(status = status.as_u16(), code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
