//! HTTP-facing request errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::conversion::ConversionError;
use crate::rpc::RpcError;

/// Request-scoped failures, each with its own status and code
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No endpoint is registered for the path
    #[error("no endpoint for {0}")]
    UnknownEndpoint(String),

    /// A supplied value failed its parameter's conversion
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A structured call is missing a required argument
    #[error("{0}")]
    MissingArgument(String),

    /// The node failed or rejected the command
    #[error("{0}")]
    Remote(RpcError),

    /// The page template could not be rendered
    #[error("render failed: {0}")]
    Render(String),
}

impl From<RpcError> for ApiError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::Argument(message) => Self::MissingArgument(message),
            other => Self::Remote(other),
        }
    }
}

impl ApiError {
    /// HTTP status for this failure
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
            Self::Conversion(_) | Self::MissingArgument(_) => StatusCode::BAD_REQUEST,
            Self::Remote(_) => StatusCode::BAD_GATEWAY,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownEndpoint(_) => "unknown_endpoint",
            Self::Conversion(_) => "conversion_failed",
            Self::MissingArgument(_) => "missing_argument",
            Self::Remote(_) => "remote_error",
            Self::Render(_) => "render_failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
