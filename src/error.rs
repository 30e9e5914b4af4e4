use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("Invalid or missing token")]
    AuthenticationFailed,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    UpstreamCallFailed(String),

    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    pub fn upstream(error: anyhow::Error) -> Self {
        AppError::UpstreamCallFailed(error.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ConfigurationMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamCallFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
