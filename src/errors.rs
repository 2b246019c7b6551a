use crate::api::models::monitor::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Rejected control or switch operation (wrong daemon state, invalid or
    /// unreachable target). The message is the operator-facing explanation.
    #[error("{message}")]
    InvalidOperation { message: String },

    /// The DNS provider refused or failed a record rewrite.
    #[error("{message}")]
    SwitchFailed { message: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidOperation { message: message.into() }
    }

    pub fn switch_failed(message: impl Into<String>) -> Self {
        Error::SwitchFailed { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidOperation { .. } => StatusCode::BAD_REQUEST,
            Error::SwitchFailed { .. } => StatusCode::BAD_GATEWAY,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::InvalidOperation { .. } => tracing::debug!("Rejected operation: {}", self),
            Error::SwitchFailed { .. } => tracing::warn!("DNS switch failure: {}", self),
            Error::Other(_) => tracing::error!("Internal service error: {:#}", self),
        }

        let body = match &self {
            Error::Other(_) => ApiResponse::error("Internal server error"),
            _ => ApiResponse::error(self.to_string()),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
