use crate::models::Envelope;
use axum::{http::StatusCode, Json};
use thiserror::Error;
use tracing::error;

/// Failures raised by the owner-scoped store operations.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Logs the cause; the caller only ever sees a generic message.
    pub fn internal(err: impl std::error::Error) -> Self {
        error!("internal error: {err}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!")
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::not_found(err.to_string()),
            StoreError::Conflict(message) => Self::conflict(message),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Envelope::<()> {
            has_errors: true,
            message: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}
