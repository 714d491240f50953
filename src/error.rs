use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// ApiError
///
/// The application-wide error taxonomy. Every failure a handler can surface is
/// one of these variants, each carrying a stable machine-readable kind and a
/// human-readable message. Internal details (store errors, cipher errors) are
/// logged where they occur and never placed in the message.
///
/// Per-record decryption failures during bulk scans are deliberately *not*
/// represented here: they are isolated inside the catalog's scan pipeline and
/// never become the outcome of an operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// No valid identity was presented. Maps to 401.
    #[error("Please authenticate using a valid token.")]
    Unauthorized,

    /// Authenticated, but the role or ownership check failed. Maps to 403.
    #[error("{0}")]
    Forbidden(String),

    /// The referenced record does not exist. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// The underlying persistence layer failed. Maps to a generic 500.
    #[error("The record store is currently unavailable.")]
    StoreUnavailable,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Stable machine-readable kind, part of the public error contract.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable => "store_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorBody
///
/// The JSON envelope every error response uses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Stable machine-readable kind (e.g., "validation", "forbidden").
    pub kind: String,
    /// Human-readable description of the failure.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            kind: self.kind().to_string(),
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
