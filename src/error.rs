//! Authentication Error Types
//!
//! Centralized error handling for all authentication operations.

use crate::store::{StoreError, UniqueField};
use crate::token::TokenError;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameExists,

    #[error("Email already registered")]
    EmailExists,

    #[error("{0} already exists")]
    Conflict(String),

    /// Shared by unknown usernames and wrong passwords
    #[error("Username or password is incorrect")]
    InvalidCredentials,

    #[error("No access token provided")]
    MissingToken,

    #[error("Invalid or expired access token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body could not be read, e.g. it exceeds the size limit
    #[error("{1}")]
    Body(StatusCode, String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UsernameExists | AuthError::EmailExists | AuthError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Body(status, _) => *status,
            AuthError::Database(_) | AuthError::Config(_) | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code returned in the `error` field
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::UsernameExists => "username_exists",
            AuthError::EmailExists => "email_exists",
            AuthError::Conflict(_) => "conflict",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingToken => "unauthorized",
            AuthError::InvalidToken => "invalid_token",
            AuthError::UserNotFound => "user_not_found",
            AuthError::Body(..) => "invalid_body",
            AuthError::Database(_) | AuthError::Config(_) | AuthError::Internal => {
                "internal_error"
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            AuthError::Validation(msg) => {
                tracing::info!(status = status.as_u16(), code, "Request rejected");
                msg.clone()
            }
            AuthError::Database(_) | AuthError::Config(_) | AuthError::Internal => {
                tracing::error!(error = %self, "Request failed with a system error");
                "An internal error occurred".to_string()
            }
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::UserNotFound => {
                tracing::debug!(status = status.as_u16(), code, "Request rejected");
                self.to_string()
            }
            _ => {
                tracing::info!(status = status.as_u16(), code, error = %self, "Request rejected");
                self.to_string()
            }
        };

        (
            status,
            Json(serde_json::json!({
                "error": code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(UniqueField::Username) => AuthError::UsernameExists,
            StoreError::Duplicate(UniqueField::Email) => AuthError::EmailExists,
            StoreError::Duplicate(field) => AuthError::Conflict(field.to_string()),
            StoreError::Backend(msg) => {
                tracing::error!("Storage error: {}", msg);
                AuthError::Database(msg)
            }
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        tracing::debug!(reason = ?err, "Access token rejected");
        AuthError::InvalidToken
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_) => {
                AuthError::Validation(rejection.body_text())
            }
            other => AuthError::Body(other.status(), other.body_text()),
        }
    }
}
