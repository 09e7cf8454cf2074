use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AuthError};

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub code: &'static str,
    pub message: String,
}

/// Map an error to its status and non-leaking wire body. Codes are stable
/// strings the clients switch on.
pub fn map_error(err: &AppError) -> (StatusCode, ErrorBody) {
    let (status, code, message) = match err {
        AppError::Auth(AuthError::MalformedToken) => (
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            "Invalid token".to_string(),
        ),
        AppError::Auth(AuthError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid credentials".to_string(),
        ),
        AppError::Auth(AuthError::NotAuthenticated) => (
            StatusCode::UNAUTHORIZED,
            "NOT_AUTHENTICATED",
            "Not authenticated".to_string(),
        ),
        AppError::Auth(AuthError::Forbidden) => (
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "Not authorized".to_string(),
        ),
        AppError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, "VALIDATION", errors.to_string())
        }
        AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, "VALIDATION", message.clone()),
        AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found".to_string()),
        AppError::Conflict => (
            StatusCode::CONFLICT,
            "USER_EXISTS",
            "User already exists in platform.".to_string(),
        ),
        AppError::Auth(AuthError::Server(_))
        | AppError::Database(_)
        | AppError::Migration(_)
        | AppError::Config(_)
        | AppError::Io(_)
        | AppError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVER_ERROR",
            "Server error".to_string(),
        ),
    };
    (
        status,
        ErrorBody {
            ok: false,
            code,
            message,
        },
    )
}

/// Render `err` as its JSON envelope. Internal detail goes to the log, never
/// to the client.
pub fn into_response(err: AppError) -> Response {
    if err.status_code() >= 500 {
        tracing::error!(error = %err, "request failed");
    }
    let (status, body) = map_error(&err);
    (status, Json(body)).into_response()
}
