use axum::response::IntoResponse;
use thiserror::Error;

use crate::middleware::error_handling;

pub type AppResult<T> = Result<T, AppError>;

/// Failures raised while establishing or checking a caller's identity.
///
/// These map onto the wire codes the clients already understand, so the
/// variants stay coarse on purpose.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token could not be decoded or its signature did not verify.
    #[error("malformed session token")]
    MalformedToken,

    /// The credentials inside a well-formed token (or login body) did not
    /// match a stored principal.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No principal could be established for the request at all.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The caller is known but lacks the required role.
    #[error("not authorized")]
    Forbidden,

    /// The credential backend itself failed; distinct from a bad credential.
    #[error("auth backend failure: {0}")]
    Server(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("resource already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error renders as.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Auth(AuthError::Forbidden) => 403,
            AppError::Auth(AuthError::Server(_)) => 500,
            AppError::Auth(_) => 401,
            AppError::Validation(_) | AppError::BadRequest(_) => 400,
            AppError::NotFound => 404,
            AppError::Conflict => 409,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Internal(_) => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        error_handling::into_response(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        assert_eq!(AppError::Auth(AuthError::MalformedToken).status_code(), 401);
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status_code(),
            401
        );
        assert_eq!(
            AppError::Auth(AuthError::NotAuthenticated).status_code(),
            401
        );
        assert_eq!(AppError::Auth(AuthError::Forbidden).status_code(), 403);
        assert_eq!(
            AppError::Auth(AuthError::Server("boom".into())).status_code(),
            500
        );
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(AppError::NotFound.status_code(), 404);
        assert_eq!(AppError::Conflict.status_code(), 409);
        assert_eq!(AppError::BadRequest("nope".into()).status_code(), 400);
        assert_eq!(AppError::Internal("broken".into()).status_code(), 500);
    }
}
