use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{AppError, AuthError};
use crate::models::{Profile, Role};
use crate::services::SessionService;
use crate::state::AppState;

/// Guard for user-scoped routes: resolve the Authorization header through the
/// session validator and stash the sanitized profile in request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let profile = resolve(&state, req.headers(), None).await?;
    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}

/// Guard for admin-scoped routes. Same path as [`require_user`] with the
/// lookup constrained to admins.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let profile = resolve(&state, req.headers(), Some(Role::Admin)).await?;
    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}

async fn resolve(
    state: &AppState,
    headers: &HeaderMap,
    required_role: Option<Role>,
) -> Result<Profile, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::NotAuthenticated)?;
    let profile = SessionService::authenticate(
        state.principals.as_ref(),
        &state.token_codec,
        header,
        required_role,
    )
    .await?;
    Ok(profile)
}
