use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{NewPrincipal, Profile, Role};
use crate::security::password;
use crate::services::SessionService;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Password policy beyond the length floor: ASCII letters and digits only,
/// at least one of each, confirmation equal.
fn check_password_policy(req: &RegisterRequest) -> Result<(), AppError> {
    let pw = &req.password;
    let alnum = pw.chars().all(|c| c.is_ascii_alphanumeric());
    let has_letter = pw.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = pw.chars().any(|c| c.is_ascii_digit());
    if !(alnum && has_letter && has_digit) {
        return Err(AppError::BadRequest(
            "password must be letters and digits, with at least one of each".into(),
        ));
    }
    if req.password != req.password_confirmation {
        return Err(AppError::BadRequest(
            "password confirmation does not match".into(),
        ));
    }
    Ok(())
}

/// `POST /api/v1/users/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;
    check_password_policy(&req)?;

    if state
        .principals
        .find_by_email(&req.email, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict);
    }

    let (salt, hash) = password::new_credential(&req.password);
    let principal = state
        .principals
        .insert(NewPrincipal {
            name: req.name,
            email: req.email,
            password_hash: hash,
            salt,
            role: Role::User,
        })
        .await?;
    tracing::info!(principal = %principal.id, "principal registered");
    Ok(Json(json!({ "ok": true, "uid": principal.id })))
}

/// `POST /api/v1/users/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;
    let token = SessionService::login(
        state.principals.as_ref(),
        &state.token_codec,
        &req.email,
        &req.password,
        None,
    )
    .await?;
    Ok(Json(
        json!({ "ok": true, "authorization": format!("Basic {}", token) }),
    ))
}

/// `GET /api/v1/users/me`
pub async fn me(Extension(profile): Extension<Profile>) -> Json<Value> {
    Json(json!({ "ok": true, "user": profile }))
}
