use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{PublicProfile, Role, SupportRequest};
use crate::services::SessionService;
use crate::state::AppState;

use super::users::LoginRequest;

/// `POST /api/v1/admin/login`: the user login flow with the lookup filtered
/// to admins. A valid non-admin credential fails like an unknown one.
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
        Some(Role::Admin),
    )
    .await?;
    Ok(Json(
        json!({ "ok": true, "authorization": format!("Basic {}", token) }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A ticket with its requesting user embedded, push token and credentials
/// stripped.
#[derive(Debug, Serialize)]
struct SupportRequestView {
    #[serde(flatten)]
    request: SupportRequest,
    user: Option<PublicProfile>,
}

/// `GET /api/v1/admin/support-requests`
pub async fn list_support_requests(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Value>> {
    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination.limit.unwrap_or(10).clamp(1, 100);
    let offset = limit * (page - 1);

    let rows = state.support.list(limit, offset).await?;
    let count = state.support.count().await?;

    let mut requests = Vec::with_capacity(rows.len());
    for request in rows {
        let user = state
            .principals
            .find_by_id(request.user_id)
            .await?
            .map(|p| p.public());
        requests.push(SupportRequestView { request, user });
    }

    Ok(Json(json!({
        "ok": true,
        "requests": requests,
        "page": page,
        "limit": limit,
        "count": count,
    })))
}

/// `GET /api/v1/admin/support-requests/:id`
pub async fn get_support_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let request = state.support.find(id).await?.ok_or(AppError::NotFound)?;
    let user = state
        .principals
        .find_by_id(request.user_id)
        .await?
        .map(|p| p.public());
    let view = SupportRequestView { request, user };
    Ok(Json(json!({ "ok": true, "request": view })))
}
