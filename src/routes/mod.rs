mod admin;
mod health;
mod inbox;
mod users;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::middleware::{self, auth};
use crate::state::AppState;
use crate::websocket;

/// Assemble the full surface: introspection at the root, the public and
/// guarded API under `/api/v1`, the websocket upgrade at `/ws`.
pub fn build_router(state: AppState) -> Router {
    let introspection = Router::new().route("/health", get(health::health));

    let public_api = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/admin/login", post(admin::login));

    let user_api = Router::new()
        .route("/users/me", get(users::me))
        .route("/inbox/chats", get(inbox::chats))
        .route("/inbox/:id", get(inbox::chat))
        .layer(from_fn_with_state(state.clone(), auth::require_user));

    let admin_api = Router::new()
        .route("/admin/support-requests", get(admin::list_support_requests))
        .route(
            "/admin/support-requests/:id",
            get(admin::get_support_request),
        )
        .layer(from_fn_with_state(state.clone(), auth::require_admin));

    let api_v1 = public_api.merge(user_api).merge(admin_api);

    let router = introspection
        .route("/ws", get(websocket::ws_handler))
        .nest("/api/v1", api_v1);

    middleware::with_defaults(router).with_state(state)
}
