use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::state::AppState;

/// Attach per-request tracing: one span per request, status and latency
/// logged on the way out.
pub fn add_tracing(router: Router<AppState>) -> Router<AppState> {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::span!(Level::INFO, "http", %method, %uri)
            })
            .on_response(
                |res: &axum::http::Response<axum::body::Body>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    tracing::info!(
                        status = %res.status(),
                        elapsed_ms = latency.as_millis() as u64,
                        "response"
                    );
                },
            ),
    )
}
