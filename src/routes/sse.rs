use axum::{Router, extract::State, http::HeaderMap, routing::get};
use tracing::info;

use crate::{
    error::AppError,
    routes::admin::ADMIN_SECRET_HEADER,
    services::sse_service::{self, EventStream},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime session, question, and leaderboard snapshots.
pub async fn public_stream(State(state): State<SharedState>) -> EventStream {
    info!("new public SSE connection");
    sse_service::subscribe_public(&state).await
}

#[utoipa::path(
    get,
    path = "/sse/admin",
    tag = "sse",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Admin SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream the same snapshots to the host, gated by the admin secret.
pub async fn admin_stream(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<EventStream, AppError> {
    let provided = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized(format!("missing `{ADMIN_SECRET_HEADER}` header"))
        })?;
    if provided != state.config().admin_secret() {
        return Err(AppError::Unauthorized("invalid admin secret".into()));
    }

    info!("new admin SSE connection");
    Ok(sse_service::subscribe_admin(&state).await)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/public", get(public_stream))
        .route("/sse/admin", get(admin_stream))
}
