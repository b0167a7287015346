use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::public::{ActiveQuestionView, LeaderboardResponse, SessionView},
    error::AppError,
    services::public_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/public/session",
    tag = "public",
    responses((status = 200, description = "Current session phase", body = SessionView))
)]
/// Return the session document as participants see it.
pub async fn get_session(State(state): State<SharedState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(public_service::session_view(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/question",
    tag = "public",
    responses((status = 200, description = "Currently released question, null outside the active phase", body = ActiveQuestionView))
)]
/// Return the released question with the correct answer withheld.
pub async fn get_current_question(
    State(state): State<SharedState>,
) -> Result<Json<Option<ActiveQuestionView>>, AppError> {
    Ok(Json(public_service::current_question(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/leaderboard",
    tag = "public",
    responses((status = 200, description = "Ranked standings", body = LeaderboardResponse))
)]
/// Return the leaderboard over active participants.
pub async fn get_leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(public_service::leaderboard(&state).await?))
}

/// Configure the public read-only subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/public/session", get(get_session))
        .route("/public/question", get(get_current_question))
        .route("/public/leaderboard", get(get_leaderboard))
}
