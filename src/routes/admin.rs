use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::{
            ActionResponse, AddQuestionRequest, NextQuestionResponse, QuestionSummary,
            SessionSummary, StartGameResponse, UpdateQuestionRequest,
        },
        public::LeaderboardResponse,
    },
    error::AppError,
    services::{admin_service, question_service},
    state::SharedState,
};

/// Header carrying the shared admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Admin-only endpoints for driving the session and managing questions.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/session", get(get_session))
        .route("/admin/session/initialize", post(initialize_session))
        .route("/admin/session/registration/open", post(open_registration))
        .route(
            "/admin/session/registration/close",
            post(close_registration),
        )
        .route("/admin/session/start", post(start_game))
        .route("/admin/session/next", post(next_question))
        .route("/admin/session/end", post(end_game))
        .route("/admin/session/reset", post(reset_game))
        .route("/admin/questions", get(list_questions).post(add_question))
        .route(
            "/admin/questions/{id}",
            put(update_question).delete(delete_question),
        )
        .route("/admin/leaderboard", get(get_leaderboard))
        .route_layer(middleware::from_fn_with_state(state, require_admin_secret))
}

#[utoipa::path(
    get,
    path = "/admin/session",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Session document", body = SessionSummary))
)]
/// Retrieve the session document as the host sees it.
pub async fn get_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(admin_service::session_summary(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/initialize",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Session created or already present", body = SessionSummary))
)]
/// Create the singleton session document. Idempotent.
pub async fn initialize_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(admin_service::initialize(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/registration/open",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Registration opened", body = SessionSummary))
)]
/// Open registration, starting a fresh round.
pub async fn open_registration(
    State(state): State<SharedState>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(admin_service::open_registration(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/registration/close",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses(
        (status = 200, description = "Registration closed", body = ActionResponse),
        (status = 409, description = "Not in the registration phase"),
    )
)]
/// Close registration while keeping the joined participants.
pub async fn close_registration(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::close_registration(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/start",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses(
        (status = 200, description = "Game started", body = StartGameResponse),
        (status = 409, description = "Wrong phase or no questions"),
    )
)]
/// Start the game and release question 1.
pub async fn start_game(
    State(state): State<SharedState>,
) -> Result<Json<StartGameResponse>, AppError> {
    Ok(Json(admin_service::start_game(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/next",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses(
        (status = 200, description = "Advanced to the next question", body = NextQuestionResponse),
        (status = 409, description = "No active game"),
    )
)]
/// Close the current question and release the next one.
pub async fn next_question(
    State(state): State<SharedState>,
) -> Result<Json<NextQuestionResponse>, AppError> {
    Ok(Json(admin_service::release_next_question(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/end",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses(
        (status = 200, description = "Game ended and scores finalized", body = ActionResponse),
        (status = 409, description = "No active game"),
    )
)]
/// End the game and finalize the leaderboard from the response ledger.
pub async fn end_game(State(state): State<SharedState>) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::end_game(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/session/reset",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Round wiped", body = ActionResponse))
)]
/// Reset the round: participants and responses are deleted, questions kept.
pub async fn reset_game(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::reset_game(&state).await?))
}

#[utoipa::path(
    get,
    path = "/admin/questions",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Questions in number order", body = [QuestionSummary]))
)]
/// List all questions including their correct answers.
pub async fn list_questions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuestionSummary>>, AppError> {
    Ok(Json(question_service::list_questions(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/questions",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    request_body = AddQuestionRequest,
    responses((status = 200, description = "Question added", body = QuestionSummary))
)]
/// Append a question to the quiz.
pub async fn add_question(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddQuestionRequest>>,
) -> Result<Json<QuestionSummary>, AppError> {
    Ok(Json(question_service::add_question(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/admin/questions/{id}",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret"),
    ("id" = String, Path, description = "Identifier of the question to edit")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = ActionResponse),
        (status = 404, description = "Unknown question"),
    )
)]
/// Edit a question's content.
pub async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateQuestionRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        question_service::update_question(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/admin/questions/{id}",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret"),
    ("id" = String, Path, description = "Identifier of the question to delete")),
    responses(
        (status = 200, description = "Question deleted and sequence renumbered", body = ActionResponse),
        (status = 409, description = "Question is currently released"),
    )
)]
/// Delete a question; the survivors are renumbered densely.
pub async fn delete_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(question_service::delete_question(&state, &id).await?))
}

#[utoipa::path(
    get,
    path = "/admin/leaderboard",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "Ranked standings", body = LeaderboardResponse))
)]
/// The leaderboard with the finalized flag.
pub async fn get_leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(admin_service::leaderboard(&state).await?))
}

async fn require_admin_secret(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized(format!("missing `{ADMIN_SECRET_HEADER}` header"))
        })?;

    if provided == state.config().admin_secret() {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin secret".into()))
    }
}
