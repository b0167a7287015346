use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::participant::{
        ParticipantSummary, RegisterResponse, ResponseSummary, SubmitAnswerRequest,
        SubmitTimeoutRequest,
    },
    error::AppError,
    services::{participant_service, response_service},
    state::SharedState,
};

#[utoipa::path(
    post,
    path = "/participants",
    tag = "participant",
    responses(
        (status = 200, description = "Registered", body = RegisterResponse),
        (status = 409, description = "Registration is closed"),
    )
)]
/// Join the session and receive a generated identity.
pub async fn register(
    State(state): State<SharedState>,
) -> Result<Json<RegisterResponse>, AppError> {
    Ok(Json(participant_service::register(&state).await?))
}

#[utoipa::path(
    get,
    path = "/participants/{participant_id}",
    tag = "participant",
    params(("participant_id" = String, Path, description = "Identity returned by registration")),
    responses(
        (status = 200, description = "Participant record", body = ParticipantSummary),
        (status = 404, description = "Unknown participant"),
    )
)]
/// Fetch a participant's own record.
pub async fn get_participant(
    State(state): State<SharedState>,
    Path(participant_id): Path<String>,
) -> Result<Json<ParticipantSummary>, AppError> {
    Ok(Json(
        participant_service::get_participant(&state, &participant_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/participants/{participant_id}/answers",
    tag = "participant",
    params(("participant_id" = String, Path, description = "Identity returned by registration")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer scored", body = ResponseSummary),
        (status = 409, description = "Question already answered"),
    )
)]
/// Submit an answer to a question. Scored exactly once per question.
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(participant_id): Path<String>,
    Valid(Json(payload)): Valid<Json<SubmitAnswerRequest>>,
) -> Result<Json<ResponseSummary>, AppError> {
    Ok(Json(
        response_service::submit_answer(
            &state,
            &participant_id,
            payload.question_number,
            payload.selected_answer,
        )
        .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/participants/{participant_id}/timeouts",
    tag = "participant",
    params(("participant_id" = String, Path, description = "Identity returned by registration")),
    request_body = SubmitTimeoutRequest,
    responses(
        (status = 200, description = "Timeout recorded", body = ResponseSummary),
        (status = 409, description = "Question already answered"),
    )
)]
/// Record that the participant's timer expired without an answer.
pub async fn submit_timeout(
    State(state): State<SharedState>,
    Path(participant_id): Path<String>,
    Valid(Json(payload)): Valid<Json<SubmitTimeoutRequest>>,
) -> Result<Json<ResponseSummary>, AppError> {
    Ok(Json(
        response_service::submit_timeout(&state, &participant_id, payload.question_number).await?,
    ))
}

/// Configure the participant subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/participants", post(register))
        .route("/participants/{participant_id}", get(get_participant))
        .route(
            "/participants/{participant_id}/answers",
            post(submit_answer),
        )
        .route(
            "/participants/{participant_id}/timeouts",
            post(submit_timeout),
        )
}
