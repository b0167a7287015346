//! Session commands issued by the quiz host.
//!
//! Every command takes the shared command gate for its whole
//! read-validate-write span and runs the stored status through
//! [`next_session_state`] before touching the store, so the session document
//! only ever moves along legal edges.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    dto::{
        admin::{ActionResponse, NextQuestionResponse, SessionSummary, StartGameResponse},
        public::LeaderboardResponse,
    },
    error::ServiceError,
    services::{leaderboard_service, question_service},
    state::{
        SharedState,
        machine::{SessionEvent, next_session_state},
    },
    store::{
        document::{DocumentStore, WriteOp},
        models::{SessionRecord, SessionStatus, epoch_ms},
        repository::{
            ParticipantRepository, QuestionRepository, ResponseRepository, SessionPatch,
            SessionRepository,
        },
    },
};

/// Create the singleton session document when it does not exist yet.
/// Re-running against an existing session leaves it untouched.
pub async fn initialize(state: &SharedState) -> Result<SessionSummary, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store);

    let created = sessions.create_if_absent(&SessionRecord::initial(epoch_ms())).await?;
    if created {
        info!("session initialized");
    }

    let session = sessions
        .load()
        .await?
        .ok_or_else(|| ServiceError::PreconditionFailed("session not initialized".into()))?;
    Ok(session.into())
}

/// Open registration. Legal from any phase; resets the session to a fresh
/// registration round (index `-1`, timers cleared) while keeping `createdAt`.
pub async fn open_registration(state: &SharedState) -> Result<SessionSummary, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store);

    let now = epoch_ms();
    let existing = sessions.load().await?;
    let current_status = existing
        .as_ref()
        .map(|record| record.status)
        .unwrap_or(SessionStatus::Idle);
    let (status, registration_open) =
        next_session_state(current_status, SessionEvent::OpenRegistration)?;

    let record = SessionRecord {
        status,
        registration_open,
        current_question_index: -1,
        total_questions: 0,
        game_started_at: None,
        game_ended_at: None,
        created_at: existing.map(|record| record.created_at).unwrap_or(now),
        updated_at: now,
    };
    sessions.upsert_merge(&record).await?;

    info!("registration opened");
    Ok(record.into())
}

/// Close registration while staying in the registration phase.
pub async fn close_registration(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store);

    let session = load_required(&sessions).await?;
    let (status, registration_open) =
        next_session_state(session.status, SessionEvent::CloseRegistration)?;

    sessions
        .patch(&SessionPatch {
            status: Some(status),
            registration_open: Some(registration_open),
            updated_at: Some(epoch_ms()),
            ..SessionPatch::default()
        })
        .await?;

    info!("registration closed");
    Ok(ActionResponse::new("registration closed"))
}

/// Start the game: freeze the question count, release question 1, and move
/// to the active phase. Refused when no questions exist.
pub async fn start_game(state: &SharedState) -> Result<StartGameResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store.clone());
    let questions = QuestionRepository::new(store.clone());

    let session = load_required(&sessions).await?;
    let (status, registration_open) = next_session_state(session.status, SessionEvent::StartGame)?;

    let total_questions = questions.list_ordered().await?.len() as u32;
    if total_questions == 0 {
        return Err(ServiceError::PreconditionFailed(
            "cannot start a game with no questions".into(),
        ));
    }

    let now = epoch_ms();
    sessions
        .patch(&SessionPatch {
            status: Some(status),
            registration_open: Some(registration_open),
            current_question_index: Some(0),
            total_questions: Some(total_questions),
            game_started_at: Some(Some(now)),
            updated_at: Some(now),
            ..SessionPatch::default()
        })
        .await?;
    question_service::release_question(&store, 1).await?;

    info!(total_questions, "game started");
    Ok(StartGameResponse {
        total_questions,
        released_question: 1,
    })
}

/// Close the current question and release the next one.
///
/// Two separate writes: a client reading between them sees the old question
/// closed before the new one appears, never two questions released at once.
/// Advancing past the last question is the caller's responsibility; the
/// release becomes a no-op and the index keeps growing.
pub async fn release_next_question(
    state: &SharedState,
) -> Result<NextQuestionResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store.clone());

    let session = load_required(&sessions).await?;
    if session.status != SessionStatus::Active {
        return Err(ServiceError::PreconditionFailed(
            "no active game to advance".into(),
        ));
    }

    let current_number = (session.current_question_index + 1) as u32;
    let next_index = session.current_question_index + 1;
    let next_number = current_number + 1;

    question_service::close_question(&store, current_number).await?;
    question_service::release_question(&store, next_number).await?;
    sessions
        .patch(&SessionPatch {
            current_question_index: Some(next_index),
            updated_at: Some(epoch_ms()),
            ..SessionPatch::default()
        })
        .await?;

    info!(released_question = next_number, "advanced to next question");
    Ok(NextQuestionResponse {
        current_question_index: next_index,
        released_question: next_number,
    })
}

/// End the game: close the outstanding question, finalize the leaderboard
/// from the ledger, and move to the ended phase.
pub async fn end_game(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store.clone());

    let session = load_required(&sessions).await?;
    let (status, registration_open) = next_session_state(session.status, SessionEvent::EndGame)?;

    if session.current_question_index >= 0 {
        question_service::close_question(&store, (session.current_question_index + 1) as u32)
            .await?;
    }
    leaderboard_service::finalize(&store).await?;

    let now = epoch_ms();
    sessions
        .patch(&SessionPatch {
            status: Some(status),
            registration_open: Some(registration_open),
            current_question_index: Some(-1),
            game_ended_at: Some(Some(now)),
            updated_at: Some(now),
            ..SessionPatch::default()
        })
        .await?;

    info!("game ended");
    Ok(ActionResponse::new("game ended"))
}

/// Wipe the round: session back to its initial values, questions cleared of
/// release state with numbering preserved, participants and responses gone.
///
/// Idempotent and resumable: each step is safe to re-run, so a reset that
/// died halfway completes on the next call.
pub async fn reset_game(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store.clone());

    let now = epoch_ms();
    let existing = sessions.load().await?;
    let current_status = existing
        .as_ref()
        .map(|record| record.status)
        .unwrap_or(SessionStatus::Idle);
    let (status, registration_open) = next_session_state(current_status, SessionEvent::Reset)?;

    let mut record = SessionRecord::initial(existing.map(|record| record.created_at).unwrap_or(now));
    record.status = status;
    record.registration_open = registration_open;
    record.updated_at = now;
    sessions.upsert_merge(&record).await?;

    clear_question_flags(&store).await?;
    ParticipantRepository::new(store.clone()).delete_all().await?;
    ResponseRepository::new(store).delete_all().await?;

    warn!("game reset; participants and responses wiped");
    Ok(ActionResponse::new("game reset"))
}

/// The session document as the host sees it.
pub async fn session_summary(state: &SharedState) -> Result<SessionSummary, ServiceError> {
    let sessions = SessionRepository::new(state.require_store().await?);
    let session = load_required(&sessions).await?;
    Ok(session.into())
}

/// The leaderboard as the host sees it, with the finalized flag.
pub async fn leaderboard(state: &SharedState) -> Result<LeaderboardResponse, ServiceError> {
    Ok(LeaderboardResponse {
        entries: leaderboard_service::live(state).await?,
        finalized: leaderboard_service::is_finalized(state).await?,
    })
}

async fn load_required(sessions: &SessionRepository) -> Result<SessionRecord, ServiceError> {
    sessions
        .load()
        .await?
        .ok_or_else(|| ServiceError::PreconditionFailed("session not initialized".into()))
}

async fn clear_question_flags(store: &Arc<dyn DocumentStore>) -> Result<(), ServiceError> {
    let questions = QuestionRepository::new(store.clone());
    let all = questions.list_ordered().await?;
    if all.is_empty() {
        return Ok(());
    }

    let ops = all
        .into_iter()
        .map(|(id, _)| {
            let mut fields = serde_json::Map::new();
            fields.insert("isActive".into(), serde_json::Value::from(false));
            fields.insert("releasedAt".into(), serde_json::Value::Null);
            fields.insert("closedAt".into(), serde_json::Value::Null);
            WriteOp::Update { id, fields }
        })
        .collect();
    questions.batch(ops).await?;
    Ok(())
}
