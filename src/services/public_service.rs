//! Read-only projections served to participant frontends. The same
//! derivations feed the SSE snapshot broadcaster.

use std::sync::Arc;

use crate::{
    dto::public::{ActiveQuestionView, LeaderboardResponse, SessionView},
    error::ServiceError,
    services::leaderboard_service,
    state::SharedState,
    store::{
        document::{DocumentStore, StoreResult},
        models::{SessionRecord, SessionStatus},
        repository::{QuestionRepository, SessionRepository},
    },
};

/// The session document as participants see it.
pub async fn session_view(state: &SharedState) -> Result<SessionView, ServiceError> {
    let store = state.require_store().await?;
    let session = load_session(&store).await?;
    Ok(session.into())
}

/// The currently released question, `None` outside the active phase.
///
/// Derived from the session's `currentQuestionIndex`, never from a
/// question's own `isActive` flag, so the session document stays the single
/// authority on what participants should be looking at.
pub async fn current_question(
    state: &SharedState,
) -> Result<Option<ActiveQuestionView>, ServiceError> {
    let store = state.require_store().await?;
    let time_limit = state.config().question_time_limit_secs();
    Ok(current_question_from_store(&store, time_limit).await?)
}

pub(crate) async fn current_question_from_store(
    store: &Arc<dyn DocumentStore>,
    time_limit_secs: u64,
) -> StoreResult<Option<ActiveQuestionView>> {
    let sessions = SessionRepository::new(store.clone());
    let Some(session) = sessions.load().await? else {
        return Ok(None);
    };
    if session.status != SessionStatus::Active || session.current_question_index < 0 {
        return Ok(None);
    }

    let question_number = (session.current_question_index + 1) as u32;
    let questions = QuestionRepository::new(store.clone());
    Ok(questions
        .find_by_number(question_number)
        .await?
        .map(|(_, record)| ActiveQuestionView::from_record(record, time_limit_secs)))
}

/// The public leaderboard with the finalized flag.
pub async fn leaderboard(state: &SharedState) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(leaderboard_from_store(&store).await?)
}

pub(crate) async fn leaderboard_from_store(
    store: &Arc<dyn DocumentStore>,
) -> StoreResult<LeaderboardResponse> {
    let sessions = SessionRepository::new(store.clone());
    let finalized = matches!(
        sessions.load().await?.map(|record| record.status),
        Some(SessionStatus::Ended)
    );
    Ok(LeaderboardResponse {
        entries: leaderboard_service::live_from_store(store).await?,
        finalized,
    })
}

pub(crate) async fn session_view_from_store(
    store: &Arc<dyn DocumentStore>,
) -> StoreResult<Option<SessionView>> {
    let sessions = SessionRepository::new(store.clone());
    Ok(sessions.load().await?.map(Into::into))
}

async fn load_session(store: &Arc<dyn DocumentStore>) -> Result<SessionRecord, ServiceError> {
    SessionRepository::new(store.clone())
        .load()
        .await?
        .ok_or_else(|| ServiceError::NotFound("session".into()))
}
