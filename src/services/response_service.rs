//! The append-only response ledger: answer and timeout submissions.
//!
//! Exactly-once scoring hangs on the ledger's unique key
//! (`participantId:questionNumber`); everything else here is lookup and
//! bookkeeping around that single insert.

use tracing::info;

use crate::{
    dto::participant::ResponseSummary,
    error::ServiceError,
    services::scoring,
    state::SharedState,
    store::{
        document::StoreError,
        models::{AnswerLabel, ResponseRecord, epoch_ms},
        repository::{ParticipantRepository, QuestionRepository, ResponseRepository},
    },
};

/// Record a participant's answer to a question.
pub async fn submit_answer(
    state: &SharedState,
    participant_id: &str,
    question_number: u32,
    selected_answer: AnswerLabel,
) -> Result<ResponseSummary, ServiceError> {
    submit(state, participant_id, question_number, Some(selected_answer)).await
}

/// Record that a participant's timer expired without an answer.
pub async fn submit_timeout(
    state: &SharedState,
    participant_id: &str,
    question_number: u32,
) -> Result<ResponseSummary, ServiceError> {
    submit(state, participant_id, question_number, None).await
}

async fn submit(
    state: &SharedState,
    participant_id: &str,
    question_number: u32,
    selected_answer: Option<AnswerLabel>,
) -> Result<ResponseSummary, ServiceError> {
    let store = state.require_store().await?;
    let participants = ParticipantRepository::new(store.clone());
    let questions = QuestionRepository::new(store.clone());
    let responses = ResponseRepository::new(store);

    if participants.find(participant_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "participant `{participant_id}`"
        )));
    }
    let Some((_, question)) = questions.find_by_number(question_number).await? else {
        return Err(ServiceError::NotFound(format!(
            "question {question_number}"
        )));
    };

    let answered_at = epoch_ms();
    let (is_correct, score) = scoring::score_answer(selected_answer, question.correct_answer);
    let record = ResponseRecord {
        participant_id: participant_id.to_string(),
        question_number,
        selected_answer,
        is_correct,
        score,
        response_time_ms: match selected_answer {
            Some(_) => scoring::response_time_ms(question.released_at, answered_at),
            None => 0,
        },
        answered_at,
    };

    // The unique insert is the scoring decision; a conflict means another
    // submission for the same pair already won.
    match responses.insert_unique(&record).await {
        Ok(_) => {}
        Err(StoreError::Conflict { .. }) => {
            return Err(ServiceError::AlreadyAnswered { question_number });
        }
        Err(err) => return Err(err.into()),
    }

    participants
        .mark_answered(participant_id, question_number, score, answered_at)
        .await?;

    info!(
        participant_id,
        question_number, is_correct, score, "response recorded"
    );
    Ok(record.into())
}

/// Whether the participant already has a ledger entry for the question.
pub async fn has_answered(
    state: &SharedState,
    participant_id: &str,
    question_number: u32,
) -> Result<bool, ServiceError> {
    let responses = ResponseRepository::new(state.require_store().await?);
    Ok(responses.exists(participant_id, question_number).await?)
}
