//! Question lifecycle manager: add, edit, delete with dense renumbering,
//! and the release/close operations driven by the session commands.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    dto::admin::{ActionResponse, AddQuestionRequest, QuestionSummary, UpdateQuestionRequest},
    error::ServiceError,
    state::SharedState,
    store::{
        document::{DocumentStore, StoreResult, WriteOp},
        models::{QuestionRecord, epoch_ms},
        repository::QuestionRepository,
    },
};

/// List every question in number order, including correct answers (admin view).
pub async fn list_questions(state: &SharedState) -> Result<Vec<QuestionSummary>, ServiceError> {
    let repo = QuestionRepository::new(state.require_store().await?);
    let questions = repo.list_ordered().await?;
    Ok(questions.into_iter().map(Into::into).collect())
}

/// Add a question at the end of the sequence.
pub async fn add_question(
    state: &SharedState,
    request: AddQuestionRequest,
) -> Result<QuestionSummary, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let repo = QuestionRepository::new(state.require_store().await?);

    let question_number = repo.list_ordered().await?.len() as u32 + 1;
    let record = QuestionRecord {
        question_number,
        text: request.text,
        options: request.options,
        correct_answer: request.correct_answer,
        is_active: false,
        released_at: None,
        closed_at: None,
        created_at: epoch_ms(),
    };

    let id = repo.insert(&record).await?;
    info!(question_number, "question added");
    Ok((id, record).into())
}

/// Edit an existing question's content. Numbering and the active flag are
/// left untouched.
pub async fn update_question(
    state: &SharedState,
    id: &str,
    request: UpdateQuestionRequest,
) -> Result<ActionResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let repo = QuestionRepository::new(state.require_store().await?);

    if repo.get(id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("question `{id}`")));
    }

    let mut fields = Map::new();
    if let Some(text) = request.text {
        fields.insert("text".into(), Value::from(text));
    }
    if let Some(options) = request.options {
        fields.insert(
            "options".into(),
            serde_json::to_value(options).unwrap_or(Value::Null),
        );
    }
    if let Some(correct) = request.correct_answer {
        fields.insert(
            "correctAnswer".into(),
            serde_json::to_value(correct).unwrap_or(Value::Null),
        );
    }

    if fields.is_empty() {
        return Err(ServiceError::ValidationFailed(
            "no fields to update".into(),
        ));
    }

    repo.update_fields(id, fields).await?;
    Ok(ActionResponse::new("question updated"))
}

/// Delete a question and renumber the survivors to a dense 1..N sequence.
///
/// Deleting the currently released question is refused; close it first by
/// advancing or ending the game.
pub async fn delete_question(state: &SharedState, id: &str) -> Result<ActionResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let repo = QuestionRepository::new(state.require_store().await?);

    let Some(question) = repo.get(id).await? else {
        return Err(ServiceError::NotFound(format!("question `{id}`")));
    };
    if question.is_active {
        return Err(ServiceError::PreconditionFailed(
            "cannot delete the currently released question".into(),
        ));
    }

    // Delete and renumber in one batch so no reader ever observes a gap.
    let mut ops = vec![WriteOp::Delete { id: id.to_string() }];
    let survivors = repo
        .list_ordered()
        .await?
        .into_iter()
        .filter(|(other_id, _)| other_id != id);
    for (index, (other_id, record)) in survivors.enumerate() {
        let renumbered = index as u32 + 1;
        if record.question_number != renumbered {
            let mut fields = Map::new();
            fields.insert("questionNumber".into(), Value::from(renumbered));
            ops.push(WriteOp::Update {
                id: other_id,
                fields,
            });
        }
    }

    repo.batch(ops).await?;
    info!(
        question_number = question.question_number,
        "question deleted and sequence renumbered"
    );
    Ok(ActionResponse::new("question deleted"))
}

/// Mark the question carrying `question_number` as released. No-op when no
/// question carries that number.
pub(crate) async fn release_question(
    store: &Arc<dyn DocumentStore>,
    question_number: u32,
) -> StoreResult<()> {
    set_active_flag(store, question_number, true).await
}

/// Mark the question carrying `question_number` as closed. No-op when no
/// question carries that number.
pub(crate) async fn close_question(
    store: &Arc<dyn DocumentStore>,
    question_number: u32,
) -> StoreResult<()> {
    set_active_flag(store, question_number, false).await
}

async fn set_active_flag(
    store: &Arc<dyn DocumentStore>,
    question_number: u32,
    active: bool,
) -> StoreResult<()> {
    let repo = QuestionRepository::new(store.clone());
    let Some((id, _)) = repo.find_by_number(question_number).await? else {
        debug!(question_number, active, "no question to flag; skipping");
        return Ok(());
    };

    let mut fields = Map::new();
    fields.insert("isActive".into(), Value::from(active));
    let stamp = if active { "releasedAt" } else { "closedAt" };
    fields.insert(stamp.into(), Value::from(epoch_ms()));
    repo.update_fields(&id, fields).await
}
