//! DTO definitions used by the admin REST API and documentation layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{
        format_epoch_ms,
        validation::{validate_not_blank, validate_options},
    },
    store::models::{AnswerLabel, QuestionRecord, SessionRecord, SessionStatus},
};

/// Payload for adding a question to the quiz.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddQuestionRequest {
    /// Question text shown to participants.
    #[validate(custom(function = validate_not_blank))]
    pub text: String,
    /// Option text for each of the four labels.
    #[validate(custom(function = validate_options))]
    pub options: IndexMap<AnswerLabel, String>,
    /// Label of the correct option.
    pub correct_answer: AnswerLabel,
}

/// Content-only edit of an existing question. Numbering and the active flag
/// are never touched through this payload.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionRequest {
    /// Replacement question text.
    #[validate(custom(function = validate_not_blank))]
    pub text: Option<String>,
    /// Replacement options map.
    #[validate(custom(function = validate_options))]
    pub options: Option<IndexMap<AnswerLabel, String>>,
    /// Replacement correct-answer label.
    pub correct_answer: Option<AnswerLabel>,
}

/// Admin projection of a question, including the correct answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionSummary {
    /// Document id used for edits and deletion.
    pub id: String,
    /// Dense 1-based position.
    pub question_number: u32,
    /// Question text.
    pub text: String,
    /// Option text keyed by label.
    pub options: IndexMap<AnswerLabel, String>,
    /// Correct label (admin-only).
    pub correct_answer: AnswerLabel,
    /// Whether the question is currently released.
    pub is_active: bool,
    /// Release timestamp, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<String>,
    /// Close timestamp, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl From<(String, QuestionRecord)> for QuestionSummary {
    fn from((id, record): (String, QuestionRecord)) -> Self {
        Self {
            id,
            question_number: record.question_number,
            text: record.text,
            options: record.options,
            correct_answer: record.correct_answer,
            is_active: record.is_active,
            released_at: record.released_at.map(format_epoch_ms),
            closed_at: record.closed_at.map(format_epoch_ms),
        }
    }
}

/// Admin projection of the session document.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Current phase.
    pub status: SessionStatus,
    /// Whether participants may still join.
    pub registration_open: bool,
    /// 0-based index of the released question, `-1` when none.
    pub current_question_index: i64,
    /// Question count frozen at game start.
    pub total_questions: u32,
    /// Game start timestamp, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_started_at: Option<String>,
    /// Game end timestamp, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_ended_at: Option<String>,
    /// Last mutation timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<SessionRecord> for SessionSummary {
    fn from(record: SessionRecord) -> Self {
        Self {
            status: record.status,
            registration_open: record.registration_open,
            current_question_index: record.current_question_index,
            total_questions: record.total_questions,
            game_started_at: record.game_started_at.map(format_epoch_ms),
            game_ended_at: record.game_ended_at.map(format_epoch_ms),
            updated_at: format_epoch_ms(record.updated_at),
        }
    }
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl ActionResponse {
    /// Build an acknowledgement with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response emitted when the game starts.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    /// Number of questions frozen for this round.
    pub total_questions: u32,
    /// Number of the question released first (always 1).
    pub released_question: u32,
}

/// Response describing the session after advancing to the next question.
#[derive(Debug, Serialize, ToSchema)]
pub struct NextQuestionResponse {
    /// New 0-based question index.
    pub current_question_index: i64,
    /// Number of the question just released.
    pub released_question: u32,
}
