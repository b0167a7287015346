//! DTO definitions for participant-facing endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::format_epoch_ms,
    store::models::{AnswerLabel, ParticipantRecord, ResponseRecord},
};

/// Response returned when a participant registers.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Assigned display identity.
    pub participant_id: String,
    /// Starting score.
    pub total_score: i64,
}

/// Payload submitting an answer to a released question.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Number of the question being answered.
    #[validate(range(min = 1))]
    pub question_number: u32,
    /// Chosen option label.
    pub selected_answer: AnswerLabel,
}

/// Payload recording that a participant's answer timer expired.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitTimeoutRequest {
    /// Number of the question that timed out.
    #[validate(range(min = 1))]
    pub question_number: u32,
}

/// Echo of a recorded submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResponseSummary {
    /// Question the submission answered.
    pub question_number: u32,
    /// Chosen label, absent for timeouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<AnswerLabel>,
    /// Whether the submission was correct.
    pub is_correct: bool,
    /// Score awarded.
    pub score: i64,
    /// Elapsed time since the question's release.
    pub response_time_ms: i64,
}

impl From<ResponseRecord> for ResponseSummary {
    fn from(record: ResponseRecord) -> Self {
        Self {
            question_number: record.question_number,
            selected_answer: record.selected_answer,
            is_correct: record.is_correct,
            score: record.score,
            response_time_ms: record.response_time_ms,
        }
    }
}

/// Projection of a participant's own record.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantSummary {
    /// Display identity.
    pub participant_id: String,
    /// Current (possibly advisory) total score.
    pub total_score: i64,
    /// Whether the participant is still part of the round.
    pub is_active: bool,
    /// When the participant joined, RFC 3339.
    pub joined_at: String,
    /// Question numbers already answered.
    pub answered_questions: Vec<u32>,
}

impl From<ParticipantRecord> for ParticipantSummary {
    fn from(record: ParticipantRecord) -> Self {
        Self {
            participant_id: record.participant_id,
            total_score: record.total_score,
            is_active: record.is_active,
            joined_at: format_epoch_ms(record.joined_at),
            answered_questions: record.answered_questions,
        }
    }
}
