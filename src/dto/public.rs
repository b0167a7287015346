//! Read-only projections exposed to participant frontends.

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_epoch_ms,
    store::models::{AnswerLabel, QuestionRecord, SessionRecord, SessionStatus},
};

/// Public view of the session document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    /// Current phase.
    pub status: SessionStatus,
    /// Whether new participants may join.
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
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        Self {
            status: record.status,
            registration_open: record.registration_open,
            current_question_index: record.current_question_index,
            total_questions: record.total_questions,
            game_started_at: record.game_started_at.map(format_epoch_ms),
            game_ended_at: record.game_ended_at.map(format_epoch_ms),
        }
    }
}

/// The released question as participants see it. The correct answer is
/// withheld; scoring happens server-side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveQuestionView {
    /// Dense 1-based position.
    pub question_number: u32,
    /// Question text.
    pub text: String,
    /// Option text keyed by label.
    pub options: IndexMap<AnswerLabel, String>,
    /// Release timestamp, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<String>,
    /// Seconds participants have to answer.
    pub time_limit_secs: u64,
}

impl ActiveQuestionView {
    /// Build the participant view of a released question.
    pub fn from_record(record: QuestionRecord, time_limit_secs: u64) -> Self {
        Self {
            question_number: record.question_number,
            text: record.text,
            options: record.options,
            released_at: record.released_at.map(format_epoch_ms),
            time_limit_secs,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Dense rank starting at 1.
    pub rank: u32,
    /// Display identity.
    pub participant_id: String,
    /// Total score backing the rank.
    pub total_score: i64,
}

/// Ranked standings over the active participants.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Rows ordered by rank.
    pub entries: Vec<LeaderboardEntry>,
    /// True once the game ended and totals were recomputed from the ledger.
    pub finalized: bool,
}
