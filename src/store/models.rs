//! Persisted record definitions shared across layers.
//!
//! Field names use the camelCase wire format of the stored documents so
//! snapshots stay readable in the database console.

use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Milliseconds since the Unix epoch, the timestamp unit used by every record.
pub type EpochMillis = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn epoch_ms() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// One of the four answer labels a question offers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum AnswerLabel {
    /// First option.
    A,
    /// Second option.
    B,
    /// Third option.
    C,
    /// Fourth option.
    D,
}

impl AnswerLabel {
    /// The four labels in display order.
    pub const ALL: [AnswerLabel; 4] = [
        AnswerLabel::A,
        AnswerLabel::B,
        AnswerLabel::C,
        AnswerLabel::D,
    ];
}

/// Overall phase of the quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No round is running; questions can be managed.
    Idle,
    /// Participants may join (or have joined and await the start).
    Registration,
    /// Questions are being released one at a time.
    Active,
    /// The round is over and scores are final.
    Ended,
}

/// Singleton session document driving every connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Current phase of the session.
    pub status: SessionStatus,
    /// Whether new participants may still join. Implies `status = registration`.
    pub registration_open: bool,
    /// 0-based index of the released question, `-1` when none. A value `>= 0`
    /// implies `status = active`.
    pub current_question_index: i64,
    /// Number of questions counted when the game started.
    pub total_questions: u32,
    /// When the game entered the active phase.
    pub game_started_at: Option<EpochMillis>,
    /// When the game ended.
    pub game_ended_at: Option<EpochMillis>,
    /// When the singleton was first created.
    pub created_at: EpochMillis,
    /// Last mutation timestamp.
    pub updated_at: EpochMillis,
}

impl SessionRecord {
    /// Fresh idle session as written by `initialize`.
    pub fn initial(now: EpochMillis) -> Self {
        Self {
            status: SessionStatus::Idle,
            registration_open: false,
            current_question_index: -1,
            total_questions: 0,
            game_started_at: None,
            game_ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A quiz question with its four options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Dense 1-based position, unique across the collection.
    pub question_number: u32,
    /// Question text shown to participants.
    pub text: String,
    /// Option text keyed by label, in A..D order.
    pub options: IndexMap<AnswerLabel, String>,
    /// Label of the correct option. Never exposed to participants.
    pub correct_answer: AnswerLabel,
    /// Whether the question is currently visible to participants.
    pub is_active: bool,
    /// When the question was released.
    pub released_at: Option<EpochMillis>,
    /// When the question was closed.
    pub closed_at: Option<EpochMillis>,
    /// When the question was added.
    pub created_at: EpochMillis,
}

/// A joined participant and their running score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    /// Display identity, globally unique and client-unguessable.
    pub participant_id: String,
    /// Accumulated score; advisory until finalization overwrites it.
    pub total_score: i64,
    /// Cleared participants drop off the leaderboard.
    pub is_active: bool,
    /// When the participant joined.
    pub joined_at: EpochMillis,
    /// Last time the participant interacted.
    pub last_active_at: EpochMillis,
    /// Question numbers this participant already answered, denormalized for
    /// fast client-side checks. The response ledger stays authoritative.
    pub answered_questions: Vec<u32>,
}

/// One scored submission in the append-only response ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    /// Identity of the submitting participant.
    pub participant_id: String,
    /// Question the submission answers.
    pub question_number: u32,
    /// Chosen label, `null` for a timeout.
    pub selected_answer: Option<AnswerLabel>,
    /// Whether the chosen label matched the correct answer.
    pub is_correct: bool,
    /// Signed score awarded by the scoring engine.
    pub score: i64,
    /// Elapsed time since the question's release, `0` for timeouts.
    pub response_time_ms: i64,
    /// When the submission was recorded.
    pub answered_at: EpochMillis,
}
