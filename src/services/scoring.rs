//! Pure scoring engine mapping a submission to a signed score.

use crate::store::models::{AnswerLabel, EpochMillis};

/// Points awarded for a correct answer.
pub const SCORE_CORRECT: i64 = 10;
/// Points deducted for a wrong answer.
pub const SCORE_WRONG: i64 = -5;
/// Points for letting the timer expire.
pub const SCORE_TIMEOUT: i64 = 0;

/// Score a submission against the question's correct answer.
///
/// Returns `(is_correct, score)`. A `None` selection is a timeout and is
/// never treated as correct or penalized beyond [`SCORE_TIMEOUT`].
pub fn score_answer(selected: Option<AnswerLabel>, correct: AnswerLabel) -> (bool, i64) {
    match selected {
        None => (false, SCORE_TIMEOUT),
        Some(label) if label == correct => (true, SCORE_CORRECT),
        Some(_) => (false, SCORE_WRONG),
    }
}

/// Elapsed time between a question's release and the submission, recorded
/// for analytics only. Zero when the release timestamp is unknown or the
/// clocks disagree.
pub fn response_time_ms(released_at: Option<EpochMillis>, answered_at: EpochMillis) -> i64 {
    released_at
        .map(|released| (answered_at - released).max(0))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_awards_ten() {
        assert_eq!(
            score_answer(Some(AnswerLabel::A), AnswerLabel::A),
            (true, SCORE_CORRECT)
        );
    }

    #[test]
    fn wrong_answer_costs_five() {
        assert_eq!(
            score_answer(Some(AnswerLabel::C), AnswerLabel::A),
            (false, SCORE_WRONG)
        );
    }

    #[test]
    fn timeout_scores_zero() {
        assert_eq!(score_answer(None, AnswerLabel::B), (false, SCORE_TIMEOUT));
    }

    #[test]
    fn response_time_is_clamped_and_defaults_to_zero() {
        assert_eq!(response_time_ms(Some(1_000), 4_250), 3_250);
        assert_eq!(response_time_ms(Some(5_000), 4_000), 0);
        assert_eq!(response_time_ms(None, 4_000), 0);
    }
}
