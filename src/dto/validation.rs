//! Validation helpers for DTOs.

use indexmap::IndexMap;
use validator::ValidationError;

use crate::store::models::AnswerLabel;

/// Validates that a text field is not empty or whitespace-only.
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("blank_text");
        err.message = Some("text must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a question carries all four options A-D with non-blank text.
pub fn validate_options(options: &IndexMap<AnswerLabel, String>) -> Result<(), ValidationError> {
    for label in AnswerLabel::ALL {
        match options.get(&label) {
            Some(text) if !text.trim().is_empty() => {}
            Some(_) => {
                let mut err = ValidationError::new("blank_option");
                err.message = Some(format!("option {label:?} must not be blank").into());
                return Err(err);
            }
            None => {
                let mut err = ValidationError::new("missing_option");
                err.message = Some(format!("option {label:?} is missing").into());
                return Err(err);
            }
        }
    }

    if options.len() != AnswerLabel::ALL.len() {
        let mut err = ValidationError::new("extra_options");
        err.message = Some("exactly four options A-D are required".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_options() -> IndexMap<AnswerLabel, String> {
        AnswerLabel::ALL
            .into_iter()
            .map(|label| (label, format!("option {label:?}")))
            .collect()
    }

    #[test]
    fn accepts_four_non_blank_options() {
        assert!(validate_options(&full_options()).is_ok());
    }

    #[test]
    fn rejects_missing_option() {
        let mut options = full_options();
        options.shift_remove(&AnswerLabel::C);
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn rejects_blank_option() {
        let mut options = full_options();
        options.insert(AnswerLabel::B, "   ".into());
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn rejects_blank_text() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("  \t ").is_err());
        assert!(validate_not_blank("What year was it?").is_ok());
    }
}
