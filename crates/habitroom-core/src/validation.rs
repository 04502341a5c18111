//! Input validation run before data reaches the engine.
//!
//! The engine assumes valid input (a positive reset amount, a non-empty
//! name, a mood in range). Everything user-supplied passes through here
//! first.

use crate::challenge::{ChallengeDraft, Mood, ResetContext};
use crate::error::ValidationError;
use crate::tracker::ChallengeKind;

pub const NAME_MIN_LEN: usize = 1;
pub const NAME_MAX_LEN: usize = 50;
pub const RESET_AMOUNT_MIN: i64 = 1;
pub const RESET_AMOUNT_MAX: i64 = 1_000_000;
pub const REASON_MIN_LEN: usize = 1;
pub const REASON_MAX_LEN: usize = 500;
pub const MAX_CHALLENGES_PER_USER: usize = 100;

/// Validate the user-editable fields of a challenge.
pub fn validate_draft(draft: &ChallengeDraft) -> Result<(), ValidationError> {
    validate_length("name", draft.name.trim(), NAME_MIN_LEN, NAME_MAX_LEN)?;
    validate_reset_amount(draft.custom_reset_amount)
}

/// Validate an amount used by a custom reset.
pub fn validate_reset_amount(amount: i64) -> Result<(), ValidationError> {
    if !(RESET_AMOUNT_MIN..=RESET_AMOUNT_MAX).contains(&amount) {
        return Err(ValidationError::OutOfRange {
            field: "custom_reset_amount",
            min: RESET_AMOUNT_MIN,
            max: RESET_AMOUNT_MAX,
            value: amount,
        });
    }
    Ok(())
}

/// Validate the note attached to a reset.
pub fn validate_reset_context(context: &ResetContext) -> Result<(), ValidationError> {
    validate_length("reason", context.reason.trim(), REASON_MIN_LEN, REASON_MAX_LEN)?;
    // Mood is range-checked on construction; re-check values built with serde.
    Mood::new(context.mood.get()).map(|_| ())
}

/// Reject a new challenge once the user already has the maximum.
pub fn validate_challenge_quota(existing: usize) -> Result<(), ValidationError> {
    if existing >= MAX_CHALLENGES_PER_USER {
        return Err(ValidationError::InvalidValue {
            field: "challenges".to_string(),
            message: format!("at most {MAX_CHALLENGES_PER_USER} challenges per user"),
        });
    }
    Ok(())
}

/// Validate a value about to be recorded for a tracker challenge.
pub fn validate_entry_value(kind: ChallengeKind, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "value".to_string(),
            message: "must be a finite number".to_string(),
        });
    }
    match kind {
        ChallengeKind::Boolean if value != 0.0 && value != 1.0 => {
            Err(ValidationError::InvalidValue {
                field: "value".to_string(),
                message: "boolean entries must be 0 or 1".to_string(),
            })
        }
        ChallengeKind::Duration if value < 0.0 => Err(ValidationError::InvalidValue {
            field: "value".to_string(),
            message: "duration cannot be negative".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::Length {
            field,
            min,
            max,
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeUnit;

    fn draft(name: &str, amount: i64) -> ChallengeDraft {
        ChallengeDraft {
            name: name.to_string(),
            time_unit: TimeUnit::Days,
            custom_reset_amount: amount,
        }
    }

    #[test]
    fn accepts_a_reasonable_draft() {
        assert!(validate_draft(&draft("No smoking", 1)).is_ok());
    }

    #[test]
    fn rejects_blank_and_overlong_names() {
        assert!(matches!(
            validate_draft(&draft("   ", 1)),
            Err(ValidationError::Length { field: "name", .. })
        ));
        assert!(validate_draft(&draft(&"x".repeat(51), 1)).is_err());
        assert!(validate_draft(&draft(&"é".repeat(50), 1)).is_ok());
    }

    #[test]
    fn rejects_non_positive_reset_amounts() {
        assert!(validate_draft(&draft("Run", 0)).is_err());
        assert!(validate_draft(&draft("Run", -3)).is_err());
        assert!(validate_reset_amount(RESET_AMOUNT_MAX + 1).is_err());
    }

    #[test]
    fn reset_context_needs_a_reason() {
        let mut context = ResetContext::new("slipped", Mood::NEUTRAL);
        assert!(validate_reset_context(&context).is_ok());
        context.reason = String::new();
        assert!(validate_reset_context(&context).is_err());
    }

    #[test]
    fn quota_stops_at_the_limit() {
        assert!(validate_challenge_quota(MAX_CHALLENGES_PER_USER - 1).is_ok());
        assert!(validate_challenge_quota(MAX_CHALLENGES_PER_USER).is_err());
    }

    #[test]
    fn entry_values_follow_the_challenge_kind() {
        assert!(validate_entry_value(ChallengeKind::Boolean, 1.0).is_ok());
        assert!(validate_entry_value(ChallengeKind::Boolean, 0.5).is_err());
        assert!(validate_entry_value(ChallengeKind::Duration, -1.0).is_err());
        assert!(validate_entry_value(ChallengeKind::Numeric, -1.0).is_ok());
        assert!(validate_entry_value(ChallengeKind::Numeric, f64::NAN).is_err());
    }
}
