//! Challenge entity and the inputs that create or edit it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::time_unit::{elapsed_units, TimeUnit};

/// A single tracked habit, timed since `start_date`.
///
/// `current_value` and `current_streak` are cached projections of the
/// instants below. They are refreshed by the engine and are never used as
/// inputs to reset math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub time_unit: TimeUnit,
    /// Units removed by a custom reset. Always positive once validated.
    pub custom_reset_amount: i64,
    pub current_value: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    /// Number of custom resets. Full resets do not count.
    pub reset_count: u32,
    /// Instant of the most recent custom reset.
    pub last_reset_date: Option<DateTime<Utc>>,
    pub last_calculated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Challenge {
    /// Create a fresh challenge starting at `now` with zeroed counters.
    pub fn new(user_id: impl Into<String>, draft: ChallengeDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: draft.name.trim().to_string(),
            start_date: now,
            time_unit: draft.time_unit,
            custom_reset_amount: draft.custom_reset_amount,
            current_value: 0,
            current_streak: 0,
            best_streak: 0,
            reset_count: 0,
            last_reset_date: None,
            last_calculated: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// The instant the current streak is measured from.
    pub fn streak_anchor(&self) -> DateTime<Utc> {
        self.last_reset_date.unwrap_or(self.start_date)
    }

    /// Elapsed units since `start_date`, computed fresh.
    pub fn elapsed_value(&self, now: DateTime<Utc>) -> i64 {
        elapsed_units(self.start_date, now, self.time_unit).max(0)
    }

    /// Elapsed units since the streak anchor, computed fresh.
    pub fn elapsed_streak(&self, now: DateTime<Utc>) -> i64 {
        elapsed_units(self.streak_anchor(), now, self.time_unit).max(0)
    }

    /// Apply an edit to the user-editable fields, leaving timing and
    /// counters alone.
    pub fn with_draft(&self, draft: ChallengeDraft, now: DateTime<Utc>) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            time_unit: draft.time_unit,
            custom_reset_amount: draft.custom_reset_amount,
            updated_at: now,
            ..self.clone()
        }
    }

    /// The same challenge with a different reset amount, for one-off custom
    /// resets whose amount is chosen at reset time.
    pub fn with_reset_amount(&self, amount: i64) -> Self {
        Self {
            custom_reset_amount: amount,
            ..self.clone()
        }
    }

    /// The user-editable fields of this challenge.
    pub fn draft(&self) -> ChallengeDraft {
        ChallengeDraft {
            name: self.name.clone(),
            time_unit: self.time_unit,
            custom_reset_amount: self.custom_reset_amount,
        }
    }
}

/// User-editable fields of a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDraft {
    pub name: String,
    pub time_unit: TimeUnit,
    pub custom_reset_amount: i64,
}

/// Snapshot kept when a challenge is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedChallenge {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub deleted_at: DateTime<Utc>,
    /// Elapsed value at the moment of deletion.
    pub final_value: i64,
}

/// Self-reported mood attached to a reset, 1 (worst) to 5 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const NEUTRAL: Mood = Mood(3);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: "mood",
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                value: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Mood {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Mood::new(value)
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood.0
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::NEUTRAL
    }
}

/// Caller-supplied details for a reset.
///
/// `operation_id` identifies one user action. Ledger entries carry it so
/// that saving the same reset twice stores it once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetContext {
    pub operation_id: Uuid,
    pub reason: String,
    pub mood: Mood,
}

impl ResetContext {
    pub fn new(reason: impl Into<String>, mood: Mood) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            reason: reason.into(),
            mood,
        }
    }

    pub fn with_operation_id(mut self, operation_id: Uuid) -> Self {
        self.operation_id = operation_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> ChallengeDraft {
        ChallengeDraft {
            name: "  No sugar ".to_string(),
            time_unit: TimeUnit::Days,
            custom_reset_amount: 2,
        }
    }

    #[test]
    fn new_challenge_starts_now_with_zero_counters() {
        let now = Utc::now();
        let challenge = Challenge::new("user-1", draft(), now);

        assert_eq!(challenge.name, "No sugar");
        assert_eq!(challenge.start_date, now);
        assert_eq!(challenge.current_value, 0);
        assert_eq!(challenge.best_streak, 0);
        assert_eq!(challenge.reset_count, 0);
        assert!(challenge.last_reset_date.is_none());
    }

    #[test]
    fn streak_anchor_falls_back_to_start_date() {
        let now = Utc::now();
        let mut challenge = Challenge::new("u", draft(), now - Duration::days(4));
        assert_eq!(challenge.elapsed_streak(now), 4);

        challenge.last_reset_date = Some(now - Duration::days(1));
        assert_eq!(challenge.elapsed_streak(now), 1);
        assert_eq!(challenge.elapsed_value(now), 4);
    }

    #[test]
    fn editing_keeps_timing_and_counters() {
        let now = Utc::now();
        let mut challenge = Challenge::new("u", draft(), now - Duration::days(9));
        challenge.best_streak = 7;
        challenge.reset_count = 2;

        let edited = challenge.with_draft(
            ChallengeDraft {
                name: "No sweets".to_string(),
                time_unit: TimeUnit::Hours,
                custom_reset_amount: 12,
            },
            now,
        );

        assert_eq!(edited.name, "No sweets");
        assert_eq!(edited.time_unit, TimeUnit::Hours);
        assert_eq!(edited.start_date, challenge.start_date);
        assert_eq!(edited.best_streak, 7);
        assert_eq!(edited.reset_count, 2);
        assert_eq!(edited.updated_at, now);
    }

    #[test]
    fn mood_rejects_out_of_range_values() {
        assert!(Mood::new(0).is_err());
        assert!(Mood::new(6).is_err());
        assert_eq!(Mood::new(5).unwrap().get(), 5);
        assert!(serde_json::from_str::<Mood>("9").is_err());
        assert_eq!(serde_json::to_string(&Mood::NEUTRAL).unwrap(), "3");
    }
}
