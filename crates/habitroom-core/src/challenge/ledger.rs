//! Append-only records produced by resets.
//!
//! Entries are built by the engine and handed to the caller for storage.
//! Nothing here is ever updated after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Challenge, Mood, ResetContext};

/// One reset (full or custom) of a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResetLog {
    pub id: Uuid,
    /// Idempotency key of the user action that produced this log.
    pub operation_id: Uuid,
    pub challenge_id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub amount_reduced: i64,
    pub reason: String,
    pub mood: Mood,
    pub value_before_reset: i64,
    pub value_after_reset: i64,
}

impl ChallengeResetLog {
    pub fn new(
        challenge: &Challenge,
        context: &ResetContext,
        timestamp: DateTime<Utc>,
        amount_reduced: i64,
        value_before_reset: i64,
        value_after_reset: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation_id: context.operation_id,
            challenge_id: challenge.id,
            user_id: challenge.user_id.clone(),
            timestamp,
            amount_reduced,
            reason: context.reason.clone(),
            mood: context.mood,
            value_before_reset,
            value_after_reset,
        }
    }
}

/// A streak that beat the previous best at the moment of a custom reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRecordBreak {
    pub id: Uuid,
    pub operation_id: Uuid,
    pub challenge_id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub old_record: i64,
    pub new_record: i64,
    pub improvement: i64,
    /// Reserved for records scoped across all of a user's challenges.
    pub is_global_record: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ChallengeRecordBreak {
    pub fn new(
        challenge: &Challenge,
        context: &ResetContext,
        timestamp: DateTime<Utc>,
        old_record: i64,
        new_record: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation_id: context.operation_id,
            challenge_id: challenge.id,
            user_id: challenge.user_id.clone(),
            timestamp,
            old_record,
            new_record,
            improvement: new_record - old_record,
            is_global_record: false,
            context: None,
            reason: None,
        }
    }
}
