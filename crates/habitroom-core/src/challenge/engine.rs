//! Challenge state engine.
//!
//! Every operation takes the current instant explicitly and returns new
//! values; arguments are never mutated and the clock is never read here.
//!
//! ## Reset bookkeeping
//!
//! ```text
//!                 start_date  value/streak  best_streak  reset_count  last_reset_date
//! recompute       -           refreshed     max(..)      -            -
//! full_reset      now         0             -            -            -
//! custom_reset    advanced*   reduced/0     max(..)      +1           now
//! ```
//!
//! (*) `now` when the reset amount swallows the whole elapsed value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::{ChallengeRecordBreak, ChallengeResetLog};
use super::model::{Challenge, DeletedChallenge, ResetContext};
use crate::time_unit::advance_instant;

/// Result of refreshing a challenge's derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recomputed {
    pub challenge: Challenge,
    /// The live streak exceeds the best streak stored before this refresh.
    pub record_broken: bool,
}

/// Result of a full reset that also records a reset log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullResetOutcome {
    pub challenge: Challenge,
    pub reset_log: ChallengeResetLog,
}

/// Result of a custom reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomResetOutcome {
    pub challenge: Challenge,
    pub reset_log: ChallengeResetLog,
    pub record_break: Option<ChallengeRecordBreak>,
}

/// Refresh the cached value, streak and best streak at `now`.
///
/// Reports a record break but never produces a ledger entry for it.
pub fn recompute(challenge: &Challenge, now: DateTime<Utc>) -> Recomputed {
    let current_value = challenge.elapsed_value(now);
    let current_streak = challenge.elapsed_streak(now);
    let record_broken = current_streak > challenge.best_streak;

    Recomputed {
        challenge: Challenge {
            current_value,
            current_streak,
            best_streak: challenge.best_streak.max(current_streak),
            last_calculated: now,
            ..challenge.clone()
        },
        record_broken,
    }
}

/// Restart the clock at `now` without touching the custom-reset history.
///
/// `best_streak`, `reset_count` and `last_reset_date` are left as they were.
pub fn full_reset(challenge: &Challenge, now: DateTime<Utc>) -> Challenge {
    Challenge {
        start_date: now,
        current_value: 0,
        current_streak: 0,
        last_calculated: now,
        updated_at: now,
        ..challenge.clone()
    }
}

/// [`full_reset`] plus a reset log describing it.
///
/// The log reduces by the whole elapsed value. No record break is produced.
pub fn full_reset_with_log(
    challenge: &Challenge,
    now: DateTime<Utc>,
    context: &ResetContext,
) -> FullResetOutcome {
    let value_before = challenge.elapsed_value(now);
    let reset_log = ChallengeResetLog::new(challenge, context, now, value_before, value_before, 0);

    tracing::debug!(
        challenge_id = %challenge.id,
        value_before,
        "full reset"
    );

    FullResetOutcome {
        challenge: full_reset(challenge, now),
        reset_log,
    }
}

/// Reduce the elapsed value by `custom_reset_amount` and restart the streak.
///
/// Precondition: `custom_reset_amount > 0` (see
/// [`crate::validation::validate_reset_amount`]).
pub fn custom_reset(
    challenge: &Challenge,
    now: DateTime<Utc>,
    context: &ResetContext,
) -> CustomResetOutcome {
    let amount = challenge.custom_reset_amount;
    let current_value = challenge.elapsed_value(now);
    let current_streak = challenge.elapsed_streak(now);
    let best_streak = challenge.best_streak.max(current_streak);

    let record_break = (current_streak > challenge.best_streak).then(|| {
        ChallengeRecordBreak::new(challenge, context, now, challenge.best_streak, current_streak)
    });

    let (start_date, value_after) = if amount >= current_value {
        (now, 0)
    } else {
        (
            advance_instant(challenge.start_date, amount, challenge.time_unit),
            current_value - amount,
        )
    };

    let reset_log = ChallengeResetLog::new(
        challenge,
        context,
        now,
        amount,
        current_value,
        (current_value - amount).max(0),
    );

    tracing::debug!(
        challenge_id = %challenge.id,
        amount,
        current_value,
        value_after,
        record_broken = record_break.is_some(),
        "custom reset"
    );

    CustomResetOutcome {
        challenge: Challenge {
            start_date,
            current_value: value_after,
            current_streak: 0,
            best_streak,
            reset_count: challenge.reset_count.saturating_add(1),
            last_reset_date: Some(now),
            last_calculated: now,
            updated_at: now,
            ..challenge.clone()
        },
        reset_log,
        record_break,
    }
}

/// Snapshot a challenge for deletion, with its value recomputed at `now`.
pub fn archive(challenge: &Challenge, now: DateTime<Utc>) -> DeletedChallenge {
    let refreshed = recompute(challenge, now).challenge;
    DeletedChallenge {
        final_value: refreshed.current_value,
        challenge: refreshed,
        deleted_at: now,
    }
}
