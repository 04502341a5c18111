//! Per-cell status and display text.

use super::model::{ChallengeKind, Entry, EntryStatus, GoalDirection, TrackerChallenge};

pub const EMPTY_GLYPH: &str = "—";
pub const SUCCESS_GLYPH: &str = "✓";
pub const FAILED_GLYPH: &str = "✗";
pub const NEUTRAL_GLYPH: &str = "–";

/// Classify an entry against its challenge's goal.
pub fn cell_status(challenge: &TrackerChallenge, entry: Option<&Entry>) -> EntryStatus {
    let Some(entry) = entry else {
        return EntryStatus::Empty;
    };
    if !entry.value.is_finite() {
        return EntryStatus::Neutral;
    }

    match challenge.kind {
        ChallengeKind::Boolean => {
            if entry.value == 1.0 {
                EntryStatus::Success
            } else if entry.value == 0.0 {
                EntryStatus::Failed
            } else {
                EntryStatus::Neutral
            }
        }
        ChallengeKind::Numeric | ChallengeKind::Duration => match challenge.goal_value {
            None => EntryStatus::Neutral,
            Some(goal) => {
                let met = match challenge.goal_direction.unwrap_or_default() {
                    GoalDirection::Minimize => entry.value <= goal,
                    GoalDirection::Maximize => entry.value >= goal,
                };
                if met {
                    EntryStatus::Success
                } else {
                    EntryStatus::Failed
                }
            }
        },
    }
}

/// Text shown inside a cell.
pub fn format_cell_value(challenge: &TrackerChallenge, entry: Option<&Entry>) -> String {
    let Some(entry) = entry else {
        return EMPTY_GLYPH.to_string();
    };

    match challenge.kind {
        ChallengeKind::Boolean => match cell_status(challenge, Some(entry)) {
            EntryStatus::Success => SUCCESS_GLYPH,
            EntryStatus::Failed => FAILED_GLYPH,
            EntryStatus::Neutral => NEUTRAL_GLYPH,
            EntryStatus::Empty => EMPTY_GLYPH,
        }
        .to_string(),
        ChallengeKind::Duration => format_minutes(entry.value),
        ChallengeKind::Numeric => entry.value.to_string(),
    }
}

/// `H:MM` from 60 minutes up, `Mm` below. Whole hours are floored; the
/// minutes part keeps any fraction (90.5 renders as `1:30.5`).
fn format_minutes(value: f64) -> String {
    if !value.is_finite() {
        return EMPTY_GLYPH.to_string();
    }
    let value = value.max(0.0);
    let hours = (value / 60.0).floor() as i64;
    let minutes = (value % 60.0).to_string();
    if hours > 0 {
        format!("{hours}:{minutes:0>2}")
    } else {
        format!("{minutes}m")
    }
}
