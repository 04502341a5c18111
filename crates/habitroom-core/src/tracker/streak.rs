//! Participant streaks derived from logged entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::cell::cell_status;
use super::model::{Entry, EntryStatus, ParticipantData, TrackerChallenge};

/// Recompute a participant's streaks from every entry of one challenge.
///
/// The current streak counts consecutive successful days ending today. A day
/// not logged yet (or neutral) does not break it, so it then ends yesterday;
/// a failure today resets it to 0. The best streak never decreases below
/// `previous_best`.
pub fn participant_streaks(
    challenge: &TrackerChallenge,
    entries: &BTreeMap<NaiveDate, Entry>,
    today: NaiveDate,
    previous_best: i64,
) -> ParticipantData {
    let succeeded =
        |date: &NaiveDate| cell_status(challenge, entries.get(date)) == EntryStatus::Success;

    let anchor = match cell_status(challenge, entries.get(&today)) {
        EntryStatus::Success => Some(today),
        EntryStatus::Failed => None,
        EntryStatus::Empty | EntryStatus::Neutral => today.pred_opt(),
    };
    let mut current = 0;
    let mut day = anchor;
    while let Some(date) = day.filter(succeeded) {
        current += 1;
        day = date.pred_opt();
    }

    let mut longest = 0;
    let mut run = 0;
    let mut last_success: Option<NaiveDate> = None;
    for (&date, entry) in entries {
        if cell_status(challenge, Some(entry)) != EntryStatus::Success {
            last_success = None;
            continue;
        }
        run = match last_success.and_then(|d| d.succ_opt()) {
            Some(next) if next == date => run + 1,
            _ => 1,
        };
        last_success = Some(date);
        longest = longest.max(run);
    }

    ParticipantData {
        current_streak: current,
        best_streak: previous_best.max(longest).max(current),
    }
}
