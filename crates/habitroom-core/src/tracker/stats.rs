//! Range-level tracker statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cell::cell_status;
use super::model::{entry_for, EntriesByDate, EntryStatus, TrackerChallenge};

/// Summary shown above the tracker grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerStats {
    /// Percentage (0-100) of recorded cells that succeeded, `None` when
    /// nothing was recorded in range.
    pub success_rate: Option<f64>,
    /// Highest persisted current streak across the challenges.
    pub max_current_streak: i64,
    pub active_challenges: usize,
    pub recorded_cells: usize,
    pub successful_cells: usize,
}

/// Compute statistics over every (challenge, date) cell in `dates`.
pub fn aggregate_stats(
    challenges: &[TrackerChallenge],
    entries: &EntriesByDate,
    dates: &[NaiveDate],
) -> TrackerStats {
    let mut recorded_cells = 0;
    let mut successful_cells = 0;

    for challenge in challenges {
        for &date in dates {
            match cell_status(challenge, entry_for(entries, date, &challenge.id)) {
                EntryStatus::Empty => {}
                EntryStatus::Success => {
                    recorded_cells += 1;
                    successful_cells += 1;
                }
                EntryStatus::Failed | EntryStatus::Neutral => recorded_cells += 1,
            }
        }
    }

    let success_rate = (recorded_cells > 0)
        .then(|| successful_cells as f64 / recorded_cells as f64 * 100.0);

    TrackerStats {
        success_rate,
        max_current_streak: challenges
            .iter()
            .map(TrackerChallenge::current_streak)
            .max()
            .unwrap_or(0),
        active_challenges: challenges.len(),
        recorded_cells,
        successful_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ChallengeKind, Entry, GoalDirection, ParticipantData};
    use std::collections::HashMap;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn put(entries: &mut EntriesByDate, d: u32, id: &str, value: f64) {
        entries
            .entry(date(d))
            .or_insert_with(HashMap::new)
            .insert(id.to_string(), Entry::new(value));
    }

    #[test]
    fn success_rate_counts_only_recorded_cells() {
        let mut meditate = TrackerChallenge::new("m", "Meditate", ChallengeKind::Boolean);
        meditate.participant_data = Some(ParticipantData {
            current_streak: 4,
            best_streak: 9,
        });
        let mut run = TrackerChallenge::new("r", "Run", ChallengeKind::Numeric)
            .with_goal(5.0, GoalDirection::Maximize);
        run.participant_data = Some(ParticipantData {
            current_streak: 6,
            best_streak: 6,
        });

        let mut entries = EntriesByDate::new();
        put(&mut entries, 1, "m", 1.0);
        put(&mut entries, 2, "m", 0.0);
        put(&mut entries, 2, "r", 7.0);
        // Outside the requested range.
        put(&mut entries, 9, "r", 1.0);

        let stats = aggregate_stats(&[meditate, run], &entries, &[date(1), date(2), date(3)]);

        assert_eq!(stats.recorded_cells, 3);
        assert_eq!(stats.successful_cells, 2);
        let rate = stats.success_rate.unwrap();
        assert!((rate - 66.666).abs() < 0.01);
        assert_eq!(stats.max_current_streak, 6);
        assert_eq!(stats.active_challenges, 2);
    }

    #[test]
    fn neutral_cells_count_against_success_rate() {
        let free = TrackerChallenge::new("f", "Journal", ChallengeKind::Numeric);
        let mut entries = EntriesByDate::new();
        put(&mut entries, 1, "f", 3.0);

        let stats = aggregate_stats(&[free], &entries, &[date(1)]);
        assert_eq!(stats.success_rate, Some(0.0));
    }

    #[test]
    fn empty_range_has_no_rate() {
        let stats = aggregate_stats(&[], &EntriesByDate::new(), &[date(1)]);
        assert_eq!(stats.success_rate, None);
        assert_eq!(stats.max_current_streak, 0);
    }
}
