//! Full tracker grid: one row per challenge, one cell per date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cell::{cell_status, format_cell_value};
use super::model::{entry_for, ChallengeKind, EntriesByDate, EntryStatus, TrackerChallenge};
use super::range::{date_range, ViewMode};
use super::stats::{aggregate_stats, TrackerStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerCell {
    pub date: NaiveDate,
    pub status: EntryStatus,
    pub display: String,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerRow {
    pub challenge_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub current_streak: i64,
    pub cells: Vec<TrackerCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerGrid {
    pub view_mode: ViewMode,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<TrackerRow>,
    pub stats: TrackerStats,
}

/// Build the grid for `view_mode` ending at `today`.
pub fn build_grid(
    view_mode: ViewMode,
    today: NaiveDate,
    challenges: &[TrackerChallenge],
    entries: &EntriesByDate,
) -> TrackerGrid {
    let dates = date_range(view_mode, today);

    let rows = challenges
        .iter()
        .map(|challenge| TrackerRow {
            challenge_id: challenge.id.clone(),
            title: challenge.title.clone(),
            kind: challenge.kind,
            current_streak: challenge.current_streak(),
            cells: dates
                .iter()
                .map(|&date| {
                    let entry = entry_for(entries, date, &challenge.id);
                    TrackerCell {
                        date,
                        status: cell_status(challenge, entry),
                        display: format_cell_value(challenge, entry),
                        is_today: date == today,
                    }
                })
                .collect(),
        })
        .collect();

    TrackerGrid {
        view_mode,
        stats: aggregate_stats(challenges, entries, &dates),
        dates,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::cell::EMPTY_GLYPH;
    use crate::tracker::{Entry, GoalDirection};
    use std::collections::HashMap;

    #[test]
    fn grid_fills_missing_cells_with_empty() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let water = TrackerChallenge::new("w", "Water glasses", ChallengeKind::Numeric)
            .with_goal(8.0, GoalDirection::Maximize);

        let mut entries = EntriesByDate::new();
        entries.insert(
            today,
            HashMap::from([("w".to_string(), Entry::new(9.0))]),
        );
        // Entry for a challenge not in the list is ignored.
        entries.insert(
            yesterday,
            HashMap::from([("ghost".to_string(), Entry::new(1.0))]),
        );

        let grid = build_grid(ViewMode::Daily, today, &[water], &entries);

        assert_eq!(grid.dates, vec![yesterday, today]);
        let cells = &grid.rows[0].cells;
        assert_eq!(cells[0].status, EntryStatus::Empty);
        assert_eq!(cells[0].display, EMPTY_GLYPH);
        assert!(!cells[0].is_today);
        assert_eq!(cells[1].status, EntryStatus::Success);
        assert_eq!(cells[1].display, "9");
        assert!(cells[1].is_today);
        assert_eq!(grid.stats.success_rate, Some(100.0));
    }
}
