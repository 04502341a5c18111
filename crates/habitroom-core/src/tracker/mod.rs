//! Daily tracker aggregation.
//!
//! Turns per-date entries for a set of tracker challenges into a status grid
//! and summary statistics. Every function here is total over its input:
//! missing dates or ids read as `Empty`, never as errors.

mod cell;
mod grid;
mod model;
mod range;
mod stats;
mod streak;

pub use cell::{
    cell_status, format_cell_value, EMPTY_GLYPH, FAILED_GLYPH, NEUTRAL_GLYPH, SUCCESS_GLYPH,
};
pub use grid::{build_grid, TrackerCell, TrackerGrid, TrackerRow};
pub use model::{
    entry_for, ChallengeKind, EntriesByDate, Entry, EntryStatus, GoalDirection, ParticipantData,
    TrackerChallenge,
};
pub use range::{date_range, format_date_key, parse_date_key, ViewMode, DATE_KEY_FORMAT};
pub use stats::{aggregate_stats, TrackerStats};
pub use streak::participant_streaks;
