//! # Habitroom Core Library
//!
//! This library provides the core logic for Habitroom, a habit tracker built
//! around "time since I last did X" challenges and a daily check-in grid.
//! All operations are available through the standalone CLI binary, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Time units**: Elapsed-unit counting and instant advancement, with
//!   calendar-correct months
//! - **Challenge engine**: Pure recompute / reset / archive operations that take
//!   the current instant explicitly
//! - **Daily tracker**: Cell classification, date ranges and grid statistics
//! - **Storage**: SQLite persistence with an idempotent reset ledger, and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Challenge`]: A tracked habit and its cached counters
//! - [`custom_reset`] / [`full_reset`]: The two ways of restarting a challenge
//! - [`build_grid`]: Tracker grid for a view mode
//! - [`Database`]: Challenge, ledger and tracker persistence
//! - [`Config`]: Application configuration management

pub mod challenge;
pub mod error;
pub mod storage;
pub mod time_unit;
pub mod tracker;
pub mod validation;

pub use challenge::{
    archive, custom_reset, full_reset, full_reset_with_log, recompute, Challenge, ChallengeDraft,
    ChallengeRecordBreak, ChallengeResetLog, CustomResetOutcome, DeletedChallenge,
    FullResetOutcome, Mood, Recomputed, ResetContext,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use storage::{Config, Database, ResetWrite};
pub use time_unit::{advance_instant, elapsed_units, smart_display, TimeUnit};
pub use tracker::{
    build_grid, cell_status, format_cell_value, ChallengeKind, Entry, EntryStatus, TrackerChallenge,
    TrackerGrid, TrackerStats, ViewMode,
};
