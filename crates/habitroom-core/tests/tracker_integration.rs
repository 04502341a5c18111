//! Integration tests for the daily tracker grid built from stored entries.

use chrono::{Duration, NaiveDate, Utc};
use habitroom_core::tracker::{
    build_grid, date_range, ChallengeKind, Entry, EntryStatus, GoalDirection, ParticipantData,
    TrackerChallenge, ViewMode, EMPTY_GLYPH, FAILED_GLYPH, SUCCESS_GLYPH,
};
use habitroom_core::Database;

const USER: &str = "user-1";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn seed(db: &Database) {
    let now = Utc::now();
    let challenges = [
        TrackerChallenge::new("meditate", "Meditate", ChallengeKind::Boolean),
        TrackerChallenge::new("sugar", "Grams of sugar", ChallengeKind::Numeric)
            .with_goal(25.0, GoalDirection::Minimize),
        TrackerChallenge::new("run", "Running", ChallengeKind::Duration)
            .with_goal(30.0, GoalDirection::Maximize),
    ];
    for (i, challenge) in challenges.iter().enumerate() {
        // Distinct creation times keep list order stable.
        db.save_tracker_challenge(USER, challenge, now + Duration::seconds(i as i64))
            .unwrap();
    }
    db.update_participant_data(
        USER,
        "meditate",
        ParticipantData {
            current_streak: 4,
            best_streak: 9,
        },
    )
    .unwrap();
}

#[test]
fn test_daily_grid_from_database() {
    let db = Database::open_memory().unwrap();
    seed(&db);
    let yesterday = today().pred_opt().unwrap();
    let now = Utc::now();

    let log = |id: &str, date: NaiveDate, value: f64| {
        db.upsert_entry(USER, id, date, &Entry::new(value), today(), now)
            .unwrap()
    };
    log("meditate", today(), 1.0);
    log("meditate", yesterday, 0.0);
    log("sugar", today(), 40.0);
    log("run", yesterday, 95.0);

    let dates = date_range(ViewMode::Daily, today());
    let entries = db
        .entries_between(USER, dates[0], dates[dates.len() - 1])
        .unwrap();
    let challenges = db.list_tracker_challenges(USER).unwrap();
    let grid = build_grid(ViewMode::Daily, today(), &challenges, &entries);

    assert_eq!(grid.dates, vec![yesterday, today()]);
    assert_eq!(grid.rows.len(), 3);

    // Logging recomputes streaks from entries; the seeded best survives.
    assert_eq!(
        challenges[0].participant_data,
        Some(ParticipantData {
            current_streak: 1,
            best_streak: 9,
        })
    );

    let meditate = &grid.rows[0];
    assert_eq!(meditate.current_streak, 1);
    assert_eq!(meditate.cells[0].display, FAILED_GLYPH);
    assert_eq!(meditate.cells[1].display, SUCCESS_GLYPH);

    let sugar = &grid.rows[1];
    assert_eq!(sugar.current_streak, 0);
    assert_eq!(sugar.cells[0].display, EMPTY_GLYPH);
    assert_eq!(sugar.cells[1].status, EntryStatus::Failed);

    let run = &grid.rows[2];
    assert_eq!(run.current_streak, 1);
    assert_eq!(run.cells[0].status, EntryStatus::Success);
    assert_eq!(run.cells[0].display, "1:35");

    // 4 recorded cells, 2 successful.
    assert_eq!(grid.stats.recorded_cells, 4);
    assert_eq!(grid.stats.successful_cells, 2);
    assert_eq!(grid.stats.success_rate, Some(50.0));
    assert_eq!(grid.stats.max_current_streak, 1);
    assert_eq!(grid.stats.active_challenges, 3);
}

#[test]
fn test_weekly_grid_ignores_entries_outside_range() {
    let db = Database::open_memory().unwrap();
    seed(&db);
    let now = Utc::now();
    let too_old = today() - Duration::days(8);
    db.upsert_entry(USER, "meditate", too_old, &Entry::new(1.0), today(), now)
        .unwrap();

    let dates = date_range(ViewMode::Weekly, today());
    assert_eq!(dates.len(), 8);
    let entries = db
        .entries_between(USER, dates[0], dates[dates.len() - 1])
        .unwrap();
    assert!(entries.is_empty());

    let grid = build_grid(
        ViewMode::Weekly,
        today(),
        &db.list_tracker_challenges(USER).unwrap(),
        &entries,
    );
    assert_eq!(grid.stats.success_rate, None);
    assert!(grid
        .rows
        .iter()
        .flat_map(|row| &row.cells)
        .all(|cell| cell.status == EntryStatus::Empty));
}

#[test]
fn test_entries_are_scoped_per_user() {
    let db = Database::open_memory().unwrap();
    seed(&db);
    let now = Utc::now();
    let streaks = db
        .upsert_entry("someone-else", "meditate", today(), &Entry::new(1.0), today(), now)
        .unwrap();
    assert_eq!(streaks, None);

    assert!(db.entries_between(USER, today(), today()).unwrap().is_empty());
    assert!(db.list_tracker_challenges("someone-else").unwrap().is_empty());
}

#[test]
fn test_consecutive_successes_build_current_streak() {
    let db = Database::open_memory().unwrap();
    let read = TrackerChallenge::new("read", "Read", ChallengeKind::Boolean);
    db.save_tracker_challenge(USER, &read, Utc::now()).unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
    for offset in (0..5).rev() {
        let date = today - Duration::days(offset);
        db.upsert_entry(USER, "read", date, &Entry::new(1.0), today, Utc::now())
            .unwrap();
    }

    let dates = date_range(ViewMode::Weekly, today);
    let entries = db
        .entries_between(USER, dates[0], dates[dates.len() - 1])
        .unwrap();
    let challenges = db.list_tracker_challenges(USER).unwrap();
    let grid = build_grid(ViewMode::Weekly, today, &challenges, &entries);

    assert_eq!(grid.rows[0].current_streak, 5);
    assert_eq!(grid.stats.max_current_streak, 5);
    assert_eq!(grid.stats.success_rate, Some(100.0));
}

#[test]
fn test_backfilling_a_gap_joins_the_streak() {
    let db = Database::open_memory().unwrap();
    let read = TrackerChallenge::new("read", "Read", ChallengeKind::Boolean);
    db.save_tracker_challenge(USER, &read, Utc::now()).unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
    let mut last = None;
    for offset in [4, 3, 1, 0] {
        let date = today - Duration::days(offset);
        last = db
            .upsert_entry(USER, "read", date, &Entry::new(1.0), today, Utc::now())
            .unwrap();
    }
    assert_eq!(last.map(|p| p.current_streak), Some(2));

    let filled = db
        .upsert_entry(USER, "read", today - Duration::days(2), &Entry::new(1.0), today, Utc::now())
        .unwrap();
    assert_eq!(
        filled,
        Some(ParticipantData {
            current_streak: 5,
            best_streak: 5,
        })
    );
}
