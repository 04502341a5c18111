//! Database schema migrations for habitroom.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub(crate) fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: challenges and their append-only ledger.
///
/// Ledger rows are unique per `operation_id` so a retried save of the same
/// reset is ignored instead of appended twice.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS challenges (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL,
            name                TEXT NOT NULL,
            start_date          TEXT NOT NULL,
            time_unit           TEXT NOT NULL,
            custom_reset_amount INTEGER NOT NULL,
            current_value       INTEGER NOT NULL DEFAULT 0,
            current_streak      INTEGER NOT NULL DEFAULT 0,
            best_streak         INTEGER NOT NULL DEFAULT 0,
            reset_count         INTEGER NOT NULL DEFAULT 0,
            last_reset_date     TEXT,
            last_calculated     TEXT NOT NULL,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS deleted_challenges (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            snapshot    TEXT NOT NULL,
            final_value INTEGER NOT NULL,
            deleted_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reset_logs (
            id                 TEXT PRIMARY KEY,
            operation_id       TEXT NOT NULL UNIQUE,
            challenge_id       TEXT NOT NULL,
            user_id            TEXT NOT NULL,
            timestamp          TEXT NOT NULL,
            amount_reduced     INTEGER NOT NULL,
            reason             TEXT NOT NULL,
            mood               INTEGER NOT NULL,
            value_before_reset INTEGER NOT NULL,
            value_after_reset  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS record_breaks (
            id               TEXT PRIMARY KEY,
            operation_id     TEXT NOT NULL UNIQUE,
            challenge_id     TEXT NOT NULL,
            user_id          TEXT NOT NULL,
            timestamp        TEXT NOT NULL,
            old_record       INTEGER NOT NULL,
            new_record       INTEGER NOT NULL,
            improvement      INTEGER NOT NULL,
            is_global_record INTEGER NOT NULL DEFAULT 0,
            context          TEXT,
            reason           TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_challenges_user ON challenges(user_id);
        CREATE INDEX IF NOT EXISTS idx_reset_logs_challenge ON reset_logs(challenge_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_record_breaks_challenge ON record_breaks(challenge_id, timestamp);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: daily tracker challenges and per-date entries.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS tracker_challenges (
            id             TEXT NOT NULL,
            user_id        TEXT NOT NULL,
            title          TEXT NOT NULL,
            kind           TEXT NOT NULL,
            goal_value     REAL,
            goal_direction TEXT,
            current_streak INTEGER NOT NULL DEFAULT 0,
            best_streak    INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            PRIMARY KEY (user_id, id)
        );

        CREATE TABLE IF NOT EXISTS tracker_entries (
            challenge_id TEXT NOT NULL,
            user_id      TEXT NOT NULL,
            entry_date   TEXT NOT NULL,
            value        REAL NOT NULL,
            notes        TEXT,
            updated_at   TEXT NOT NULL,
            PRIMARY KEY (challenge_id, user_id, entry_date)
        );

        CREATE INDEX IF NOT EXISTS idx_tracker_entries_date ON tracker_entries(user_id, entry_date);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        for table in [
            "challenges",
            "deleted_challenges",
            "reset_logs",
            "record_breaks",
            "tracker_challenges",
            "tracker_entries",
        ] {
            let count: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 1);

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
        conn.prepare("SELECT challenge_id, entry_date, value FROM tracker_entries")
            .unwrap();
    }
}
