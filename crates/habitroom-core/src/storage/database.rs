//! SQLite-based storage for challenges, their ledger, and tracker entries.
//!
//! Provides persistent storage for:
//! - Challenges and snapshots of deleted challenges
//! - Reset logs and record breaks (insert and query only)
//! - Daily tracker challenges and per-date entries

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::data_dir;
use super::migrations;
use crate::challenge::{
    Challenge, ChallengeRecordBreak, ChallengeResetLog, DeletedChallenge, Mood,
};
use crate::error::{CoreError, DatabaseError, Result};
use crate::time_unit::TimeUnit;
use crate::tracker::{
    format_date_key, parse_date_key, participant_streaks, ChallengeKind, EntriesByDate, Entry,
    GoalDirection, ParticipantData, TrackerChallenge,
};

const CHALLENGE_COLUMNS: &str = "id, user_id, name, start_date, time_unit, custom_reset_amount,
     current_value, current_streak, best_streak, reset_count, last_reset_date,
     last_calculated, created_at, updated_at";

// === Helper Functions ===

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(DatabaseError::QueryFailed(message)),
    )
}

fn parse_datetime(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, format!("bad timestamp '{raw}': {e}")))
}

fn parse_optional_datetime(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => parse_datetime(row, idx).map(Some),
        None => Ok(None),
    }
}

fn parse_uuid(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, format!("bad id '{raw}': {e}")))
}

fn parse_enum<T: std::str::FromStr>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| conversion_error(idx, format!("bad value '{raw}': {e}")))
}

fn row_to_challenge(row: &Row) -> rusqlite::Result<Challenge> {
    Ok(Challenge {
        id: parse_uuid(row, 0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        start_date: parse_datetime(row, 3)?,
        time_unit: parse_enum::<TimeUnit>(row, 4)?,
        custom_reset_amount: row.get(5)?,
        current_value: row.get(6)?,
        current_streak: row.get(7)?,
        best_streak: row.get(8)?,
        reset_count: row.get(9)?,
        last_reset_date: parse_optional_datetime(row, 10)?,
        last_calculated: parse_datetime(row, 11)?,
        created_at: parse_datetime(row, 12)?,
        updated_at: parse_datetime(row, 13)?,
    })
}

fn row_to_reset_log(row: &Row) -> rusqlite::Result<ChallengeResetLog> {
    let mood: u8 = row.get(7)?;
    Ok(ChallengeResetLog {
        id: parse_uuid(row, 0)?,
        operation_id: parse_uuid(row, 1)?,
        challenge_id: parse_uuid(row, 2)?,
        user_id: row.get(3)?,
        timestamp: parse_datetime(row, 4)?,
        amount_reduced: row.get(5)?,
        reason: row.get(6)?,
        mood: Mood::new(mood).map_err(|e| conversion_error(7, e.to_string()))?,
        value_before_reset: row.get(8)?,
        value_after_reset: row.get(9)?,
    })
}

fn row_to_record_break(row: &Row) -> rusqlite::Result<ChallengeRecordBreak> {
    Ok(ChallengeRecordBreak {
        id: parse_uuid(row, 0)?,
        operation_id: parse_uuid(row, 1)?,
        challenge_id: parse_uuid(row, 2)?,
        user_id: row.get(3)?,
        timestamp: parse_datetime(row, 4)?,
        old_record: row.get(5)?,
        new_record: row.get(6)?,
        improvement: row.get(7)?,
        is_global_record: row.get(8)?,
        context: row.get(9)?,
        reason: row.get(10)?,
    })
}

fn row_to_tracker_challenge(row: &Row) -> rusqlite::Result<TrackerChallenge> {
    let direction: Option<String> = row.get(4)?;
    Ok(TrackerChallenge {
        id: row.get(0)?,
        title: row.get(1)?,
        kind: parse_enum::<ChallengeKind>(row, 2)?,
        goal_value: row.get(3)?,
        goal_direction: direction
            .map(|d| d.parse::<GoalDirection>())
            .transpose()
            .map_err(|e| conversion_error(4, e.to_string()))?,
        participant_data: Some(ParticipantData {
            current_streak: row.get(5)?,
            best_streak: row.get(6)?,
        }),
    })
}

/// Everything a reset produces, written together.
#[derive(Debug, Clone)]
pub struct ResetWrite<'a> {
    pub challenge: &'a Challenge,
    pub reset_log: &'a ChallengeResetLog,
    pub record_break: Option<&'a ChallengeRecordBreak>,
}

/// SQLite database for challenges, their ledger and tracker entries.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitroom/habitroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("habitroom.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Challenges ───────────────────────────────────────────────────

    /// Insert or replace a challenge.
    pub fn save_challenge(&self, challenge: &Challenge) -> Result<()> {
        Self::write_challenge(&self.conn, challenge)?;
        Ok(())
    }

    fn write_challenge(conn: &Connection, c: &Challenge) -> rusqlite::Result<usize> {
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO challenges ({CHALLENGE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                c.id.to_string(),
                c.user_id,
                c.name,
                format_datetime(c.start_date),
                c.time_unit.as_str(),
                c.custom_reset_amount,
                c.current_value,
                c.current_streak,
                c.best_streak,
                c.reset_count,
                c.last_reset_date.map(format_datetime),
                format_datetime(c.last_calculated),
                format_datetime(c.created_at),
                format_datetime(c.updated_at),
            ],
        )
    }

    pub fn get_challenge(&self, id: Uuid) -> Result<Option<Challenge>> {
        let challenge = self
            .conn
            .query_row(
                &format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = ?1"),
                params![id.to_string()],
                row_to_challenge,
            )
            .optional()?;
        Ok(challenge)
    }

    /// Like [`Database::get_challenge`], but a missing challenge is an error.
    pub fn require_challenge(&self, id: Uuid) -> Result<Challenge> {
        self.get_challenge(id)?.ok_or_else(|| CoreError::NotFound {
            kind: "challenge",
            id: id.to_string(),
        })
    }

    /// All challenges of a user, oldest first.
    pub fn list_challenges(&self, user_id: &str) -> Result<Vec<Challenge>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges
             WHERE user_id = ?1
             ORDER BY created_at ASC"
        ))?;
        let challenges = stmt
            .query_map(params![user_id], row_to_challenge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(challenges)
    }

    pub fn count_challenges(&self, user_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM challenges WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Remove a challenge, keeping the given snapshot. Ledger rows stay.
    pub fn delete_challenge(&self, deleted: &DeletedChallenge) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let snapshot = serde_json::to_string(&deleted.challenge)?;
        tx.execute(
            "INSERT OR REPLACE INTO deleted_challenges (id, user_id, snapshot, final_value, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                deleted.challenge.id.to_string(),
                deleted.challenge.user_id,
                snapshot,
                deleted.final_value,
                format_datetime(deleted.deleted_at),
            ],
        )?;
        let removed = tx.execute(
            "DELETE FROM challenges WHERE id = ?1",
            params![deleted.challenge.id.to_string()],
        )?;
        if removed == 0 {
            return Err(CoreError::NotFound {
                kind: "challenge",
                id: deleted.challenge.id.to_string(),
            });
        }
        tx.commit()?;
        tracing::debug!(challenge_id = %deleted.challenge.id, "challenge archived");
        Ok(())
    }

    /// Archived challenges of a user, most recently deleted first.
    pub fn list_deleted_challenges(&self, user_id: &str) -> Result<Vec<DeletedChallenge>> {
        let mut stmt = self.conn.prepare(
            "SELECT snapshot, final_value, deleted_at FROM deleted_challenges
             WHERE user_id = ?1
             ORDER BY deleted_at DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, parse_datetime(row, 2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(snapshot, final_value, deleted_at)| -> Result<DeletedChallenge> {
                Ok(DeletedChallenge {
                    challenge: serde_json::from_str(&snapshot)?,
                    final_value,
                    deleted_at,
                })
            })
            .collect()
    }

    // ── Ledger ───────────────────────────────────────────────────────

    /// Persist the outcome of a reset in one transaction.
    ///
    /// Ledger rows are keyed by `operation_id`; writing the same reset again
    /// updates nothing in the ledger. Returns `true` if the reset log was new.
    pub fn apply_reset(&self, write: ResetWrite<'_>) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = Self::insert_reset_log(&tx, write.reset_log)?;
        if inserted {
            Self::write_challenge(&tx, write.challenge)?;
            if let Some(record) = write.record_break {
                Self::insert_record_break(&tx, record)?;
            }
        } else {
            tracing::warn!(
                operation_id = %write.reset_log.operation_id,
                "reset already recorded, ignoring duplicate"
            );
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Append a reset log. Returns `false` if its operation was already recorded.
    pub fn append_reset_log(&self, log: &ChallengeResetLog) -> Result<bool> {
        Ok(Self::insert_reset_log(&self.conn, log)?)
    }

    /// Append a record break. Returns `false` if its operation was already recorded.
    pub fn append_record_break(&self, record: &ChallengeRecordBreak) -> Result<bool> {
        Ok(Self::insert_record_break(&self.conn, record)?)
    }

    fn insert_reset_log(conn: &Connection, log: &ChallengeResetLog) -> rusqlite::Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO reset_logs
                (id, operation_id, challenge_id, user_id, timestamp, amount_reduced,
                 reason, mood, value_before_reset, value_after_reset)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                log.id.to_string(),
                log.operation_id.to_string(),
                log.challenge_id.to_string(),
                log.user_id,
                format_datetime(log.timestamp),
                log.amount_reduced,
                log.reason,
                log.mood.get(),
                log.value_before_reset,
                log.value_after_reset,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn insert_record_break(
        conn: &Connection,
        record: &ChallengeRecordBreak,
    ) -> rusqlite::Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO record_breaks
                (id, operation_id, challenge_id, user_id, timestamp, old_record,
                 new_record, improvement, is_global_record, context, reason)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id.to_string(),
                record.operation_id.to_string(),
                record.challenge_id.to_string(),
                record.user_id,
                format_datetime(record.timestamp),
                record.old_record,
                record.new_record,
                record.improvement,
                record.is_global_record,
                record.context,
                record.reason,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Reset logs of a challenge, newest first.
    pub fn reset_logs(&self, challenge_id: Uuid) -> Result<Vec<ChallengeResetLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, operation_id, challenge_id, user_id, timestamp, amount_reduced,
                    reason, mood, value_before_reset, value_after_reset
             FROM reset_logs
             WHERE challenge_id = ?1
             ORDER BY timestamp DESC",
        )?;
        let logs = stmt
            .query_map(params![challenge_id.to_string()], row_to_reset_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    /// Record breaks of a challenge, newest first.
    pub fn record_breaks(&self, challenge_id: Uuid) -> Result<Vec<ChallengeRecordBreak>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, operation_id, challenge_id, user_id, timestamp, old_record,
                    new_record, improvement, is_global_record, context, reason
             FROM record_breaks
             WHERE challenge_id = ?1
             ORDER BY timestamp DESC",
        )?;
        let records = stmt
            .query_map(params![challenge_id.to_string()], row_to_record_break)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    // ── Daily tracker ────────────────────────────────────────────────

    /// Insert or replace a tracker challenge for a user.
    pub fn save_tracker_challenge(
        &self,
        user_id: &str,
        challenge: &TrackerChallenge,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let participant = challenge.participant_data.unwrap_or_default();
        self.conn.execute(
            "INSERT OR REPLACE INTO tracker_challenges
                (id, user_id, title, kind, goal_value, goal_direction,
                 current_streak, best_streak, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                challenge.id,
                user_id,
                challenge.title,
                challenge.kind.as_str(),
                challenge.goal_value,
                challenge.goal_direction.map(|d| d.as_str()),
                participant.current_streak,
                participant.best_streak,
                format_datetime(created_at),
            ],
        )?;
        Ok(())
    }

    pub fn list_tracker_challenges(&self, user_id: &str) -> Result<Vec<TrackerChallenge>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, kind, goal_value, goal_direction, current_streak, best_streak
             FROM tracker_challenges
             WHERE user_id = ?1
             ORDER BY created_at ASC",
        )?;
        let challenges = stmt
            .query_map(params![user_id], row_to_tracker_challenge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(challenges)
    }

    pub fn get_tracker_challenge(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<TrackerChallenge>> {
        let challenge = self
            .conn
            .query_row(
                "SELECT id, title, kind, goal_value, goal_direction, current_streak, best_streak
                 FROM tracker_challenges
                 WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
                row_to_tracker_challenge,
            )
            .optional()?;
        Ok(challenge)
    }

    fn write_participant_data(
        conn: &Connection,
        user_id: &str,
        id: &str,
        data: ParticipantData,
    ) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE tracker_challenges SET current_streak = ?1, best_streak = ?2
             WHERE user_id = ?3 AND id = ?4",
            params![data.current_streak, data.best_streak, user_id, id],
        )
    }

    /// Update the persisted participant streaks of a tracker challenge.
    pub fn update_participant_data(
        &self,
        user_id: &str,
        id: &str,
        data: ParticipantData,
    ) -> Result<()> {
        if Self::write_participant_data(&self.conn, user_id, id, data)? == 0 {
            return Err(CoreError::NotFound {
                kind: "tracker challenge",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Every entry a user logged for one tracker challenge, by date.
    fn challenge_entries(
        conn: &Connection,
        user_id: &str,
        challenge_id: &str,
    ) -> rusqlite::Result<BTreeMap<NaiveDate, Entry>> {
        let mut stmt = conn.prepare(
            "SELECT entry_date, value, notes
             FROM tracker_entries
             WHERE challenge_id = ?1 AND user_id = ?2",
        )?;
        let rows = stmt
            .query_map(params![challenge_id, user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    Entry {
                        value: row.get(1)?,
                        notes: row.get(2)?,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut entries = BTreeMap::new();
        for (date_key, entry) in rows {
            match parse_date_key(&date_key) {
                Ok(date) => {
                    entries.insert(date, entry);
                }
                Err(e) => tracing::warn!(%date_key, error = %e, "skipping tracker entry"),
            }
        }
        Ok(entries)
    }

    /// Record the entry for (challenge, date), replacing any earlier one, and
    /// refresh the participant streaks as of `today` in the same transaction.
    ///
    /// Returns the new streaks, or `None` when the user has no tracker
    /// challenge with that id.
    pub fn upsert_entry(
        &self,
        user_id: &str,
        challenge_id: &str,
        date: NaiveDate,
        entry: &Entry,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<ParticipantData>> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tracker_entries (challenge_id, user_id, entry_date, value, notes, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (challenge_id, user_id, entry_date)
             DO UPDATE SET value = excluded.value, notes = excluded.notes,
                           updated_at = excluded.updated_at",
            params![
                challenge_id,
                user_id,
                format_date_key(date),
                entry.value,
                entry.notes,
                format_datetime(now),
            ],
        )?;

        let challenge = tx
            .query_row(
                "SELECT id, title, kind, goal_value, goal_direction, current_streak, best_streak
                 FROM tracker_challenges
                 WHERE user_id = ?1 AND id = ?2",
                params![user_id, challenge_id],
                row_to_tracker_challenge,
            )
            .optional()?;
        let Some(challenge) = challenge else {
            tx.commit()?;
            return Ok(None);
        };

        let entries = Self::challenge_entries(&tx, user_id, challenge_id)?;
        let previous_best = challenge.participant_data.unwrap_or_default().best_streak;
        let data = participant_streaks(&challenge, &entries, today, previous_best);
        Self::write_participant_data(&tx, user_id, challenge_id, data)?;
        tx.commit()?;

        tracing::debug!(
            challenge_id,
            current_streak = data.current_streak,
            best_streak = data.best_streak,
            "tracker streaks updated"
        );
        Ok(Some(data))
    }

    /// Entries of a user between `start` and `end` inclusive.
    ///
    /// Rows whose date key cannot be parsed are skipped with a warning.
    pub fn entries_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<EntriesByDate> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_date, challenge_id, value, notes
             FROM tracker_entries
             WHERE user_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3",
        )?;
        let rows = stmt
            .query_map(
                params![user_id, format_date_key(start), format_date_key(end)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        Entry {
                            value: row.get(2)?,
                            notes: row.get(3)?,
                        },
                    ))
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut entries = EntriesByDate::new();
        for (date_key, challenge_id, entry) in rows {
            match parse_date_key(&date_key) {
                Ok(date) => {
                    entries
                        .entry(date)
                        .or_insert_with(HashMap::new)
                        .insert(challenge_id, entry);
                }
                Err(e) => tracing::warn!(%date_key, error = %e, "skipping tracker entry"),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{custom_reset, ChallengeDraft, ResetContext};
    use chrono::{Duration, TimeZone};

    fn sample(now: DateTime<Utc>) -> Challenge {
        Challenge::new(
            "user-1",
            ChallengeDraft {
                name: "No soda".to_string(),
                time_unit: TimeUnit::Days,
                custom_reset_amount: 2,
            },
            now - Duration::days(5),
        )
    }

    #[test]
    fn challenge_roundtrip() {
        let db = Database::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let mut challenge = sample(now);
        challenge.last_reset_date = Some(now - Duration::hours(3));

        db.save_challenge(&challenge).unwrap();

        assert_eq!(db.get_challenge(challenge.id).unwrap(), Some(challenge.clone()));
        assert_eq!(db.list_challenges("user-1").unwrap().len(), 1);
        assert_eq!(db.count_challenges("someone-else").unwrap(), 0);
    }

    #[test]
    fn missing_challenge_is_not_found() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(
            db.require_challenge(Uuid::new_v4()),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn apply_reset_is_idempotent_per_operation() {
        let db = Database::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let challenge = sample(now);
        db.save_challenge(&challenge).unwrap();

        let context = ResetContext::new("stress", Mood::new(2).unwrap());
        let outcome = custom_reset(&challenge, now, &context);
        let write = ResetWrite {
            challenge: &outcome.challenge,
            reset_log: &outcome.reset_log,
            record_break: outcome.record_break.as_ref(),
        };

        assert!(db.apply_reset(write.clone()).unwrap());
        assert!(!db.apply_reset(write).unwrap());

        assert_eq!(db.reset_logs(challenge.id).unwrap().len(), 1);
        assert_eq!(db.record_breaks(challenge.id).unwrap().len(), 1);
        let stored = db.require_challenge(challenge.id).unwrap();
        assert_eq!(stored.reset_count, 1);
        assert_eq!(stored.best_streak, 5);
    }

    #[test]
    fn delete_keeps_snapshot_and_ledger() {
        let db = Database::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let challenge = sample(now);
        db.save_challenge(&challenge).unwrap();
        let outcome = custom_reset(&challenge, now, &ResetContext::new("x", Mood::NEUTRAL));
        db.append_reset_log(&outcome.reset_log).unwrap();

        let deleted = crate::challenge::archive(&challenge, now);
        db.delete_challenge(&deleted).unwrap();

        assert!(db.get_challenge(challenge.id).unwrap().is_none());
        let archived = db.list_deleted_challenges("user-1").unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].final_value, 5);
        assert_eq!(db.reset_logs(challenge.id).unwrap().len(), 1);
        assert!(db.delete_challenge(&deleted).is_err());
    }

    #[test]
    fn entries_upsert_per_date() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        let day = NaiveDate::from_ymd_opt(2025, 5, 4).unwrap();
        let tracker = TrackerChallenge::new("walk", "Walk", ChallengeKind::Duration)
            .with_goal(30.0, GoalDirection::Maximize);
        db.save_tracker_challenge("user-1", &tracker, now).unwrap();

        let failed = db.upsert_entry("user-1", "walk", day, &Entry::new(20.0), day, now).unwrap();
        assert_eq!(failed, Some(ParticipantData::default()));
        db.upsert_entry("user-1", "walk", day, &Entry::new(45.0), day, now).unwrap();

        let entries = db.entries_between("user-1", day, day).unwrap();
        assert_eq!(entries[&day]["walk"].value, 45.0);

        let before = day.pred_opt().unwrap();
        assert!(db.entries_between("user-1", before, before).unwrap().is_empty());

        let loaded = db.get_tracker_challenge("user-1", "walk").unwrap().unwrap();
        assert_eq!(loaded.goal_direction, Some(GoalDirection::Maximize));
        assert_eq!(loaded.current_streak(), 1);
    }

    #[test]
    fn upsert_entry_refreshes_streaks() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        let tracker = TrackerChallenge::new("read", "Read", ChallengeKind::Boolean);
        db.save_tracker_challenge("u", &tracker, now).unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        for offset in (0..5).rev() {
            let date = today - Duration::days(offset);
            db.upsert_entry("u", "read", date, &Entry::new(1.0), today, now).unwrap();
        }
        let loaded = db.get_tracker_challenge("u", "read").unwrap().unwrap();
        assert_eq!(
            loaded.participant_data,
            Some(ParticipantData {
                current_streak: 5,
                best_streak: 5,
            })
        );

        // Turning today into a failure ends the current streak but keeps the best.
        let data = db
            .upsert_entry("u", "read", today, &Entry::new(0.0), today, now)
            .unwrap();
        assert_eq!(
            data,
            Some(ParticipantData {
                current_streak: 0,
                best_streak: 5,
            })
        );

        // Entries for a challenge the user does not track are stored without streaks.
        assert_eq!(
            db.upsert_entry("other", "read", today, &Entry::new(1.0), today, now)
                .unwrap(),
            None
        );
        assert_eq!(db.entries_between("other", today, today).unwrap().len(), 1);
    }

    #[test]
    fn participant_data_updates() {
        let db = Database::open_memory().unwrap();
        let tracker = TrackerChallenge::new("read", "Read", ChallengeKind::Boolean);
        db.save_tracker_challenge("u", &tracker, Utc::now()).unwrap();

        db.update_participant_data(
            "u",
            "read",
            ParticipantData {
                current_streak: 3,
                best_streak: 8,
            },
        )
        .unwrap();

        let loaded = db.list_tracker_challenges("u").unwrap();
        assert_eq!(loaded[0].current_streak(), 3);
        assert!(db
            .update_participant_data("u", "missing", ParticipantData::default())
            .is_err());
    }
}
