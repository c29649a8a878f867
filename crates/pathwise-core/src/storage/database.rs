//! SQLite-based history storage.
//!
//! Provides persistent storage for:
//! - Daily challenges with their status
//! - Mood check-ins
//! - Key-value store for engine state (the streak lives here)

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use crate::challenge::{ChallengeStatus, ChallengeTemplate, DailyChallenge, TrainingPath};
use crate::error::{CoreError, DatabaseError, Result};
use crate::history::{CheckIn, DateRange, HistoryStore, StatusFilter};
use crate::streak::StreakState;

const STREAK_KEY: &str = "streak_state";

/// SQLite database implementing [`HistoryStore`].
pub struct Database {
    conn: Connection,
}

/// Undecoded `daily_challenges` row.
struct ChallengeRow {
    id: String,
    template_json: String,
    date: String,
    created_at: String,
    status_json: String,
}

/// Undecoded `check_ins` row.
struct CheckInRow {
    id: String,
    recorded_at: String,
    date: String,
    mood: u8,
    note: Option<String>,
    path: Option<String>,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/pathwise/pathwise.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("pathwise.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS daily_challenges (
                id            TEXT PRIMARY KEY,
                path          TEXT NOT NULL,
                title         TEXT NOT NULL,
                template_json TEXT NOT NULL,
                date          TEXT NOT NULL,
                created_at    TEXT NOT NULL,
                status        TEXT NOT NULL,
                status_json   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS check_ins (
                id          TEXT PRIMARY KEY,
                recorded_at TEXT NOT NULL,
                date        TEXT NOT NULL,
                mood        INTEGER NOT NULL,
                note        TEXT,
                path        TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_challenges_path_date ON daily_challenges(path, date);
            CREATE INDEX IF NOT EXISTS idx_check_ins_date ON check_ins(date);",
        )?;
        Ok(())
    }

    /// Get a value from the key-value store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?)
    }

    /// Set a value in the key-value store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Number of stored challenges across all paths.
    pub fn challenge_count(&self) -> Result<u64, DatabaseError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM daily_challenges", [], |row| row.get(0))?)
    }

    fn rewrite_challenge(&self, challenge: &DailyChallenge) -> Result<()> {
        let changed = self.write_challenge(
            "UPDATE daily_challenges
             SET path = ?2, title = ?3, template_json = ?4, date = ?5,
                 created_at = ?6, status = ?7, status_json = ?8
             WHERE id = ?1",
            challenge,
        )?;
        if changed == 0 {
            return Err(CoreError::ChallengeNotFound(challenge.id.to_string()));
        }
        Ok(())
    }

    fn write_challenge(&self, sql: &str, challenge: &DailyChallenge) -> Result<usize> {
        let template_json = serde_json::to_string(&challenge.template)?;
        let status_json = serde_json::to_string(&challenge.status)?;
        let changed = self
            .conn
            .execute(
                sql,
                params![
                    challenge.id.to_string(),
                    challenge.path().as_str(),
                    challenge.title(),
                    template_json,
                    challenge.date.to_string(),
                    timestamp(challenge.created_at),
                    challenge.status.name(),
                    status_json,
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(changed)
    }
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn corrupt(table: &'static str, message: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::CorruptRow {
        table,
        message: message.to_string(),
    }
}

fn parse_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp '{raw}': {e}")))
}

fn parse_date(table: &'static str, raw: &str) -> Result<NaiveDate, DatabaseError> {
    raw.parse::<NaiveDate>()
        .map_err(|e| corrupt(table, format!("bad date '{raw}': {e}")))
}

fn parse_id(table: &'static str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| corrupt(table, format!("bad id '{raw}': {e}")))
}

impl ChallengeRow {
    const TABLE: &'static str = "daily_challenges";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            template_json: row.get(1)?,
            date: row.get(2)?,
            created_at: row.get(3)?,
            status_json: row.get(4)?,
        })
    }

    fn decode(self) -> Result<DailyChallenge, DatabaseError> {
        let template: ChallengeTemplate =
            serde_json::from_str(&self.template_json).map_err(|e| corrupt(Self::TABLE, e))?;
        let status: ChallengeStatus =
            serde_json::from_str(&self.status_json).map_err(|e| corrupt(Self::TABLE, e))?;
        Ok(DailyChallenge {
            id: parse_id(Self::TABLE, &self.id)?,
            template,
            date: parse_date(Self::TABLE, &self.date)?,
            created_at: parse_timestamp(Self::TABLE, &self.created_at)?,
            status,
        })
    }
}

impl CheckInRow {
    const TABLE: &'static str = "check_ins";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            recorded_at: row.get(1)?,
            date: row.get(2)?,
            mood: row.get(3)?,
            note: row.get(4)?,
            path: row.get(5)?,
        })
    }

    fn decode(self) -> Result<CheckIn, DatabaseError> {
        let path = self
            .path
            .as_deref()
            .map(|p| p.parse::<TrainingPath>())
            .transpose()
            .map_err(|e| corrupt(Self::TABLE, e))?;
        Ok(CheckIn {
            id: parse_id(Self::TABLE, &self.id)?,
            recorded_at: parse_timestamp(Self::TABLE, &self.recorded_at)?,
            date: parse_date(Self::TABLE, &self.date)?,
            mood: self.mood,
            note: self.note,
            path,
        })
    }
}

impl HistoryStore for Database {
    fn query_challenges(
        &self,
        path: TrainingPath,
        range: DateRange,
        status: Option<StatusFilter>,
    ) -> Result<Vec<DailyChallenge>> {
        let status_name = status.map(|s| match s {
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
            StatusFilter::Skipped => "skipped",
        });

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, template_json, date, created_at, status_json
                 FROM daily_challenges
                 WHERE path = ?1 AND date >= ?2 AND date <= ?3
                   AND (?4 IS NULL OR status = ?4)
                 ORDER BY date ASC, created_at ASC",
            )
            .map_err(DatabaseError::from)?;

        let rows = stmt
            .query_map(
                params![
                    path.as_str(),
                    range.start.to_string(),
                    range.end.to_string(),
                    status_name
                ],
                ChallengeRow::from_row,
            )
            .map_err(DatabaseError::from)?;

        let mut challenges = Vec::new();
        for row in rows {
            challenges.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(challenges)
    }

    fn query_check_ins(&self, range: DateRange) -> Result<Vec<CheckIn>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, recorded_at, date, mood, note, path
                 FROM check_ins
                 WHERE date >= ?1 AND date <= ?2
                 ORDER BY date ASC, recorded_at ASC",
            )
            .map_err(DatabaseError::from)?;

        let rows = stmt
            .query_map(
                params![range.start.to_string(), range.end.to_string()],
                CheckInRow::from_row,
            )
            .map_err(DatabaseError::from)?;

        let mut check_ins = Vec::new();
        for row in rows {
            check_ins.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(check_ins)
    }

    fn get_challenge(&self, id: Uuid) -> Result<Option<DailyChallenge>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, template_json, date, created_at, status_json
                 FROM daily_challenges WHERE id = ?1",
                params![id.to_string()],
                ChallengeRow::from_row,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(row.map(ChallengeRow::decode).transpose()?)
    }

    fn insert_challenge(&mut self, challenge: &DailyChallenge) -> Result<()> {
        self.write_challenge(
            "INSERT INTO daily_challenges
                (id, path, title, template_json, date, created_at, status, status_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            challenge,
        )?;
        Ok(())
    }

    fn update_challenge(&mut self, challenge: &DailyChallenge) -> Result<()> {
        self.rewrite_challenge(challenge)
    }

    fn insert_check_in(&mut self, check_in: &CheckIn) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO check_ins (id, recorded_at, date, mood, note, path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    check_in.id.to_string(),
                    timestamp(check_in.recorded_at),
                    check_in.date.to_string(),
                    check_in.mood,
                    check_in.note,
                    check_in.path.map(|p| p.as_str()),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn load_streak(&self) -> Result<Option<StreakState>> {
        match self.kv_get(STREAK_KEY)? {
            Some(json) => Ok(Some(
                serde_json::from_str(&json).map_err(|e| corrupt("kv", e))?,
            )),
            None => Ok(None),
        }
    }

    fn save_streak(&mut self, state: &StreakState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.kv_set(STREAK_KEY, &json)?;
        Ok(())
    }

    fn commit_transition(&mut self, challenge: &DailyChallenge, state: &StreakState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        let tx = self.conn.unchecked_transaction().map_err(DatabaseError::from)?;
        self.rewrite_challenge(challenge)?;
        self.kv_set(STREAK_KEY, &json)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }
}
