// SQLite-backed key-value cache of the last lineup board state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::warn;

use crate::lineup::Snapshot;

/// Key used in the lineup_state table for the board snapshot.
const BOARD_KEY: &str = "board";

/// Local cache for the last board state, mirroring what the user would
/// expect to survive a restart. Nothing else is persisted.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database
    /// (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS lineup_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Store the board snapshot, replacing any previous one.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot).context("failed to serialize snapshot")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO lineup_state (key, value) VALUES (?1, ?2)",
                params![BOARD_KEY, json],
            )
            .context("failed to save snapshot")?;
        Ok(())
    }

    /// Load the cached board snapshot, if any. A corrupt value is treated
    /// as absent (the cache is advisory, never authoritative).
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM lineup_state WHERE key = ?1")
            .context("failed to prepare snapshot query")?;
        let mut rows = stmt
            .query(params![BOARD_KEY])
            .context("failed to query snapshot")?;

        let Some(row) = rows.next().context("failed to read snapshot row")? else {
            return Ok(None);
        };
        let json: String = row.get(0).context("failed to read snapshot value")?;
        match serde_json::from_str(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("discarding corrupt board snapshot: {e}");
                Ok(None)
            }
        }
    }

    /// Drop the cached snapshot.
    pub fn clear_snapshot(&self) -> Result<()> {
        self.conn()
            .execute(
                "DELETE FROM lineup_state WHERE key = ?1",
                params![BOARD_KEY],
            )
            .context("failed to clear snapshot")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::{CompatibilityRule, LineupBoard, Mode};

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    #[test]
    fn open_creates_schema() {
        let db = test_db();
        let conn = db.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='lineup_state'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn save_and_load_round_trip() {
        let db = test_db();
        let board = LineupBoard::new(Mode::NineASide, CompatibilityRule::Relaxed);
        db.save_snapshot(&board.snapshot()).unwrap();

        let loaded = db.load_snapshot().unwrap().expect("snapshot should exist");
        assert_eq!(loaded.mode, Mode::NineASide);
        assert_eq!(loaded.team_a.len(), 9);
        assert_eq!(loaded.formation_a, "3-3-2");
    }

    #[test]
    fn load_returns_none_when_empty() {
        let db = test_db();
        assert!(db.load_snapshot().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let db = test_db();
        let first = LineupBoard::new(Mode::ElevenASide, CompatibilityRule::Relaxed);
        let second = LineupBoard::new(Mode::SixASide, CompatibilityRule::Relaxed);
        db.save_snapshot(&first.snapshot()).unwrap();
        db.save_snapshot(&second.snapshot()).unwrap();

        let loaded = db.load_snapshot().unwrap().unwrap();
        assert_eq!(loaded.mode, Mode::SixASide);
    }

    #[test]
    fn corrupt_snapshot_reads_as_absent() {
        let db = test_db();
        db.conn()
            .execute(
                "INSERT INTO lineup_state (key, value) VALUES ('board', 'not json')",
                [],
            )
            .unwrap();
        assert!(db.load_snapshot().unwrap().is_none());
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let db = test_db();
        let board = LineupBoard::new(Mode::ElevenASide, CompatibilityRule::Relaxed);
        db.save_snapshot(&board.snapshot()).unwrap();
        db.clear_snapshot().unwrap();
        assert!(db.load_snapshot().unwrap().is_none());
    }
}
