// SQLite persistence layer for participants, winners and settings.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::info;

use super::RaffleStore;
use crate::model::{Participant, ParticipantId, Winner};

/// SQLite-backed store for the participant pool, the winner ledger and
/// key-value settings.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        // busy_timeout bounds every statement; nothing waits on a lock forever.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS participants (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS winners (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                name           TEXT NOT NULL,
                drawn_at       TEXT NOT NULL,
                participant_id INTEGER
            );

            CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Persist an arbitrary JSON value under `key`. Uses INSERT OR REPLACE so
    /// repeated saves overwrite the previous value.
    pub fn save_setting(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize setting value")?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save setting")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the key
    /// does not exist.
    pub fn load_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM settings WHERE key = ?1")
            .context("failed to prepare load_setting query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query settings")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read setting row")?;
                let value: serde_json::Value = serde_json::from_str(&json_str)
                    .context("failed to deserialize setting value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

fn participant_from_row(row: &Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn winner_from_row(row: &Row<'_>) -> rusqlite::Result<Winner> {
    Ok(Winner {
        id: row.get(0)?,
        name: row.get(1)?,
        drawn_at: row.get(2)?,
        participant_id: row.get(3)?,
    })
}

impl RaffleStore for Database {
    fn list_participants(&self) -> Result<Vec<Participant>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, created_at FROM participants
                 ORDER BY created_at DESC, id DESC",
            )
            .context("failed to prepare list_participants query")?;

        let participants = stmt
            .query_map([], participant_from_row)
            .context("failed to query participants")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map participant rows")?;

        Ok(participants)
    }

    /// Inserts the whole batch in one transaction with a shared timestamp.
    fn insert_participants(&self, names: &[String]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin insert transaction")?;
        let created_at = Utc::now();

        {
            let mut stmt = tx
                .prepare("INSERT INTO participants (name, created_at) VALUES (?1, ?2)")
                .context("failed to prepare participant insert")?;
            for name in names {
                stmt.execute(params![name, created_at])
                    .context("failed to insert participant")?;
            }
        }

        tx.commit().context("failed to commit participant insert")?;
        Ok(names.len())
    }

    fn delete_participant(&self, id: ParticipantId) -> Result<bool> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM participants WHERE id = ?1", params![id])
            .context("failed to delete participant")?;
        Ok(removed > 0)
    }

    fn delete_all_participants(&self) -> Result<usize> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM participants", [])
            .context("failed to delete all participants")?;
        Ok(removed)
    }

    fn list_winners(&self) -> Result<Vec<Winner>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, drawn_at, participant_id FROM winners
                 ORDER BY drawn_at DESC, id DESC",
            )
            .context("failed to prepare list_winners query")?;

        let winners = stmt
            .query_map([], winner_from_row)
            .context("failed to query winners")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map winner rows")?;

        Ok(winners)
    }

    fn insert_winner(&self, name: &str, participant_id: Option<ParticipantId>) -> Result<Winner> {
        let conn = self.conn();
        let drawn_at = Utc::now();
        let id: i64 = conn
            .query_row(
                "INSERT INTO winners (name, drawn_at, participant_id)
                 VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![name, drawn_at, participant_id],
                |row| row.get(0),
            )
            .context("failed to insert winner")?;

        Ok(Winner {
            id,
            name: name.to_string(),
            drawn_at,
            participant_id,
        })
    }

    fn delete_winner(&self, id: i64) -> Result<bool> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM winners WHERE id = ?1", params![id])
            .context("failed to delete winner")?;
        Ok(removed > 0)
    }

    fn clear_winners(&self) -> Result<usize> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM winners", [])
            .context("failed to clear winners")?;
        Ok(removed)
    }

    /// Ledger write and participant removal in one transaction. Rolls back
    /// (writing nothing) if the participant is already gone.
    fn commit_draw(&self, participant: &Participant) -> Result<Option<Winner>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin draw transaction")?;
        let drawn_at = Utc::now();

        let removed = tx
            .execute(
                "DELETE FROM participants WHERE id = ?1",
                params![participant.id],
            )
            .context("failed to remove drawn participant")?;
        if removed == 0 {
            // Dropping `tx` rolls back.
            return Ok(None);
        }

        let id: i64 = tx
            .query_row(
                "INSERT INTO winners (name, drawn_at, participant_id)
                 VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![participant.name, drawn_at, participant.id],
                |row| row.get(0),
            )
            .context("failed to record winner")?;

        tx.commit().context("failed to commit draw")?;

        Ok(Some(Winner {
            id,
            name: participant.name.clone(),
            drawn_at,
            participant_id: Some(participant.id),
        }))
    }

    fn reconcile_draws(&self) -> Result<usize> {
        let conn = self.conn();
        let repaired = conn
            .execute(
                "DELETE FROM participants WHERE id IN (
                     SELECT participant_id FROM winners WHERE participant_id IS NOT NULL
                 )",
                [],
            )
            .context("failed to reconcile interrupted draws")?;
        if repaired > 0 {
            info!("Reconciled {} interrupted draw(s)", repaired);
        }
        Ok(repaired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"participants".to_string()));
        assert!(tables.contains(&"winners".to_string()));
        assert!(tables.contains(&"settings".to_string()));
    }

    #[test]
    fn reopening_a_file_database_keeps_rows() {
        let path = std::env::temp_dir().join(format!("raffle_reopen_{}.db", std::process::id()));
        let path_str = path.to_str().unwrap();
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::open(path_str).unwrap();
            db.insert_participants(&names(&["Alice"])).unwrap();
        }
        let db = Database::open(path_str).expect("second open should reuse schema");
        assert_eq!(db.list_participants().unwrap().len(), 1);

        drop(db);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(format!("{path_str}-wal"));
        let _ = std::fs::remove_file(format!("{path_str}-shm"));
    }

    // ------------------------------------------------------------------
    // Participants
    // ------------------------------------------------------------------

    #[test]
    fn insert_and_list_participants() {
        let db = test_db();
        let inserted = db.insert_participants(&names(&["Alice", "Bob", "Carol"])).unwrap();
        assert_eq!(inserted, 3);

        let listed = db.list_participants().unwrap();
        // Same batch shares a timestamp; id breaks the tie, newest first.
        let listed_names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(listed_names, vec!["Carol", "Bob", "Alice"]);
        assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn later_batches_list_first() {
        let db = test_db();
        db.insert_participants(&names(&["Early"])).unwrap();
        db.insert_participants(&names(&["Late"])).unwrap();

        let listed = db.list_participants().unwrap();
        assert_eq!(listed[0].name, "Late");
        assert_eq!(listed[1].name, "Early");
    }

    #[test]
    fn insert_empty_batch_is_noop() {
        let db = test_db();
        assert_eq!(db.insert_participants(&[]).unwrap(), 0);
        assert!(db.list_participants().unwrap().is_empty());
    }

    #[test]
    fn delete_participant_reports_miss() {
        let db = test_db();
        db.insert_participants(&names(&["Alice"])).unwrap();
        let id = db.list_participants().unwrap()[0].id;

        assert!(db.delete_participant(id).unwrap());
        assert!(!db.delete_participant(id).unwrap());
        assert!(db.list_participants().unwrap().is_empty());
    }

    #[test]
    fn delete_all_counts_and_is_idempotent() {
        let db = test_db();
        db.insert_participants(&names(&["A", "B", "C"])).unwrap();
        assert_eq!(db.delete_all_participants().unwrap(), 3);
        assert_eq!(db.delete_all_participants().unwrap(), 0);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let db = test_db();
        db.insert_participants(&names(&["A"])).unwrap();
        let first = db.list_participants().unwrap()[0].id;
        db.delete_all_participants().unwrap();
        db.insert_participants(&names(&["B"])).unwrap();
        let second = db.list_participants().unwrap()[0].id;
        assert!(second > first);
    }

    // ------------------------------------------------------------------
    // Winners
    // ------------------------------------------------------------------

    #[test]
    fn insert_and_list_winners_newest_first() {
        let db = test_db();
        let first = db.insert_winner("Alice", None).unwrap();
        let second = db.insert_winner("Bob", Some(ParticipantId(9))).unwrap();

        let winners = db.list_winners().unwrap();
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0], second);
        assert_eq!(winners[1], first);
        assert_eq!(winners[0].participant_id, Some(ParticipantId(9)));
    }

    #[test]
    fn clear_winners_counts() {
        let db = test_db();
        db.insert_winner("Alice", None).unwrap();
        db.insert_winner("Bob", None).unwrap();
        assert_eq!(db.clear_winners().unwrap(), 2);
        assert!(db.list_winners().unwrap().is_empty());
    }

    // ------------------------------------------------------------------
    // Draw commit
    // ------------------------------------------------------------------

    #[test]
    fn commit_draw_moves_participant_to_ledger() {
        let db = test_db();
        db.insert_participants(&names(&["Alice", "Bob"])).unwrap();
        let alice = db
            .list_participants()
            .unwrap()
            .into_iter()
            .find(|p| p.name == "Alice")
            .unwrap();

        let winner = db.commit_draw(&alice).unwrap().expect("participant present");
        assert_eq!(winner.name, "Alice");
        assert_eq!(winner.participant_id, Some(alice.id));

        let remaining = db.list_participants().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Bob");
        assert_eq!(db.list_winners().unwrap(), vec![winner]);
    }

    #[test]
    fn commit_draw_of_missing_participant_writes_nothing() {
        let db = test_db();
        db.insert_participants(&names(&["Alice"])).unwrap();
        let alice = db.list_participants().unwrap().remove(0);
        db.delete_participant(alice.id).unwrap();

        assert!(db.commit_draw(&alice).unwrap().is_none());
        assert!(db.list_winners().unwrap().is_empty());
    }

    #[test]
    fn delete_winner_reports_miss() {
        let db = test_db();
        let winner = db.insert_winner("Alice", None).unwrap();

        assert!(db.delete_winner(winner.id).unwrap());
        assert!(!db.delete_winner(winner.id).unwrap());
        assert!(db.list_winners().unwrap().is_empty());
    }

    #[test]
    fn reconcile_removes_participants_already_in_ledger() {
        let db = test_db();
        db.insert_participants(&names(&["Alice", "Bob"])).unwrap();
        let alice = db
            .list_participants()
            .unwrap()
            .into_iter()
            .find(|p| p.name == "Alice")
            .unwrap();

        // Simulate a crash after the ledger write but before the removal.
        db.insert_winner(&alice.name, Some(alice.id)).unwrap();
        assert_eq!(db.list_participants().unwrap().len(), 2);

        assert_eq!(db.reconcile_draws().unwrap(), 1);
        let remaining = db.list_participants().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Bob");

        // Nothing left to repair.
        assert_eq!(db.reconcile_draws().unwrap(), 0);
    }

    #[test]
    fn winner_timestamps_round_trip() {
        let db = test_db();
        let written = db.insert_winner("Alice", None).unwrap();
        let read = db.list_winners().unwrap().remove(0);
        assert_eq!(read.drawn_at, written.drawn_at);
    }

    // ------------------------------------------------------------------
    // Settings (key-value)
    // ------------------------------------------------------------------

    #[test]
    fn save_and_load_setting_round_trip() {
        let db = test_db();
        db.save_setting("draw_duration_secs", &json!(7)).unwrap();
        assert_eq!(db.load_setting("draw_duration_secs").unwrap(), Some(json!(7)));
    }

    #[test]
    fn load_setting_returns_none_for_missing_key() {
        let db = test_db();
        assert!(db.load_setting("nonexistent").unwrap().is_none());
    }

    #[test]
    fn save_setting_overwrites_previous_value() {
        let db = test_db();
        db.save_setting("key", &json!(1)).unwrap();
        db.save_setting("key", &json!(2)).unwrap();
        assert_eq!(db.load_setting("key").unwrap(), Some(json!(2)));
    }
}
