//! Database module for the discovery engine
//!
//! Provides persistence for the discovery tree and for key-value records
//! (sessions and menu progress).

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    // ==================== Record Operations ====================

    /// Read a record payload by key
    pub fn read_record(&self, key: &str) -> DbResult<Option<Vec<u8>>> {
        let conn = self.conn()?;
        let payload = conn
            .query_row(
                "SELECT payload FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        tracing::debug!(key, found = payload.is_some(), "Read record");
        Ok(payload)
    }

    /// Insert or replace a record payload
    pub fn upsert_record(&self, key: &str, payload: &[u8]) -> DbResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO records (key, payload, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
            params![key, payload, now],
        )?;
        tracing::debug!(key, bytes = payload.len(), "Wrote record");
        Ok(())
    }

    /// Delete a record. Deleting a missing key is not an error.
    pub fn delete_record(&self, key: &str) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM records WHERE key = ?1", params![key])?;
        tracing::debug!(key, "Deleted record");
        Ok(())
    }

    // ==================== Node Operations ====================

    /// Children of `parent_id` (root level when `None`), in insertion order
    pub fn get_children(&self, parent_id: Option<NodeId>) -> DbResult<Vec<Node>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, decoration, parent_id, discovered_by, created_at
             FROM nodes WHERE parent_id IS ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![parent_id], parse_node_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> DbResult<Option<Node>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, decoration, parent_id, discovered_by, created_at
             FROM nodes WHERE id = ?1",
            params![id],
            parse_node_row,
        )
        .optional()
        .map_err(DbError::from)
    }

    /// Insert a batch of children in one transaction.
    ///
    /// Candidates whose name already exists among the persisted siblings at
    /// insert time (or earlier in the same batch) are skipped. Returns the
    /// rows actually inserted. On error nothing is committed.
    pub fn insert_children(
        &self,
        parent_id: Option<NodeId>,
        discovered_by: Option<&str>,
        candidates: &[Candidate],
    ) -> DbResult<Vec<Node>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();

        let mut taken: HashSet<String> = {
            let mut stmt = tx.prepare("SELECT name FROM nodes WHERE parent_id IS ?1")?;
            let names = stmt.query_map(params![parent_id], |row| row.get::<_, String>(0))?;
            names.collect::<Result<_, _>>()?
        };

        let mut inserted = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !taken.insert(candidate.name.clone()) {
                continue;
            }
            tx.execute(
                "INSERT INTO nodes (name, decoration, parent_id, discovered_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    candidate.name,
                    candidate.decoration,
                    parent_id,
                    discovered_by,
                    now.to_rfc3339(),
                ],
            )?;
            inserted.push(Node {
                id: tx.last_insert_rowid(),
                name: candidate.name.clone(),
                decoration: candidate.decoration.clone(),
                parent_id,
                discovered_by: discovered_by.map(String::from),
                created_at: now,
            });
        }

        tx.commit()?;
        Ok(inserted)
    }
}

fn parse_node_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: row.get(0)?,
        name: row.get(1)?,
        decoration: row.get(2)?,
        parent_id: row.get(3)?,
        discovered_by: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<Candidate> {
        names.iter().map(|n| Candidate::new(*n, Some("✨"))).collect()
    }

    #[test]
    fn test_record_upsert_read_delete() {
        let db = Database::open_in_memory().unwrap();

        assert_eq!(db.read_record("session:1").unwrap(), None);

        db.upsert_record("session:1", b"first").unwrap();
        assert_eq!(db.read_record("session:1").unwrap().as_deref(), Some(&b"first"[..]));

        db.upsert_record("session:1", b"second").unwrap();
        assert_eq!(db.read_record("session:1").unwrap().as_deref(), Some(&b"second"[..]));

        db.delete_record("session:1").unwrap();
        assert_eq!(db.read_record("session:1").unwrap(), None);

        // Deleting again is harmless
        db.delete_record("session:1").unwrap();
    }

    #[test]
    fn test_records_do_not_cross_keys() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_record("session:7", b"s").unwrap();
        db.upsert_record("conversation:7", b"c").unwrap();

        db.delete_record("session:7").unwrap();
        assert_eq!(db.read_record("conversation:7").unwrap().as_deref(), Some(&b"c"[..]));
    }

    #[test]
    fn test_insert_and_get_children() {
        let db = Database::open_in_memory().unwrap();

        let roots = db
            .insert_children(None, None, &candidates(&["Water", "Fire"]))
            .unwrap();
        assert_eq!(roots.len(), 2);

        let water = roots[0].id;
        let kids = db
            .insert_children(Some(water), Some("user-1"), &candidates(&["Steam", "Ice"]))
            .unwrap();
        assert_eq!(kids[0].parent_id, Some(water));
        assert_eq!(kids[0].discovered_by.as_deref(), Some("user-1"));

        let fetched = db.get_children(Some(water)).unwrap();
        let names: Vec<_> = fetched.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Steam", "Ice"]);

        let root_names: Vec<_> = db
            .get_children(None)
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(root_names, vec!["Water", "Fire"]);

        assert_eq!(db.get_node(water).unwrap().unwrap().name, "Water");
        assert!(db.get_node(9999).unwrap().is_none());
    }

    #[test]
    fn test_insert_skips_existing_sibling_names() {
        let db = Database::open_in_memory().unwrap();
        let parent = db.insert_children(None, None, &candidates(&["Fire"])).unwrap()[0].id;

        db.insert_children(Some(parent), None, &candidates(&["Smoke", "Ash"]))
            .unwrap();
        let second = db
            .insert_children(Some(parent), None, &candidates(&["Ash", "Ember", "Ember", "smoke"]))
            .unwrap();

        // "Ash" already exists, the second "Ember" is an in-batch duplicate,
        // "smoke" differs by case and is kept
        let names: Vec<_> = second.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Ember", "smoke"]);

        let all = db.get_children(Some(parent)).unwrap();
        let unique: HashSet<_> = all.iter().map(|n| n.name.clone()).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_same_name_allowed_under_different_parents() {
        let db = Database::open_in_memory().unwrap();
        let roots = db
            .insert_children(None, None, &candidates(&["Water", "Earth"]))
            .unwrap();

        db.insert_children(Some(roots[0].id), None, &candidates(&["Mud"]))
            .unwrap();
        let inserted = db
            .insert_children(Some(roots[1].id), None, &candidates(&["Mud"]))
            .unwrap();
        assert_eq!(inserted.len(), 1);
    }

    #[test]
    fn test_node_label() {
        let db = Database::open_in_memory().unwrap();
        let nodes = db
            .insert_children(
                None,
                None,
                &[Candidate::new("Air", Some("💨")), Candidate::new("Void", None)],
            )
            .unwrap();
        assert_eq!(nodes[0].label(), "💨 Air");
        assert_eq!(nodes[1].label(), "Void");
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovery.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_children(None, None, &candidates(&["Water"])).unwrap();
            db.upsert_record("session:1", b"{}").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_children(None).unwrap().len(), 1);
        assert!(db.read_record("session:1").unwrap().is_some());
    }
}
