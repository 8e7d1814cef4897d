//! Seen-store: persisted set of previously notified postings.
//!
//! SQLite-backed, keyed by normalized URL. Opened at run start, consulted
//! by the deduplicator, and updated in one transaction at run end, only
//! after delivery succeeded. A single run process is the only writer;
//! overlapping runs must be prevented by the scheduler.

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};

use crate::config::ensure_parent_dir;
use crate::dedup;
use crate::errors::MonitorError;
use crate::types::Posting;

pub struct SeenStore {
    conn: Connection,
}

impl SeenStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, MonitorError> {
        ensure_parent_dir(path)?;
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, MonitorError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), MonitorError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS seen_postings (
                url TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                first_notified_at TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_first_notified_at
             ON seen_postings(first_notified_at)",
            [],
        )?;
        Ok(())
    }

    /// Membership lookup by dedup key.
    pub fn contains(&self, key: &str) -> Result<bool, MonitorError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM seen_postings WHERE url = ?1")?;
        Ok(stmt.exists(params![key])?)
    }

    /// Record all given postings as notified, in one transaction.
    ///
    /// Returns the number of newly inserted keys. Re-inserting an already
    /// seen key is a no-op so a partially overlapping batch stays safe.
    pub fn mark_seen(&mut self, postings: &[Posting]) -> Result<usize, MonitorError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO seen_postings (url, source, title, first_notified_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for posting in postings {
                inserted += stmt.execute(params![
                    dedup::dedup_key(posting),
                    posting.source.label(),
                    posting.title,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Purge entries older than the retention window.
    ///
    /// Bounds store growth; the tradeoff is that a posting still live after
    /// the window can be notified again.
    pub fn cleanup_old(&self, days: i64) -> Result<usize, MonitorError> {
        let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();
        let removed = self.conn.execute(
            "DELETE FROM seen_postings WHERE first_notified_at < ?1",
            params![cutoff],
        )?;
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, MonitorError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM seen_postings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, MonitorError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceId;

    fn posting(url: &str) -> Posting {
        Posting::new(SourceId::Spotify, "Spotify", "Backend Intern", "Stockholm", url)
    }

    #[test]
    fn mark_seen_then_contains() {
        let mut store = SeenStore::open_in_memory().unwrap();
        let p = posting("https://example.com/j/1");
        assert!(!store.contains(&dedup::dedup_key(&p)).unwrap());

        let inserted = store.mark_seen(std::slice::from_ref(&p)).unwrap();
        assert_eq!(inserted, 1);
        assert!(store.contains(&dedup::dedup_key(&p)).unwrap());
    }

    #[test]
    fn reinserting_existing_key_is_a_noop() {
        let mut store = SeenStore::open_in_memory().unwrap();
        let p = posting("https://example.com/j/1");
        store.mark_seen(std::slice::from_ref(&p)).unwrap();
        let inserted = store.mark_seen(std::slice::from_ref(&p)).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn url_variants_share_one_key() {
        let mut store = SeenStore::open_in_memory().unwrap();
        store
            .mark_seen(&[posting("https://Example.com/j/1/")])
            .unwrap();
        assert!(store
            .contains(&dedup::dedup_key(&posting("https://example.com/j/1")))
            .unwrap());
    }

    #[test]
    fn cleanup_old_keeps_recent_entries() {
        let mut store = SeenStore::open_in_memory().unwrap();
        store.mark_seen(&[posting("https://example.com/j/1")]).unwrap();
        let removed = store.cleanup_old(90).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.len().unwrap(), 1);
    }
}
