//! SQLite backend: vector index and document store in one table.
//!
//! This module provides:
//! - `Database`: connection, schema, atomic batch add/delete and point lookups
//! - `embedding`: BLOB conversion and cosine similarity
//! - `search`: nearest-neighbour queries
//!
//! Each record's id, embedding and text live in the same row, so the index
//! and the document store cannot drift apart.

pub mod embedding;
pub mod search;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult, TransactionBehavior, params};

use crate::memory_types::MemoryRecord;

pub use self::embedding::vec_to_blob;

/// How long a writer waits on a lock held by another connection.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Error types for SQLite operations.
#[derive(Debug)]
pub enum Error {
    Sqlite(String),
    InvalidBlobSize { expected: usize, actual: usize },
    MismatchedDimensions { expected: usize, actual: usize },
    EmptyVector,
    InvalidEmbedding(String),
    InvalidLimit(String),
    BatchLengthMismatch { ids: usize, embeddings: usize, texts: usize },
    CollectionNotFound(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Sqlite(msg) => write!(f, "Database error: {}", msg),
            Error::InvalidBlobSize { expected, actual } => {
                write!(
                    f,
                    "Invalid BLOB size: expected {} bytes, got {} bytes",
                    expected, actual
                )
            }
            Error::MismatchedDimensions { expected, actual } => {
                write!(
                    f,
                    "Mismatched dimensions: expected {} dimensions, got {} dimensions",
                    expected, actual
                )
            }
            Error::EmptyVector => write!(f, "Cannot store or compare an empty vector"),
            Error::InvalidEmbedding(msg) => write!(f, "Invalid embedding: {}", msg),
            Error::InvalidLimit(msg) => write!(f, "Invalid limit: {}", msg),
            Error::BatchLengthMismatch {
                ids,
                embeddings,
                texts,
            } => write!(
                f,
                "Batch length mismatch: {} ids, {} embeddings, {} texts",
                ids, embeddings, texts
            ),
            Error::CollectionNotFound(name) => write!(f, "Collection not found: {}", name),
        }
    }
}

impl std::error::Error for Error {}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// SQLite database holding one or more named collections.
pub struct Database {
    conn: Connection,
}

/// Initialize database schema.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            dimensions INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS memories (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL REFERENCES collections(name),
            content TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memories_collection ON memories(collection);
        "#,
    )?;
    Ok(())
}

/// Stored width of a collection, `None` until its first record.
fn read_dimensions(conn: &Connection, name: &str) -> Result<Option<usize>> {
    let dims: Option<i64> = conn
        .query_row(
            "SELECT dimensions FROM collections WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
    Ok(dims.map(|d| d as usize))
}

impl Database {
    /// Open or create a SQLite database at the given path.
    ///
    /// Initializes the schema if the database is new.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or schema initialization fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create the named collection if it does not exist yet.
    ///
    /// Its dimensionality stays unset until the first record is added.
    pub fn ensure_collection(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO collections (name, dimensions, created_at) VALUES (?1, NULL, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Embedding width of a collection, `None` until its first record is added.
    ///
    /// # Errors
    ///
    /// Returns `Error::CollectionNotFound` if the collection was never created.
    pub fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        read_dimensions(&self.conn, name)
    }

    /// Insert a batch of (id, embedding, text) triples in one transaction.
    ///
    /// The first batch fixes the collection's dimensionality; later vectors
    /// must match it. Either every triple is stored or none is.
    ///
    /// The width is read inside an immediate transaction, so concurrent
    /// writers on a fresh collection cannot both claim it.
    ///
    /// # Errors
    ///
    /// Returns error if the slices differ in length, the collection is
    /// unknown, an embedding is empty/non-finite/of the wrong width, an id
    /// already exists, or the write fails.
    pub fn add(
        &mut self,
        collection: &str,
        ids: &[String],
        embeddings: &[Vec<f32>],
        texts: &[String],
    ) -> Result<()> {
        if ids.len() != embeddings.len() || ids.len() != texts.len() {
            return Err(Error::BatchLengthMismatch {
                ids: ids.len(),
                embeddings: embeddings.len(),
                texts: texts.len(),
            });
        }
        if ids.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored_dims = read_dimensions(&tx, collection)?;
        let dims = stored_dims.unwrap_or(embeddings[0].len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO memories (id, collection, content, embedding, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for ((id, embedding), text) in ids.iter().zip(embeddings).zip(texts) {
                let blob = vec_to_blob(embedding, dims)?;
                stmt.execute(params![id, collection, text, &blob, &now])?;
            }
        }
        if stored_dims.is_none() {
            tx.execute(
                "UPDATE collections SET dimensions = ?1 WHERE name = ?2",
                params![dims as i64, collection],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    /// Delete a batch of records in one transaction.
    ///
    /// Unknown ids are ignored. Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails; nothing is removed in that case.
    pub fn delete(&mut self, collection: &str, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt =
                tx.prepare("DELETE FROM memories WHERE id = ?1 AND collection = ?2")?;
            for id in ids {
                removed += stmt.execute(params![id, collection])?;
            }
        }
        tx.commit()?;

        Ok(removed)
    }

    /// Retrieve a single record by ID.
    ///
    /// Returns None if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails or the stored BLOB is corrupt.
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<MemoryRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, content, embedding, created_at
                FROM memories
                WHERE id = ?1 AND collection = ?2
                "#,
                params![id, collection],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, text, blob, created_at)) => Ok(Some(MemoryRecord {
                id,
                text,
                embedding: self.decode(collection, &blob)?,
                created_at,
            })),
            None => Ok(None),
        }
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM memories WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// List records, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the limit is invalid or the query fails.
    pub fn list(&self, collection: &str, limit: usize) -> Result<Vec<MemoryRecord>> {
        search::validate_limit(limit)?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, content, embedding, created_at
            FROM memories
            WHERE collection = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows: SqliteResult<Vec<(String, String, Vec<u8>, String)>> = stmt
            .query_map(params![collection, i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect();

        rows?
            .into_iter()
            .map(|(id, text, blob, created_at)| -> Result<MemoryRecord> {
                Ok(MemoryRecord {
                    id,
                    text,
                    embedding: self.decode(collection, &blob)?,
                    created_at,
                })
            })
            .collect()
    }

    /// Close the connection, flushing pending writes.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::from(e))
    }

    fn decode(&self, collection: &str, blob: &[u8]) -> Result<Vec<f32>> {
        let dims = self.collection_dimensions(collection)?.unwrap_or(blob.len() / 4);
        embedding::blob_to_vec(blob, dims)
    }

    /// Get internal connection (for tests).
    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COLLECTION: &str = "test";

    fn create_test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        db.ensure_collection(COLLECTION).unwrap();
        (dir, db)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_and_get() {
        let (_dir, mut db) = create_test_db();
        db.add(
            COLLECTION,
            &strings(&["id-1"]),
            &[vec![0.5, -0.5]],
            &strings(&["test content"]),
        )
        .unwrap();

        let record = db.get(COLLECTION, "id-1").unwrap().unwrap();
        assert_eq!(record.id, "id-1");
        assert_eq!(record.text, "test content");
        assert_eq!(record.embedding, vec![0.5, -0.5]);
        assert!(!record.created_at.is_empty());
    }

    #[test]
    fn test_get_nonexistent() {
        let (_dir, db) = create_test_db();
        assert!(db.get(COLLECTION, "nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_add_fixes_dimensions() {
        let (_dir, mut db) = create_test_db();
        assert_eq!(db.collection_dimensions(COLLECTION).unwrap(), None);

        db.add(
            COLLECTION,
            &strings(&["a"]),
            &[vec![0.1; 3]],
            &strings(&["a"]),
        )
        .unwrap();
        assert_eq!(db.collection_dimensions(COLLECTION).unwrap(), Some(3));

        let result = db.add(
            COLLECTION,
            &strings(&["b"]),
            &[vec![0.1; 4]],
            &strings(&["b"]),
        );
        assert!(matches!(
            result,
            Err(Error::MismatchedDimensions {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_add_is_atomic() {
        let (_dir, mut db) = create_test_db();
        let result = db.add(
            COLLECTION,
            &strings(&["ok", "bad"]),
            &[vec![1.0, 0.0], vec![f32::NAN, 0.0]],
            &strings(&["ok", "bad"]),
        );
        assert!(matches!(result, Err(Error::InvalidEmbedding(_))));
        assert_eq!(db.count(COLLECTION).unwrap(), 0);
        assert!(db.get(COLLECTION, "ok").unwrap().is_none());
        // A failed first batch must not pin the dimensionality either.
        assert_eq!(db.collection_dimensions(COLLECTION).unwrap(), None);
    }

    #[test]
    fn test_add_duplicate_id_rolls_back() {
        let (_dir, mut db) = create_test_db();
        db.add(COLLECTION, &strings(&["x"]), &[vec![1.0]], &strings(&["x"]))
            .unwrap();

        let result = db.add(
            COLLECTION,
            &strings(&["y", "x"]),
            &[vec![1.0], vec![1.0]],
            &strings(&["y", "x again"]),
        );
        assert!(matches!(result, Err(Error::Sqlite(_))));
        assert_eq!(db.count(COLLECTION).unwrap(), 1);
        assert!(db.get(COLLECTION, "y").unwrap().is_none());
    }

    #[test]
    fn test_add_length_mismatch() {
        let (_dir, mut db) = create_test_db();
        let result = db.add(
            COLLECTION,
            &strings(&["a", "b"]),
            &[vec![1.0]],
            &strings(&["a", "b"]),
        );
        assert!(matches!(result, Err(Error::BatchLengthMismatch { .. })));
    }

    #[test]
    fn test_add_unknown_collection() {
        let (_dir, mut db) = create_test_db();
        let result = db.add("missing", &strings(&["a"]), &[vec![1.0]], &strings(&["a"]));
        assert!(matches!(result, Err(Error::CollectionNotFound(_))));
    }

    #[test]
    fn test_add_empty_batch() {
        let (_dir, mut db) = create_test_db();
        db.add(COLLECTION, &[], &[], &[]).unwrap();
        assert_eq!(db.count(COLLECTION).unwrap(), 0);
    }

    #[test]
    fn test_delete_batch() {
        let (_dir, mut db) = create_test_db();
        db.add(
            COLLECTION,
            &strings(&["a", "b", "c"]),
            &[vec![1.0], vec![1.0], vec![1.0]],
            &strings(&["a", "b", "c"]),
        )
        .unwrap();

        let removed = db
            .delete(COLLECTION, &strings(&["a", "c", "nonexistent"]))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.count(COLLECTION).unwrap(), 1);
        assert!(db.get(COLLECTION, "b").unwrap().is_some());
    }

    #[test]
    fn test_delete_scoped_to_collection() {
        let (_dir, mut db) = create_test_db();
        db.ensure_collection("other").unwrap();
        db.add("other", &strings(&["a"]), &[vec![1.0]], &strings(&["a"]))
            .unwrap();

        assert_eq!(db.delete(COLLECTION, &strings(&["a"])).unwrap(), 0);
        assert_eq!(db.count("other").unwrap(), 1);
    }

    #[test]
    fn test_list_newest_first() {
        let (_dir, mut db) = create_test_db();
        db.add(
            COLLECTION,
            &strings(&["first", "second"]),
            &[vec![1.0], vec![1.0]],
            &strings(&["first", "second"]),
        )
        .unwrap();

        let records = db.list(COLLECTION, 10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "second");
        assert_eq!(records[1].id, "first");

        assert_eq!(db.list(COLLECTION, 1).unwrap().len(), 1);
        assert!(matches!(db.list(COLLECTION, 0), Err(Error::InvalidLimit(_))));
    }

    #[test]
    fn test_database_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.ensure_collection(COLLECTION).unwrap();
            db.add(
                COLLECTION,
                &strings(&["p"]),
                &[vec![0.25, 0.75]],
                &strings(&["persistent"]),
            )
            .unwrap();
            db.close().unwrap();
        }

        {
            let db = Database::open(&path).unwrap();
            db.ensure_collection(COLLECTION).unwrap();
            assert_eq!(db.collection_dimensions(COLLECTION).unwrap(), Some(2));
            let record = db.get(COLLECTION, "p").unwrap().unwrap();
            assert_eq!(record.text, "persistent");
        }
    }

    #[test]
    fn test_width_fixed_by_another_handle_is_enforced() {
        let (dir, mut first) = create_test_db();
        let mut second = Database::open(&dir.path().join("test.db")).unwrap();

        first
            .add(COLLECTION, &strings(&["a"]), &[vec![1.0, 0.0, 0.0]], &strings(&["a"]))
            .unwrap();
        let result = second.add(COLLECTION, &strings(&["b"]), &[vec![1.0, 0.0]], &strings(&["b"]));

        assert!(matches!(result, Err(Error::MismatchedDimensions { expected: 3, actual: 2 })));
        assert_eq!(first.count(COLLECTION).unwrap(), 1);
    }

    #[test]
    fn test_add_waits_for_pending_writer_and_sees_its_width() {
        let (dir, db) = create_test_db();
        let path = dir.path().join("test.db");

        // Another writer is mid-transaction and has claimed width 3.
        db.conn()
            .execute_batch(
                "BEGIN IMMEDIATE; UPDATE collections SET dimensions = 3 WHERE name = 'test';",
            )
            .unwrap();

        let writer = std::thread::spawn(move || {
            let mut other = Database::open(&path).unwrap();
            other.add(COLLECTION, &strings(&["b"]), &[vec![1.0, 0.0]], &strings(&["b"]))
        });

        std::thread::sleep(Duration::from_millis(200));
        db.conn().execute_batch("COMMIT").unwrap();

        let result = writer.join().unwrap();
        assert!(matches!(result, Err(Error::MismatchedDimensions { expected: 3, actual: 2 })));
        assert_eq!(db.count(COLLECTION).unwrap(), 0);
        assert_eq!(db.collection_dimensions(COLLECTION).unwrap(), Some(3));
    }

    #[test]
    fn test_schema_tables_exist() {
        let (_dir, db) = create_test_db();
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('collections', 'memories')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidBlobSize {
            expected: 1536,
            actual: 10,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("expected"));
        assert!(msg.contains("1536"));
        assert!(msg.contains("10"));
    }
}
