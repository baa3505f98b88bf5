//! SQLite-backed vector store.
//!
//! Documents live in named collections. Each document carries its text, an
//! optional embedding stored as a little-endian `f32` blob, and scalar
//! metadata stored as JSON. Similarity queries rank by cosine distance.
//!
//! Database location priority:
//! 1. QUILL_DATABASE_PATH env var
//! 2. ~/.quill/quill.db

pub mod codec;
pub mod migrations;
pub mod types;

pub use codec::MetadataRecord;
pub use types::*;

use crate::error::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Collection storage used by the memory layers.
///
/// Implementations must be safe to share across tasks; each call is
/// independent and completes before returning.
pub trait VectorStore: Send + Sync {
    /// Insert documents. Fails if an id already exists in the collection.
    fn add(&self, collection: &str, documents: Vec<NewDocument>) -> Result<()>;

    /// Insert or replace documents by id.
    fn upsert(&self, collection: &str, documents: Vec<NewDocument>) -> Result<()>;

    /// Fetch documents by id and/or metadata filter, in insertion order.
    fn get(
        &self,
        collection: &str,
        ids: Option<&[String]>,
        filter: Option<&Where>,
    ) -> Result<Vec<Document>>;

    /// Nearest documents to `embedding`, closest first.
    fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        filter: Option<&Where>,
        n_results: usize,
    ) -> Result<Vec<QueryHit>>;

    /// Replace the metadata of existing documents, keeping their text and
    /// embedding. Returns how many documents were updated.
    fn update_metadata(&self, collection: &str, updates: Vec<(String, Metadata)>) -> Result<usize>;

    /// Delete documents by id. Returns how many were removed.
    fn delete(&self, collection: &str, ids: &[String]) -> Result<usize>;

    /// Count documents matching the filter.
    fn count(&self, collection: &str, filter: Option<&Where>) -> Result<usize>;
}

/// Database connection wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open database connection at the default location
    pub fn open() -> Result<Self> {
        let path = Self::find_database();
        Self::open_path(&path)
    }

    /// Open database at specific path, creating it if needed
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        migrations::run_migrations(&conn)?;
        debug!(path = %path.display(), "Opened vector store");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Resolve the database file location
    pub fn find_database() -> PathBuf {
        if let Ok(path) = std::env::var("QUILL_DATABASE_PATH") {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".quill").join("quill.db")
    }

    /// Check database connectivity
    pub fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute_batch("SELECT 1").map_err(Error::Database)
    }

    /// Collection names with their document counts
    pub fn collections(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT collection, COUNT(*) FROM vector_documents
             GROUP BY collection ORDER BY collection",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn write(&self, collection: &str, documents: Vec<NewDocument>, replace: bool) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let tx = conn.transaction()?;
        {
            let sql = if replace {
                "INSERT INTO vector_documents (collection, id, document, embedding, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (collection, id) DO UPDATE SET
                    document = excluded.document,
                    embedding = excluded.embedding,
                    metadata = excluded.metadata"
            } else {
                "INSERT INTO vector_documents (collection, id, document, embedding, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            };
            let mut stmt = tx.prepare(sql)?;
            let now = chrono::Utc::now().timestamp_millis();
            for doc in documents {
                let metadata = serde_json::to_string(&doc.metadata)?;
                let embedding = doc.embedding.as_deref().map(encode_embedding);
                stmt.execute(params![collection, doc.id, doc.document, embedding, metadata, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn map_document(row: &rusqlite::Row) -> rusqlite::Result<(String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }
}

impl VectorStore for Database {
    fn add(&self, collection: &str, documents: Vec<NewDocument>) -> Result<()> {
        self.write(collection, documents, false)
    }

    fn upsert(&self, collection: &str, documents: Vec<NewDocument>) -> Result<()> {
        self.write(collection, documents, true)
    }

    fn get(
        &self,
        collection: &str,
        ids: Option<&[String]>,
        filter: Option<&Where>,
    ) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT id, document, metadata FROM vector_documents WHERE collection = ?",
        );
        let mut values = vec![Value::Text(collection.to_string())];

        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(" AND id IN (");
            sql.push_str(&placeholders(ids.len()));
            sql.push(')');
            values.extend(ids.iter().map(|id| Value::Text(id.clone())));
        }
        if let Some(filter) = filter {
            sql.push_str(" AND ");
            push_filter(filter, &mut sql, &mut values);
        }
        sql.push_str(" ORDER BY seq");

        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), Self::map_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, document, metadata)| -> Result<Document> {
                Ok(Document {
                    id,
                    document,
                    metadata: serde_json::from_str(&metadata)?,
                })
            })
            .collect()
    }

    fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        filter: Option<&Where>,
        n_results: usize,
    ) -> Result<Vec<QueryHit>> {
        if n_results == 0 {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            "SELECT id, document, metadata, embedding FROM vector_documents
             WHERE collection = ? AND embedding IS NOT NULL",
        );
        let mut values = vec![Value::Text(collection.to_string())];
        if let Some(filter) = filter {
            sql.push_str(" AND ");
            push_filter(filter, &mut sql, &mut values);
        }

        let rows = {
            let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map(params_from_iter(values), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let mut hits = Vec::with_capacity(rows.len());
        for (id, document, metadata, blob) in rows {
            let stored = decode_embedding(&blob);
            if stored.len() != embedding.len() {
                warn!(
                    collection,
                    id = %id,
                    expected = embedding.len(),
                    found = stored.len(),
                    "Skipping document with mismatched embedding dimension"
                );
                continue;
            }
            hits.push(QueryHit {
                id,
                document,
                metadata: serde_json::from_str(&metadata)?,
                distance: 1.0 - cosine_similarity(embedding, &stored),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }

    fn update_metadata(&self, collection: &str, updates: Vec<(String, Metadata)>) -> Result<usize> {
        let mut conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE vector_documents SET metadata = ?3 WHERE collection = ?1 AND id = ?2",
            )?;
            for (id, metadata) in updates {
                let metadata = serde_json::to_string(&metadata)?;
                updated += stmt.execute(params![collection, id, metadata])?;
            }
        }
        tx.commit()?;
        Ok(updated)
    }

    fn delete(&self, collection: &str, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM vector_documents WHERE collection = ? AND id IN ({})",
            placeholders(ids.len())
        );
        let mut values = vec![Value::Text(collection.to_string())];
        values.extend(ids.iter().map(|id| Value::Text(id.clone())));

        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(conn.execute(&sql, params_from_iter(values))?)
    }

    fn count(&self, collection: &str, filter: Option<&Where>) -> Result<usize> {
        let mut sql = String::from("SELECT COUNT(*) FROM vector_documents WHERE collection = ?");
        let mut values = vec![Value::Text(collection.to_string())];
        if let Some(filter) = filter {
            sql.push_str(" AND ");
            push_filter(filter, &mut sql, &mut values);
        }

        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Cosine similarity of two equal-length vectors. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn bind(value: &MetadataValue) -> Value {
    match value {
        // json_extract yields 1/0 for JSON booleans
        MetadataValue::Bool(b) => Value::Integer(i64::from(*b)),
        MetadataValue::Int(i) => Value::Integer(*i),
        MetadataValue::Float(f) => Value::Real(*f),
        MetadataValue::Str(s) => Value::Text(s.clone()),
    }
}

fn push_filter(filter: &Where, sql: &mut String, values: &mut Vec<Value>) {
    match filter {
        Where::Eq(field, value) => {
            sql.push_str("json_extract(metadata, ?) = ?");
            values.push(Value::Text(format!("$.{}", field)));
            values.push(bind(value));
        }
        Where::In(field, options) => {
            if options.is_empty() {
                sql.push_str("0");
                return;
            }
            sql.push_str("json_extract(metadata, ?) IN (");
            sql.push_str(&placeholders(options.len()));
            sql.push(')');
            values.push(Value::Text(format!("$.{}", field)));
            values.extend(options.iter().map(bind));
        }
        Where::And(clauses) => {
            if clauses.is_empty() {
                sql.push_str("1");
                return;
            }
            sql.push('(');
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                push_filter(clause, sql, values);
            }
            sql.push(')');
        }
    }
}
