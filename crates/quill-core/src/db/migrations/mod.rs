//! Store schema migrations.
//!
//! SQL migrations are embedded as strings and executed when a database is opened.

use crate::error::Result;
use rusqlite::Connection;

/// Vector document table SQL (001)
pub const VECTOR_DOCUMENTS_SQL: &str = include_str!("001_vector_documents.sql");

/// Run all store migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(VECTOR_DOCUMENTS_SQL)?;
    Ok(())
}
