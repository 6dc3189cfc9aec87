//! Database migrations
//!
//! Versioned schema changes, each applied once inside its own transaction.

use crate::core::error::{CatalogError, Result};
use rusqlite::Connection;
use tracing::{info, warn};

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema (version 1)
const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    birth_date TEXT,
    date_of_death TEXT
);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    isbn TEXT,
    title TEXT NOT NULL,
    publication_year INTEGER,
    author_id INTEGER NOT NULL,
    FOREIGN KEY (author_id) REFERENCES authors(id)
);
"#;

/// Lookup indexes (version 2)
const MIGRATION_V2: &str = r#"
CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id);
CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(name);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, MIGRATION_V1), (2, MIGRATION_V2)];

/// Bring the schema up to the latest version
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(MIGRATION_TABLE)?;

    let current_version = current_version(conn)?;
    info!(current_version, "Checking database migrations");

    for &(version, sql) in MIGRATIONS {
        if version > current_version {
            apply_migration(conn, version, sql)?;
        }
    }

    Ok(())
}

/// Highest applied migration version, 0 for a fresh database
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn.query_row(
        "SELECT MAX(version) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version.unwrap_or(0))
}

/// Apply a single migration
fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(sql).map_err(|e| {
        warn!("Migration v{} failed: {}", version, e);
        CatalogError::DatabaseError(e)
    })?;

    tx.execute("INSERT INTO schema_migrations (version) VALUES (?)", [version])?;
    tx.commit()?;

    info!("Migration v{} applied successfully", version);
    Ok(())
}
