// Database schema: one table per snapshot kind.
//
// Every data table is keyed by the run date or ISO week it belongs to. Writes
// replace a single key at a time; nothing else is ever updated in place.

use anyhow::{Context, Result};
use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables if they don't exist yet. Safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per source record that matched at least one tool
        CREATE TABLE IF NOT EXISTS processed_rows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_date TEXT NOT NULL,            -- YYYY-MM-DD
            source_kind TEXT NOT NULL,         -- reddit / youtube / rss / aiweekly
            weight REAL NOT NULL,
            content_excerpt TEXT NOT NULL,     -- first 500 characters
            matched_entities TEXT NOT NULL,    -- JSON object: canonical name -> count
            provenance TEXT NOT NULL           -- source file path
        );

        -- Unknown terms for manual dictionary curation
        CREATE TABLE IF NOT EXISTS pending_terms (
            run_date TEXT NOT NULL,
            term TEXT NOT NULL,
            frequency INTEGER NOT NULL,
            PRIMARY KEY (run_date, term)
        );

        -- The weekly score ledger; each week reads the previous week's rows
        CREATE TABLE IF NOT EXISTS weekly_scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_id TEXT NOT NULL,             -- YYYY-Www
            tool TEXT NOT NULL,
            genre TEXT NOT NULL,
            score REAL NOT NULL,
            UNIQUE (week_id, tool)
        );

        CREATE TABLE IF NOT EXISTS rankings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_id TEXT NOT NULL,
            genre TEXT NOT NULL,
            rank INTEGER NOT NULL,
            tool TEXT NOT NULL,
            score REAL NOT NULL,
            is_new INTEGER NOT NULL,
            UNIQUE (week_id, genre, rank)
        );

        CREATE INDEX IF NOT EXISTS idx_processed_run_date
            ON processed_rows(run_date);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )
    .context("Failed to record schema version")?;

    Ok(())
}

/// Count the user-created tables.
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
