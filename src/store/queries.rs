// Database queries for every snapshot table.
//
// Every database interaction goes through this module. Snapshot writes run in
// a transaction that replaces exactly one key (run date or week) and leaves
// every other key untouched.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{PendingTerm, ProcessedRow, RankingEntry, WeeklyScore};
use crate::error::PipelineError;
use crate::sources::SourceKind;

// --- Processed rows and pending terms ---

/// Replace the processed snapshot (rows and pending terms) for `run_date`.
pub fn replace_processed_snapshot(
    conn: &Connection,
    run_date: &str,
    rows: &[ProcessedRow],
    pending: &[PendingTerm],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute("DELETE FROM processed_rows WHERE run_date = ?1", params![run_date])?;
    tx.execute("DELETE FROM pending_terms WHERE run_date = ?1", params![run_date])?;

    {
        let mut insert_row = tx.prepare(
            "INSERT INTO processed_rows
                (run_date, source_kind, weight, content_excerpt, matched_entities, provenance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for row in rows {
            let matched = serde_json::to_string(&row.matched_entities)?;
            insert_row.execute(params![
                run_date,
                row.source_kind.as_str(),
                row.weight,
                row.content_excerpt,
                matched,
                row.provenance,
            ])?;
        }

        let mut insert_term = tx.prepare(
            "INSERT INTO pending_terms (run_date, term, frequency) VALUES (?1, ?2, ?3)",
        )?;
        for term in pending {
            insert_term.execute(params![run_date, term.term, term.frequency as i64])?;
        }
    }

    tx.commit().context("Failed to commit processed snapshot")?;
    Ok(())
}

/// Most recent run date with processed rows, optionally bounded to
/// `[from, to]` (inclusive, YYYY-MM-DD).
pub fn latest_run_date(conn: &Connection, bounds: Option<(&str, &str)>) -> Result<Option<String>> {
    let result: Option<String> = match bounds {
        Some((from, to)) => conn.query_row(
            "SELECT MAX(run_date) FROM processed_rows WHERE run_date BETWEEN ?1 AND ?2",
            params![from, to],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT MAX(run_date) FROM processed_rows", [], |row| row.get(0))?,
    };
    Ok(result)
}

/// All processed rows of one run date, in insertion order.
pub fn get_processed_rows(conn: &Connection, run_date: &str) -> Result<Vec<ProcessedRow>> {
    let mut stmt = conn.prepare(
        "SELECT source_kind, weight, content_excerpt, matched_entities, provenance
         FROM processed_rows
         WHERE run_date = ?1
         ORDER BY id",
    )?;

    let raw = stmt
        .query_map(params![run_date], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(kind, weight, content_excerpt, matched, provenance)| {
            let source_kind: SourceKind = kind.parse()?;
            let matched_entities: BTreeMap<String, u32> = serde_json::from_str(&matched)
                .with_context(|| format!("Corrupt matched_entities on {run_date}"))?;
            Ok(ProcessedRow {
                source_kind,
                weight,
                content_excerpt,
                matched_entities,
                provenance,
            })
        })
        .collect()
}

/// Pending terms of one run date, most frequent first. Ties keep insertion
/// order.
pub fn get_pending_terms(
    conn: &Connection,
    run_date: &str,
    limit: u32,
) -> Result<Vec<PendingTerm>> {
    let mut stmt = conn.prepare(
        "SELECT term, frequency FROM pending_terms
         WHERE run_date = ?1
         ORDER BY frequency DESC, rowid
         LIMIT ?2",
    )?;
    let terms = stmt
        .query_map(params![run_date, limit], |row| {
            Ok(PendingTerm {
                term: row.get(0)?,
                frequency: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(terms)
}

/// Number of processed rows per run date, newest first.
pub fn processed_run_counts(conn: &Connection, limit: u32) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT run_date, COUNT(*) FROM processed_rows
         GROUP BY run_date
         ORDER BY run_date DESC
         LIMIT ?1",
    )?;
    let counts = stmt
        .query_map(params![limit], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(counts)
}

// --- Weekly ledger ---

/// Ledger rows of one week, in the order they were written.
pub fn get_weekly_scores(conn: &Connection, week_id: &str) -> Result<Vec<WeeklyScore>> {
    let mut stmt = conn.prepare(
        "SELECT week_id, tool, genre, score FROM weekly_scores WHERE week_id = ?1 ORDER BY id",
    )?;
    let scores = stmt
        .query_map(params![week_id], |row| {
            Ok(WeeklyScore {
                week_id: row.get(0)?,
                tool: row.get(1)?,
                genre: row.get(2)?,
                score: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(scores)
}

/// Rankings of one week, in the order they were written (genre order, then rank).
pub fn get_rankings(conn: &Connection, week_id: &str) -> Result<Vec<RankingEntry>> {
    let mut stmt = conn.prepare(
        "SELECT week_id, genre, rank, tool, score, is_new FROM rankings
         WHERE week_id = ?1
         ORDER BY id",
    )?;
    let rankings = stmt
        .query_map(params![week_id], |row| {
            Ok(RankingEntry {
                week_id: row.get(0)?,
                genre: row.get(1)?,
                rank: row.get(2)?,
                tool: row.get(3)?,
                score: row.get(4)?,
                is_new: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rankings)
}

/// Newest week present in the ledger or rankings. `YYYY-Www` sorts
/// lexically in calendar order.
pub fn newest_week(conn: &Connection) -> Result<Option<String>> {
    let week: Option<String> = conn
        .query_row(
            "SELECT MAX(week_id) FROM (
                SELECT week_id FROM weekly_scores
                UNION ALL
                SELECT week_id FROM rankings
             )",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    Ok(week)
}

/// Every stored week, newest first.
pub fn list_weeks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT week_id FROM weekly_scores
         UNION
         SELECT week_id FROM rankings
         ORDER BY week_id DESC",
    )?;
    let weeks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(weeks)
}

/// Write one week's ledger rows and rankings, replacing any earlier write of
/// the same week. Refused when a newer week already exists: that week has
/// closed.
pub fn write_week(
    conn: &Connection,
    week_id: &str,
    scores: &[WeeklyScore],
    rankings: &[RankingEntry],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    if let Some(newest) = newest_week(&tx)? {
        if newest.as_str() > week_id {
            return Err(PipelineError::ClosedWeek {
                week: week_id.to_string(),
                newest,
            }
            .into());
        }
    }

    tx.execute("DELETE FROM weekly_scores WHERE week_id = ?1", params![week_id])?;
    tx.execute("DELETE FROM rankings WHERE week_id = ?1", params![week_id])?;

    {
        let mut insert_score = tx.prepare(
            "INSERT INTO weekly_scores (week_id, tool, genre, score) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for s in scores {
            insert_score.execute(params![week_id, s.tool, s.genre, s.score])?;
        }

        let mut insert_rank = tx.prepare(
            "INSERT INTO rankings (week_id, genre, rank, tool, score, is_new)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for r in rankings {
            insert_rank.execute(params![week_id, r.genre, r.rank, r.tool, r.score, r.is_new])?;
        }
    }

    tx.commit().context("Failed to commit weekly snapshot")?;
    Ok(())
}
