// SnapshotStore trait: the persistence seam between pipeline stages.
//
// Implementors: SqliteStore (wraps rusqlite). The pipeline only talks to this
// trait, so stages can be tested against an in-memory database and the
// backend can change without touching the scoring code.
//
// The trait mirrors the queries.rs function signatures.

use anyhow::Result;
use chrono::NaiveDate;

use super::models::{PendingTerm, ProcessedRow, RankingEntry, WeeklyScore};
use crate::week::WeekId;

pub trait SnapshotStore {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    fn table_count(&self) -> Result<i64>;

    // --- Processed snapshot ---

    /// Replace the processed rows and pending terms of one run date.
    fn save_processed(
        &self,
        run_date: NaiveDate,
        rows: &[ProcessedRow],
        pending: &[PendingTerm],
    ) -> Result<()>;

    /// Most recent run date with processed rows, optionally limited to one week.
    fn latest_run_date(&self, within: Option<&WeekId>) -> Result<Option<NaiveDate>>;

    fn processed_rows(&self, run_date: NaiveDate) -> Result<Vec<ProcessedRow>>;

    /// Pending terms of one run date, most frequent first.
    fn pending_terms(&self, run_date: NaiveDate, limit: u32) -> Result<Vec<PendingTerm>>;

    /// Processed row counts of the most recent run dates.
    fn run_counts(&self, limit: u32) -> Result<Vec<(NaiveDate, i64)>>;

    // --- Weekly ledger ---

    fn weekly_scores(&self, week: &WeekId) -> Result<Vec<WeeklyScore>>;

    fn rankings(&self, week: &WeekId) -> Result<Vec<RankingEntry>>;

    /// Newest week with ledger rows or rankings.
    fn newest_week(&self) -> Result<Option<WeekId>>;

    /// Every stored week, newest first.
    fn weeks(&self) -> Result<Vec<WeekId>>;

    /// Replace one week's ledger rows and rankings. Fails with `ClosedWeek`
    /// when a newer week is already stored.
    fn write_week(
        &self,
        week: &WeekId,
        scores: &[WeeklyScore],
        rankings: &[RankingEntry],
    ) -> Result<()>;
}
