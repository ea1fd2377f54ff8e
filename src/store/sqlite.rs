// SqliteStore: rusqlite backend implementing the SnapshotStore trait.
//
// Dates and week ids cross the trait as typed values and are stored as text
// (YYYY-MM-DD and YYYY-Www) so they sort lexically in calendar order.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

use super::models::{PendingTerm, ProcessedRow, RankingEntry, WeeklyScore};
use super::queries;
use super::traits::SnapshotStore;
use crate::week::WeekId;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// A fresh in-memory store with all tables created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Corrupt run date in database: {raw}"))
}

fn parse_week(raw: &str) -> Result<WeekId> {
    raw.parse::<WeekId>()
        .with_context(|| format!("Corrupt week id in database: {raw}"))
}

impl SnapshotStore for SqliteStore {
    fn table_count(&self) -> Result<i64> {
        super::schema::table_count(&self.conn)
    }

    fn save_processed(
        &self,
        run_date: NaiveDate,
        rows: &[ProcessedRow],
        pending: &[PendingTerm],
    ) -> Result<()> {
        queries::replace_processed_snapshot(&self.conn, &format_date(run_date), rows, pending)
    }

    fn latest_run_date(&self, within: Option<&WeekId>) -> Result<Option<NaiveDate>> {
        let bounds = within.map(|w| (format_date(w.monday()), format_date(w.sunday())));
        let latest = queries::latest_run_date(
            &self.conn,
            bounds.as_ref().map(|(from, to)| (from.as_str(), to.as_str())),
        )?;
        latest.as_deref().map(parse_date).transpose()
    }

    fn processed_rows(&self, run_date: NaiveDate) -> Result<Vec<ProcessedRow>> {
        queries::get_processed_rows(&self.conn, &format_date(run_date))
    }

    fn pending_terms(&self, run_date: NaiveDate, limit: u32) -> Result<Vec<PendingTerm>> {
        queries::get_pending_terms(&self.conn, &format_date(run_date), limit)
    }

    fn run_counts(&self, limit: u32) -> Result<Vec<(NaiveDate, i64)>> {
        queries::processed_run_counts(&self.conn, limit)?
            .into_iter()
            .map(|(date, count)| Ok((parse_date(&date)?, count)))
            .collect()
    }

    fn weekly_scores(&self, week: &WeekId) -> Result<Vec<WeeklyScore>> {
        queries::get_weekly_scores(&self.conn, &week.to_string())
    }

    fn rankings(&self, week: &WeekId) -> Result<Vec<RankingEntry>> {
        queries::get_rankings(&self.conn, &week.to_string())
    }

    fn newest_week(&self) -> Result<Option<WeekId>> {
        queries::newest_week(&self.conn)?
            .as_deref()
            .map(parse_week)
            .transpose()
    }

    fn weeks(&self) -> Result<Vec<WeekId>> {
        queries::list_weeks(&self.conn)?
            .iter()
            .map(|w| parse_week(w))
            .collect()
    }

    fn write_week(
        &self,
        week: &WeekId,
        scores: &[WeeklyScore],
        rankings: &[RankingEntry],
    ) -> Result<()> {
        queries::write_week(&self.conn, &week.to_string(), scores, rankings)
    }
}
