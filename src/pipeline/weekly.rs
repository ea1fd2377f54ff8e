// Weekly ranking pipeline: one transition of the week-over-week ledger.
//
// Reads the newest processed snapshot inside the target week and the
// previous week's ledger, merges them with decay, ranks every genre, then
// writes exactly one new week key. Earlier weeks are only ever read.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::dictionary::Dictionary;
use crate::error::PipelineError;
use crate::scoring::aggregate;
use crate::scoring::ranking;
use crate::store::models::{RankingEntry, WeeklyScore};
use crate::store::SnapshotStore;
use crate::week::WeekId;

/// Knobs for one weekly run.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyParams {
    pub decay_factor: f64,
    pub top_n: usize,
}

impl Default for WeeklyParams {
    fn default() -> Self {
        Self {
            decay_factor: 0.0,
            top_n: ranking::TOP_N,
        }
    }
}

/// What one weekly run wrote.
#[derive(Debug)]
pub struct WeeklyOutcome {
    pub week: WeekId,
    /// The processed snapshot the scores were computed from.
    pub run_date: NaiveDate,
    pub scores: Vec<WeeklyScore>,
    pub rankings: Vec<RankingEntry>,
    /// Whether last week's ledger existed.
    pub had_history: bool,
}

/// Compute and store `week`'s scores and rankings.
///
/// Fails with `NoProcessableInput` when no processed snapshot falls inside
/// the week, and with `ClosedWeek` when a newer week is already stored.
pub fn run_week(
    store: &dyn SnapshotStore,
    dict: &Dictionary,
    genres: &[String],
    week: WeekId,
    params: WeeklyParams,
) -> Result<WeeklyOutcome> {
    let Some(run_date) = store.latest_run_date(Some(&week))? else {
        return Err(PipelineError::NoProcessableInput.into());
    };
    let rows = store
        .processed_rows(run_date)
        .with_context(|| format!("Failed to load processed rows for {run_date}"))?;

    let previous_week = week.previous();
    let previous = store.weekly_scores(&previous_week)?;
    let had_history = !previous.is_empty();
    if !had_history {
        warn!(
            error = %PipelineError::MissingPreviousWeekData(previous_week.to_string()),
            "Starting from an empty history"
        );
    }

    let current = aggregate::current_scores(&rows, dict);
    let merged = aggregate::merge_scores(&current, &previous, params.decay_factor, dict);
    let new_tools = aggregate::new_entities(&current, &previous);
    let rankings = ranking::rank_genres(&week, &merged, &new_tools, dict, genres, params.top_n);
    let scores = aggregate::to_weekly_scores(&week, &merged, dict);

    store.write_week(&week, &scores, &rankings)?;

    info!(
        week = %week,
        %run_date,
        rows = rows.len(),
        tools = scores.len(),
        new_tools = new_tools.len(),
        ranked = rankings.len(),
        "Weekly ranking written"
    );

    Ok(WeeklyOutcome {
        week,
        run_date,
        scores,
        rankings,
        had_history,
    })
}
