// Colored terminal output for leaderboards and run reports.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use chrono::NaiveDate;
use colored::Colorize;

use crate::dictionary::Dictionary;
use crate::pipeline::preprocess::PreprocessReport;
use crate::pipeline::weekly::WeeklyOutcome;
use crate::store::models::{PendingTerm, RankingEntry};
use crate::week::WeekId;

/// Display one week's per-genre leaderboard.
pub fn display_rankings(week: &WeekId, rankings: &[RankingEntry]) {
    if rankings.is_empty() {
        println!("No rankings stored for {week}. Run `toolrank rank` first.");
        return;
    }

    println!("\n{}", format!("=== AI Tool Ranking {week} ===").bold());

    let mut current_genre: Option<&str> = None;
    for entry in rankings {
        if current_genre != Some(entry.genre.as_str()) {
            println!("\n  {}", entry.genre.cyan().bold());
            current_genre = Some(entry.genre.as_str());
        }

        let new_badge = if entry.is_new {
            "NEW".green().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "    {}  {:<28} {:>8.1}  {}",
            colorize_rank(entry.rank),
            super::truncate_chars(&entry.tool, 25),
            entry.score,
            new_badge,
        );
    }
    println!();
}

/// Summarize a weekly run, then show its leaderboard.
pub fn display_weekly_outcome(outcome: &WeeklyOutcome) {
    println!(
        "Ranked {} from the {} snapshot: {} tools scored",
        outcome.week.to_string().bold(),
        outcome.run_date,
        outcome.scores.len(),
    );
    if !outcome.had_history {
        println!(
            "  {} no ledger for {}, starting from an empty history",
            "~".yellow(),
            outcome.week.previous()
        );
    }
    display_rankings(&outcome.week, &outcome.rankings);
}

/// Display per-source statistics for a preprocessing run.
pub fn display_preprocess_report(report: &PreprocessReport) {
    println!("\n{}", "=== Preprocessing ===".bold());
    for file in &report.files {
        println!("  {}", file.display().to_string().dimmed());
    }
    println!();

    println!(
        "  {:<10} {:>8} {:>8} {:>9} {:>8} {:>9} {:>8}",
        "Source".dimmed(),
        "Records".dimmed(),
        "Matched".dimmed(),
        "Mentions".dimmed(),
        "LowConf".dimmed(),
        "Rejected".dimmed(),
        "Corrupt".dimmed(),
    );
    println!("  {}", "-".repeat(66).dimmed());
    for (kind, stats) in &report.per_source {
        println!(
            "  {:<10} {:>8} {:>8} {:>9} {:>8} {:>9} {:>8}",
            kind.as_str(),
            stats.records,
            stats.matched,
            stats.mentions,
            stats.low_confidence,
            stats.rejected,
            stats.corrupt,
        );
    }
    println!();

    println!(
        "  {} processed rows, {} pending terms (of {} distinct unknown)",
        report.rows.len().to_string().bold(),
        report.pending.len(),
        report.distinct_unknown,
    );
    if report.unrecognized > 0 {
        println!("  {} {} unrecognized records skipped", "!".yellow(), report.unrecognized);
    }
    if report.failed_files > 0 {
        println!("  {} {} files could not be read", "!".red(), report.failed_files);
    }
}

/// Display the most frequent unknown terms of a run.
pub fn display_pending(run_date: Option<NaiveDate>, terms: &[PendingTerm]) {
    let Some(run_date) = run_date else {
        println!("No processed snapshot yet. Run `toolrank preprocess` first.");
        return;
    };
    if terms.is_empty() {
        println!("No unknown terms recorded on {run_date}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Unknown Terms {run_date} ({} shown) ===", terms.len()).bold()
    );
    for (i, term) in terms.iter().enumerate() {
        println!("  {:>4}. {:<28} {:>6}", i + 1, term.term, term.frequency);
    }
    println!();
}

/// Report dictionary health: size, ambiguous aliases and unranked genres.
pub fn display_dictionary_check(dict: &Dictionary, genres: &[String]) {
    println!(
        "Dictionary: {} tools, {} aliases",
        dict.len(),
        dict.aliases().len()
    );

    let ambiguous = dict.ambiguous_aliases();
    if ambiguous.is_empty() {
        println!("  {} no ambiguous aliases", "ok".green());
    } else {
        println!(
            "  {} {} aliases are registered under more than one tool (first wins):",
            "!".yellow(),
            ambiguous.len()
        );
        for amb in ambiguous {
            println!("    {:<24} {}", amb.alias, amb.owners.join(", ").dimmed());
        }
    }

    let orphaned: Vec<&str> = dict
        .entities()
        .iter()
        .filter(|e| e.aggregate && !genres.contains(&e.genre))
        .map(|e| e.canonical_name.as_str())
        .collect();
    if !orphaned.is_empty() {
        println!(
            "  {} {} tools have a genre outside the genre list and are never ranked: {}",
            "!".yellow(),
            orphaned.len(),
            orphaned.join(", ")
        );
    }
}

/// Colorize a leaderboard position.
fn colorize_rank(rank: u32) -> colored::ColoredString {
    let label = format!("#{rank}");
    match rank {
        1 => label.yellow().bold(),
        2 => label.white().bold(),
        3 => label.bright_red(),
        _ => label.dimmed(),
    }
}
