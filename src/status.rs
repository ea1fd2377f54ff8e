// System status display: DB stats, latest processed snapshots, stored weeks.

use anyhow::Result;
use std::path::Path;

use crate::store::SnapshotStore;
use crate::week::WeekId;

/// Number of recent processed snapshots listed.
const RECENT_RUNS: u32 = 5;

/// Display system status to the terminal.
pub fn show(store: &dyn SnapshotStore, db_display_path: &str) -> Result<()> {
    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let runs = store.run_counts(RECENT_RUNS)?;
    if runs.is_empty() {
        println!("Processed snapshots: none yet");
        println!("  Run `toolrank preprocess` to process the latest collector files");
    } else {
        println!("Processed snapshots ({} most recent):", runs.len());
        for (date, rows) in &runs {
            println!("  {} ({} rows)", date, rows);
        }
    }

    let weeks = store.weeks()?;
    match weeks.first() {
        Some(newest) => {
            println!("Ranked weeks: {} (newest {})", weeks.len(), newest);
            let current = WeekId::current();
            if *newest < current {
                println!("  {current} not ranked yet. Run `toolrank rank`");
            }
        }
        None => {
            println!("Ranked weeks: none yet");
            println!("  Run `toolrank rank` after preprocessing");
        }
    }

    Ok(())
}

/// Whether the database file exists yet.
pub fn is_initialized(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
