// Input discovery: the latest weekly collector file per source kind.
//
// Collectors write `<data_dir>/<kind>/weekly/<prefix><date>.json`. Only the
// most recently modified file of each kind is read; older files are
// previous weeks' input.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::SourceKind;

/// Where a kind's weekly files live, relative to the data dir, and their name prefix.
pub fn weekly_layout(kind: SourceKind) -> (&'static str, &'static str) {
    match kind {
        SourceKind::Rss => ("rss/weekly", "weekly_summary_"),
        SourceKind::Aiweekly => ("aiweekly/weekly", "aiweekly_"),
        SourceKind::Youtube => ("youtube/weekly", "youtube_weekly_"),
        SourceKind::Reddit => ("reddit/weekly", "reddit_"),
    }
}

/// Scan order for discovery.
const DISCOVERY_ORDER: [SourceKind; 4] = [
    SourceKind::Rss,
    SourceKind::Aiweekly,
    SourceKind::Youtube,
    SourceKind::Reddit,
];

/// The latest `.json` file per kind. Kinds without a directory or without
/// matching files are skipped.
pub fn latest_weekly_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for kind in DISCOVERY_ORDER {
        let (subdir, prefix) = weekly_layout(kind);
        let dir = data_dir.join(subdir);
        match latest_in(&dir, prefix)? {
            Some(path) => {
                info!(source = %kind, file = %path.display(), "Found latest weekly file");
                files.push(path);
            }
            None => debug!(source = %kind, dir = %dir.display(), "No weekly files"),
        }
    }
    Ok(files)
}

/// Most recently modified `<prefix>*.json` in `dir`. Equal timestamps fall
/// back to the lexically greatest name.
fn latest_in(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(prefix) || !name.ends_with(".json") || !path.is_file() {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match &best {
            None => true,
            Some((t, p)) => modified > *t || (modified == *t && path > *p),
        };
        if newer {
            best = Some((modified, path));
        }
    }

    Ok(best.map(|(_, p)| p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn touch(path: &Path, secs: u64) {
        fs::write(path, "{}").unwrap();
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn picks_latest_file_per_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let rss = tmp.path().join("rss/weekly");
        fs::create_dir_all(&rss).unwrap();
        // The older name is the newer file: modification time decides.
        touch(&rss.join("weekly_summary_20250601.json"), 2_000_000);
        touch(&rss.join("weekly_summary_20250608.json"), 1_000_000);
        fs::write(rss.join("notes.txt"), "").unwrap();

        let yt = tmp.path().join("youtube/weekly");
        fs::create_dir_all(&yt).unwrap();
        fs::write(yt.join("youtube_weekly_20250608.json"), "{}").unwrap();

        let files = latest_weekly_files(tmp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("weekly_summary_20250601.json"));
        assert!(files[1].ends_with("youtube_weekly_20250608.json"));
    }

    #[test]
    fn equal_timestamps_fall_back_to_name() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reddit/weekly");
        fs::create_dir_all(&dir).unwrap();
        touch(&dir.join("reddit_20250601.json"), 1_000_000);
        touch(&dir.join("reddit_20250608.json"), 1_000_000);
        let files = latest_weekly_files(tmp.path()).unwrap();
        assert!(files[0].ends_with("reddit_20250608.json"));
    }

    #[test]
    fn ignores_files_with_other_prefixes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("aiweekly/weekly");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("backup_aiweekly_20250601.json"), "{}").unwrap();
        assert!(latest_weekly_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_data_dir_finds_nothing() {
        let files = latest_weekly_files(Path::new("/nonexistent/data")).unwrap();
        assert!(files.is_empty());
    }
}
