// Genre list: the ranking partitions and their output order.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::error::PipelineError;

pub const DEFAULT_GENRES: &[&str] = &[
    "multi-ai",
    "image",
    "video",
    "music",
    "voice",
    "research",
    "coding",
    "agent-workflow",
];

#[derive(Debug, Deserialize)]
struct GenreFile {
    #[serde(default)]
    genres: Vec<String>,
}

pub fn default_genres() -> Vec<String> {
    DEFAULT_GENRES.iter().map(|g| g.to_string()).collect()
}

/// Parse `genres = [...]` from TOML, preserving order and dropping repeats.
pub fn parse_genres(source: &str) -> Result<Vec<String>> {
    let file: GenreFile = toml::from_str(source).context("Failed to parse genre list")?;
    let mut genres: Vec<String> = Vec::with_capacity(file.genres.len());
    for genre in file.genres {
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    Ok(genres)
}

/// Load the genre list, falling back to the default set when the file is absent.
pub fn load_genres(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!(
            error = %PipelineError::MissingGenreConfig(path.to_path_buf()),
            "Using default genres"
        );
        return Ok(default_genres());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read genres at {}", path.display()))?;
    parse_genres(&source).with_context(|| format!("Invalid genres at {}", path.display()))
}
