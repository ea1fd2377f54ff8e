// Entity dictionary: canonical AI tools and every alias that resolves to them.
//
// Loaded once from a TOML file at startup and immutable for the run. The
// alias index is built at load time so exact resolution is a single hash
// lookup; fuzzy matching scans `aliases()` in dictionary order.

pub mod genres;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PipelineError;

/// How strictly an entity may be matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Exact or fuzzy matches both count.
    #[default]
    Fuzzy,
    /// Only a literal alias hit counts. Used for short or ambiguous names
    /// that would otherwise absorb unrelated near-matches.
    ExactOnly,
}

/// One canonical tool/product and its aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    #[serde(rename = "canonical")]
    pub canonical_name: String,
    pub genre: String,
    /// Whether the entity takes part in scoring and ranking.
    #[serde(default = "default_aggregate")]
    pub aggregate: bool,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_aggregate() -> bool {
    true
}

impl CanonicalEntity {
    /// Convenience constructor with no aliases beyond the canonical name.
    pub fn new(canonical_name: &str, genre: &str) -> Self {
        Self {
            canonical_name: canonical_name.to_string(),
            genre: genre.to_string(),
            aggregate: true,
            match_mode: MatchMode::Fuzzy,
            variants: Vec::new(),
            versions: Vec::new(),
            features: Vec::new(),
        }
    }

    /// The pooled alias set: canonical name, variants, versions, features.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str())
            .chain(self.variants.iter().map(String::as_str))
            .chain(self.versions.iter().map(String::as_str))
            .chain(self.features.iter().map(String::as_str))
    }
}

#[derive(Debug, Default, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    tool: Vec<CanonicalEntity>,
}

/// An alias string registered under more than one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousAlias {
    pub alias: String,
    /// Owning canonical names in dictionary order. The first one wins.
    pub owners: Vec<String>,
}

/// An entry of the fuzzy-scan alias list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub text: String,
    /// Index of the owning entity in dictionary order.
    pub entity: usize,
}

#[derive(Debug, Default)]
pub struct Dictionary {
    entities: Vec<CanonicalEntity>,
    /// alias -> entity index; the first entity to register an alias owns it.
    alias_index: HashMap<String, usize>,
    /// Distinct aliases in dictionary order.
    aliases: Vec<Alias>,
    by_name: HashMap<String, usize>,
    ambiguous: Vec<AmbiguousAlias>,
}

impl Dictionary {
    /// Build the dictionary and its alias index from ordered entities.
    ///
    /// A repeated canonical name is skipped (the first entry stays). An alias
    /// claimed by several entities resolves to the first one and is recorded
    /// in `ambiguous_aliases()`.
    pub fn from_entities(entities: Vec<CanonicalEntity>) -> Self {
        let mut dict = Dictionary::default();
        let mut owners: HashMap<String, Vec<String>> = HashMap::new();

        for entity in entities {
            if dict.by_name.contains_key(&entity.canonical_name) {
                warn!(
                    canonical = %entity.canonical_name,
                    "Duplicate canonical name in dictionary, keeping the first entry"
                );
                continue;
            }

            let idx = dict.entities.len();
            dict.by_name.insert(entity.canonical_name.clone(), idx);

            for alias in entity.aliases() {
                match dict.alias_index.get(alias).copied() {
                    None => {
                        dict.alias_index.insert(alias.to_string(), idx);
                        dict.aliases.push(Alias {
                            text: alias.to_string(),
                            entity: idx,
                        });
                        owners.insert(alias.to_string(), vec![entity.canonical_name.clone()]);
                    }
                    Some(owner) if owner != idx => {
                        let list = owners.entry(alias.to_string()).or_default();
                        if !list.contains(&entity.canonical_name) {
                            list.push(entity.canonical_name.clone());
                        }
                    }
                    Some(_) => {}
                }
            }

            dict.entities.push(entity);
        }

        // Report ambiguity in alias order so output is deterministic.
        for alias in &dict.aliases {
            if let Some(list) = owners.get(&alias.text) {
                if list.len() > 1 {
                    dict.ambiguous.push(AmbiguousAlias {
                        alias: alias.text.clone(),
                        owners: list.clone(),
                    });
                }
            }
        }

        dict
    }

    /// Parse a TOML dictionary (`[[tool]]` tables).
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: DictionaryFile =
            toml::from_str(source).context("Failed to parse tool dictionary")?;
        Ok(Self::from_entities(file.tool))
    }

    /// Load the dictionary file. A missing file yields an empty dictionary:
    /// the run proceeds with zero matches.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                error = %PipelineError::MissingDictionaryConfig(path.to_path_buf()),
                "Continuing with an empty dictionary"
            );
            return Ok(Self::default());
        }

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary at {}", path.display()))?;
        let dict = Self::from_toml_str(&source)
            .with_context(|| format!("Invalid dictionary at {}", path.display()))?;

        for amb in &dict.ambiguous {
            warn!(
                alias = %amb.alias,
                owners = ?amb.owners,
                "Alias registered under multiple tools, first entry wins"
            );
        }
        info!(
            tools = dict.len(),
            aliases = dict.aliases.len(),
            "Loaded tool dictionary"
        );

        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in dictionary order.
    pub fn entities(&self) -> &[CanonicalEntity] {
        &self.entities
    }

    pub fn entity(&self, idx: usize) -> &CanonicalEntity {
        &self.entities[idx]
    }

    pub fn get(&self, canonical_name: &str) -> Option<&CanonicalEntity> {
        self.by_name.get(canonical_name).map(|&i| &self.entities[i])
    }

    /// Exact alias resolution, O(1).
    pub fn resolve(&self, alias: &str) -> Option<usize> {
        self.alias_index.get(alias).copied()
    }

    /// Distinct aliases in dictionary order, for fuzzy scanning.
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn ambiguous_aliases(&self) -> &[AmbiguousAlias] {
        &self.ambiguous
    }

    /// Genre of an aggregation-eligible entity, `None` for unknown or
    /// dictionary-only entries.
    pub fn aggregate_genre(&self, canonical_name: &str) -> Option<&str> {
        self.get(canonical_name)
            .filter(|e| e.aggregate)
            .map(|e| e.genre.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[tool]]
canonical = "GPT-4"
genre = "multi-ai"
variants = ["gpt-4", "gpt4"]

[[tool]]
canonical = "Sora"
genre = "video"
match_mode = "exact_only"
features = ["sora turbo"]

[[tool]]
canonical = "OpenAI API"
genre = "coding"
aggregate = false
variants = ["gpt4"]
"#;

    #[test]
    fn parses_toml_with_defaults() {
        let dict = Dictionary::from_toml_str(SAMPLE).unwrap();
        assert_eq!(dict.len(), 3);

        let gpt = dict.get("GPT-4").unwrap();
        assert!(gpt.aggregate);
        assert_eq!(gpt.match_mode, MatchMode::Fuzzy);

        let sora = dict.get("Sora").unwrap();
        assert_eq!(sora.match_mode, MatchMode::ExactOnly);
        assert_eq!(sora.features, vec!["sora turbo"]);
    }

    #[test]
    fn exact_resolution_covers_all_alias_kinds() {
        let dict = Dictionary::from_toml_str(SAMPLE).unwrap();
        assert_eq!(dict.resolve("GPT-4"), Some(0));
        assert_eq!(dict.resolve("gpt-4"), Some(0));
        assert_eq!(dict.resolve("sora turbo"), Some(1));
        assert_eq!(dict.resolve("OpenAI API"), Some(2));
        assert_eq!(dict.resolve("nothing"), None);
    }

    #[test]
    fn ambiguous_alias_resolves_to_first_entry() {
        let dict = Dictionary::from_toml_str(SAMPLE).unwrap();
        assert_eq!(dict.resolve("gpt4"), Some(0));
        assert_eq!(
            dict.ambiguous_aliases(),
            &[AmbiguousAlias {
                alias: "gpt4".to_string(),
                owners: vec!["GPT-4".to_string(), "OpenAI API".to_string()],
            }]
        );
        // Only one copy of the alias goes into the fuzzy scan list.
        assert_eq!(dict.aliases().iter().filter(|a| a.text == "gpt4").count(), 1);
    }

    #[test]
    fn aggregate_genre_skips_dictionary_only_entries() {
        let dict = Dictionary::from_toml_str(SAMPLE).unwrap();
        assert_eq!(dict.aggregate_genre("Sora"), Some("video"));
        assert_eq!(dict.aggregate_genre("OpenAI API"), None);
        assert_eq!(dict.aggregate_genre("Unknown"), None);
    }

    #[test]
    fn duplicate_canonical_keeps_first() {
        let mut second = CanonicalEntity::new("Runway", "image");
        second.variants.push("runwayml".to_string());
        let dict = Dictionary::from_entities(vec![CanonicalEntity::new("Runway", "video"), second]);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("Runway").unwrap().genre, "video");
        assert_eq!(dict.resolve("runwayml"), None);
    }

    #[test]
    fn self_duplicate_alias_is_not_ambiguous() {
        let mut entity = CanonicalEntity::new("Suno", "music");
        entity.variants.push("Suno".to_string());
        let dict = Dictionary::from_entities(vec![entity]);
        assert!(dict.ambiguous_aliases().is_empty());
        assert_eq!(dict.aliases().len(), 1);
    }

    #[test]
    fn missing_file_gives_empty_dictionary() {
        let dict = Dictionary::load(Path::new("/nonexistent/tools.toml")).unwrap();
        assert!(dict.is_empty());
        assert!(dict.aliases().is_empty());
    }
}
