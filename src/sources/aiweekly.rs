// AI-Weekly newsletter scrapes: an `articles` list alongside the feed's `rss_url`.

use serde_json::{Map, Value};

use super::{array_field, as_object, join_parts, text_field, SourceAdapter, SourceKind};
use crate::error::PipelineError;

pub struct AiWeeklyAdapter;

impl SourceAdapter for AiWeeklyAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Aiweekly
    }

    fn matches(&self, record: &Map<String, Value>) -> bool {
        record.contains_key("articles") && record.contains_key("rss_url")
    }

    /// Title and scraped content of every article in the issue.
    fn extract(&self, record: &Map<String, Value>) -> Result<String, PipelineError> {
        let kind = SourceKind::Aiweekly;
        let mut parts: Vec<&str> = Vec::new();
        for article in array_field(record, "articles", kind)? {
            let article = as_object(article, "article", kind)?;
            parts.push(text_field(article, "title"));
            parts.push(text_field(article, "content"));
        }
        Ok(join_parts(parts))
    }
}
