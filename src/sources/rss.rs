// News feeds. Three shapes share this kind:
//   - weekly aggregate: `week_start` + `sites` (site -> article list, or the
//     daily collector's {status, articles} wrapper) or `all_articles`
//   - daily collection: `sites` + `summary`
//   - single article: bare `summary` (+ `title`)

use serde_json::{Map, Value};

use super::{
    array_field, as_object, join_parts, object_field, text_field, SourceAdapter, SourceKind,
};
use crate::error::PipelineError;

pub struct RssAdapter;

impl SourceAdapter for RssAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Rss
    }

    fn matches(&self, record: &Map<String, Value>) -> bool {
        let weekly = record.contains_key("week_start")
            && (record.contains_key("sites") || record.contains_key("all_articles"));
        weekly || record.contains_key("summary")
    }

    fn extract(&self, record: &Map<String, Value>) -> Result<String, PipelineError> {
        let kind = SourceKind::Rss;

        if record.contains_key("sites") || record.contains_key("all_articles") {
            let mut parts: Vec<&str> = Vec::new();

            if let Some(sites) = object_field(record, "sites", kind)? {
                for (site, entry) in sites {
                    let articles = match entry {
                        Value::Array(items) => items.as_slice(),
                        Value::Object(wrapper) => array_field(wrapper, "articles", kind)?,
                        _ => {
                            return Err(PipelineError::CorruptRecordPayload {
                                kind,
                                reason: format!("site '{site}' has no article list"),
                            })
                        }
                    };
                    push_articles(articles, &mut parts)?;
                }
            }
            push_articles(array_field(record, "all_articles", kind)?, &mut parts)?;

            return Ok(join_parts(parts));
        }

        Ok(join_parts([
            text_field(record, "title"),
            text_field(record, "summary"),
        ]))
    }
}

fn push_articles<'a>(articles: &'a [Value], parts: &mut Vec<&'a str>) -> Result<(), PipelineError> {
    for article in articles {
        let article = as_object(article, "article", SourceKind::Rss)?;
        parts.push(text_field(article, "title"));
        parts.push(text_field(article, "summary"));
    }
    Ok(())
}
