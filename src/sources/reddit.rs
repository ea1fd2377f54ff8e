// Reddit posts: a `subreddit` key identifies the shape.

use serde_json::{Map, Value};

use super::{join_parts, text_field, SourceAdapter, SourceKind};
use crate::error::PipelineError;

pub struct RedditAdapter;

impl SourceAdapter for RedditAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Reddit
    }

    fn matches(&self, record: &Map<String, Value>) -> bool {
        record.contains_key("subreddit")
    }

    fn extract(&self, record: &Map<String, Value>) -> Result<String, PipelineError> {
        Ok(join_parts([
            text_field(record, "title"),
            text_field(record, "selftext"),
        ]))
    }
}
