// YouTube weekly collections: `channels` (name -> {videos: [...]}) together
// with `total_channels`.

use serde_json::{Map, Value};

use super::{
    array_field, as_object, join_parts, object_field, text_field, SourceAdapter, SourceKind,
};
use crate::error::PipelineError;

pub struct YoutubeAdapter;

impl SourceAdapter for YoutubeAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Youtube
    }

    fn matches(&self, record: &Map<String, Value>) -> bool {
        record.contains_key("channels") && record.contains_key("total_channels")
    }

    /// Title, description and tags of every video of every channel.
    fn extract(&self, record: &Map<String, Value>) -> Result<String, PipelineError> {
        let kind = SourceKind::Youtube;
        let mut parts: Vec<&str> = Vec::new();

        let Some(channels) = object_field(record, "channels", kind)? else {
            return Ok(String::new());
        };

        for (name, channel) in channels {
            let channel = as_object(channel, &format!("channel '{name}'"), kind)?;
            for video in array_field(channel, "videos", kind)? {
                let video = as_object(video, &format!("video in channel '{name}'"), kind)?;
                parts.push(text_field(video, "title"));
                parts.push(text_field(video, "description"));
                // Tags often carry tool names verbatim. Non-list tags are ignored.
                if let Some(Value::Array(tags)) = video.get("tags") {
                    parts.extend(tags.iter().filter_map(Value::as_str));
                }
            }
        }

        Ok(join_parts(parts))
    }
}
