// Pipeline error taxonomy.
//
// Most of these are recoverable: the caller logs them and moves on to the
// next record or falls back to a default. Only `NoProcessableInput` stops a
// run, and even that is reported as a no-op rather than a failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::sources::SourceKind;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No structural fingerprint matched. Skip the record.
    #[error("unrecognized source format (keys: {})", keys.join(", "))]
    UnrecognizedSourceFormat { keys: Vec<String> },

    /// The record looked like `kind` but its nested structure is malformed.
    #[error("corrupt {kind} payload: {reason}")]
    CorruptRecordPayload { kind: SourceKind, reason: String },

    #[error("dictionary config not found at {0}")]
    MissingDictionaryConfig(PathBuf),

    #[error("genre config not found at {0}")]
    MissingGenreConfig(PathBuf),

    #[error("no stored scores for previous week {0}")]
    MissingPreviousWeekData(String),

    /// Nothing to aggregate. The run exits without writing.
    #[error("no processable input found")]
    NoProcessableInput,

    #[error("invalid ISO week identifier '{0}' (expected YYYY-Www)")]
    InvalidWeekId(String),

    /// A newer week already exists, so this one is closed.
    #[error("week {week} is closed (newest stored week is {newest})")]
    ClosedWeek { week: String, newest: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_message_names_the_source() {
        let err = PipelineError::CorruptRecordPayload {
            kind: SourceKind::Youtube,
            reason: "channels is not an object".to_string(),
        };
        assert_eq!(err.to_string(), "corrupt youtube payload: channels is not an object");
    }

    #[test]
    fn unrecognized_message_lists_keys() {
        let err = PipelineError::UnrecognizedSourceFormat {
            keys: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "unrecognized source format (keys: a, b)");
    }
}
