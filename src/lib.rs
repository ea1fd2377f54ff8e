// Toolrank: weekly AI tool leaderboard from collected feeds
//
// This is the library root. Each module corresponds to a major subsystem
// of the text-to-ranking pipeline.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod matcher;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod sources;
pub mod status;
pub mod store;
pub mod text;
pub mod week;
