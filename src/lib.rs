//! Trend Reindexer - A Rust CLI tool for re-indexing YouTube videos against trending news
//!
//! This library extracts a video identifier from a URL, pulls the video's metadata and
//! transcript, finds related news headlines, filters them by relevance and asks a
//! chat-completion model for optimized metadata that can be written back to the video.

pub mod captions;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod news;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod relevance;
pub mod suggest;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{extract_video_id, VideoReference};
pub use pipeline::{Pipeline, PipelineClients, PipelineRun, RunStatus};
pub use platform::VideoMetadata;
pub use suggest::SuggestedMetadata;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ReindexError>;

/// Error types specific to the reindexer
#[derive(thiserror::Error, Debug)]
pub enum ReindexError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("No video found for id {0}")]
    MetadataNotFound(String),

    #[error("Transcript not available for {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("No news articles found for query: {0}")]
    NewsFetchEmpty(String),

    #[error("None of the {0} headlines matched the video content")]
    NoRelevantNews(usize),

    #[error("Language model response could not be parsed as a suggestion")]
    SuggestionParseFailure,

    #[error("Failed to update metadata for {video_id}: {reason}")]
    UpdateFailure { video_id: String, reason: String },

    #[error("{service} API returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing credential: {name} (set {env_var} or add it to the config file)")]
    MissingCredential {
        name: &'static str,
        env_var: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}
