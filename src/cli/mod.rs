use clap::{Parser, Subcommand, ValueEnum};

pub mod review;

#[derive(Parser)]
#[command(
    name = "reindexer",
    about = "Trend Reindexer - Refresh YouTube video metadata against trending news with AI suggestions",
    version,
    long_about = "Fetches a YouTube video's metadata and transcript, finds related trending news, and asks an OpenAI model for a better title, description and tags. Suggestions can be edited and written back to the video."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline for a video and optionally apply the suggestion
    Run {
        /// YouTube video URL (youtube.com/watch?v=... or youtu.be/...)
        #[arg(value_name = "URL")]
        url: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show the suggestion without offering to apply it
        #[arg(long, conflicts_with = "yes")]
        no_apply: bool,

        /// Apply the suggestion as generated, without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Write metadata to a video directly
    Apply {
        /// YouTube video URL or bare video id
        #[arg(value_name = "URL_OR_ID")]
        video: String,

        /// New title
        #[arg(long)]
        title: String,

        /// New description
        #[arg(long, default_value = "")]
        description: String,

        /// New tags, comma-separated
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Print the video id found in a URL
    Extract {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// The whole run as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
