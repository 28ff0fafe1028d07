use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::captions::{fetch_transcript, CaptionSource, TimedTextClient, Transcript};
use crate::config::{Config, PipelineConfig};
use crate::extractors::{extract_video_id, VideoReference};
use crate::news::{NewsApiClient, NewsSource};
use crate::platform::{SnippetUpdate, VideoMetadata, VideoPlatform, YoutubeDataClient};
use crate::relevance::{RelevancePolicy, SentimentPolicy};
use crate::suggest::{
    LanguageModel, OpenAiChatClient, SuggestedMetadata, SuggestionGenerator, SuggestionRequest,
};
use crate::utils::split_tags;
use crate::{ReindexError, Result};

pub mod progress;

use progress::StageReporter;

/// The external services a run talks to, built once and shared by every run
#[derive(Clone)]
pub struct PipelineClients {
    pub platform: Arc<dyn VideoPlatform>,
    pub captions: Arc<dyn CaptionSource>,
    pub news: Arc<dyn NewsSource>,
    pub model: Arc<dyn LanguageModel>,
}

impl PipelineClients {
    /// reqwest-backed clients sharing one connection pool
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            platform: Arc::new(YoutubeDataClient::from_config(http.clone(), config)),
            captions: Arc::new(TimedTextClient::from_config(http.clone(), config)),
            news: Arc::new(NewsApiClient::from_config(http.clone(), config)),
            model: Arc::new(OpenAiChatClient::from_config(http, config)),
        })
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    InvalidUrl,
    MetadataNotFound,
    NewsFetchEmpty,
    NoRelevantNews,
    SuggestionParseFailure,
}

/// How an operator should read a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl RunStatus {
    pub fn severity(&self) -> Severity {
        match self {
            RunStatus::Completed => Severity::Success,
            RunStatus::NoRelevantNews => Severity::Info,
            RunStatus::NewsFetchEmpty => Severity::Warning,
            RunStatus::InvalidUrl
            | RunStatus::MetadataNotFound
            | RunStatus::SuggestionParseFailure => Severity::Error,
        }
    }

    /// Operator-facing explanation
    pub fn message(&self) -> &'static str {
        match self {
            RunStatus::Completed => "AI-suggested metadata is ready.",
            RunStatus::InvalidUrl => "Invalid YouTube URL. Please enter a correct YouTube link.",
            RunStatus::MetadataNotFound => "Invalid YouTube Video ID or API issue.",
            RunStatus::NewsFetchEmpty => "No relevant news articles found.",
            RunStatus::NoRelevantNews => "No trending topics detected for re-indexing.",
            RunStatus::SuggestionParseFailure => "Failed to generate AI suggestions. Try again.",
        }
    }

    /// Whether the operator can simply run the same URL again
    pub fn is_retryable(&self) -> bool {
        matches!(self, RunStatus::SuggestionParseFailure)
    }
}

/// Everything one run produced, up to the stage where it stopped
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub url: String,
    pub status: RunStatus,
    pub video: Option<VideoReference>,
    pub metadata: Option<VideoMetadata>,
    pub transcript: Option<Transcript>,
    pub headlines: Vec<String>,
    pub relevant_headlines: Vec<String>,
    pub suggestion: Option<SuggestedMetadata>,
}

impl PipelineRun {
    fn new(url: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            url: url.to_string(),
            status: RunStatus::Completed,
            video: None,
            metadata: None,
            transcript: None,
            headlines: Vec::new(),
            relevant_headlines: Vec::new(),
            suggestion: None,
        }
    }

    fn halt(mut self, status: RunStatus) -> Self {
        tracing::info!("Run halted: {:?}", status);
        self.status = status;
        self
    }

    /// The terminal status as an error, `None` for a completed run
    pub fn error(&self) -> Option<ReindexError> {
        let video_id = || {
            self.video
                .as_ref()
                .map(|video| video.id.clone())
                .unwrap_or_default()
        };

        match self.status {
            RunStatus::Completed => None,
            RunStatus::InvalidUrl => Some(ReindexError::InvalidUrl(self.url.clone())),
            RunStatus::MetadataNotFound => Some(ReindexError::MetadataNotFound(video_id())),
            RunStatus::NewsFetchEmpty => Some(ReindexError::NewsFetchEmpty(
                self.metadata
                    .as_ref()
                    .map(|metadata| metadata.title.clone())
                    .unwrap_or_default(),
            )),
            RunStatus::NoRelevantNews => Some(ReindexError::NoRelevantNews(self.headlines.len())),
            RunStatus::SuggestionParseFailure => Some(ReindexError::SuggestionParseFailure),
        }
    }
}

/// Metadata optimization pipeline
pub struct Pipeline {
    clients: PipelineClients,
    relevance: Box<dyn RelevancePolicy>,
    settings: PipelineConfig,
    reporter: StageReporter,
}

impl Pipeline {
    pub fn new(clients: PipelineClients, settings: PipelineConfig) -> Self {
        let relevance: Box<dyn RelevancePolicy> =
            Box::new(SentimentPolicy::new(settings.relevance_threshold));
        Self {
            clients,
            relevance,
            settings,
            reporter: StageReporter::hidden(),
        }
    }

    /// Replace the relevance policy
    pub fn with_relevance(mut self, relevance: Box<dyn RelevancePolicy>) -> Self {
        self.relevance = relevance;
        self
    }

    /// Show a spinner per network stage
    pub fn with_reporter(mut self, reporter: StageReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run every stage for one URL.
    ///
    /// Gate failures end the run with a status; transport and API failures are
    /// returned as errors.
    pub async fn run(&self, url: &str) -> Result<PipelineRun> {
        let run = PipelineRun::new(url);
        let span = tracing::info_span!("run", run_id = %run.run_id);
        self.run_stages(run).instrument(span).await
    }

    async fn run_stages(&self, mut run: PipelineRun) -> Result<PipelineRun> {
        tracing::info!("Starting run for URL: {}", run.url);

        let Some(video) = extract_video_id(&run.url) else {
            return Ok(run.halt(RunStatus::InvalidUrl));
        };
        tracing::info!("Video id: {}", video);
        run.video = Some(video.clone());

        let (metadata, transcript) = self.fetch_video(&video.id).await?;

        let Some(metadata) = metadata else {
            return Ok(run.halt(RunStatus::MetadataNotFound));
        };
        run.metadata = Some(metadata.clone());

        // Only absent when the fetch was deferred until metadata was known.
        let transcript = match transcript {
            Some(transcript) => transcript,
            None => {
                let stage = self.reporter.stage("Fetching transcript...");
                let transcript = fetch_transcript(self.clients.captions.as_ref(), &video.id).await;
                stage.finish("Transcript fetched");
                transcript
            }
        };
        run.transcript = Some(transcript.clone());

        let stage = self.reporter.stage("Searching related news...");
        let headlines = self
            .clients
            .news
            .headlines(&metadata.title, self.settings.max_headlines)
            .await;
        stage.finish("News search complete");
        run.headlines = headlines?;
        tracing::info!("Found {} headlines", run.headlines.len());

        if run.headlines.is_empty() {
            return Ok(run.halt(RunStatus::NewsFetchEmpty));
        }

        let content = format!("{} {}", metadata.title, transcript.text());
        run.relevant_headlines = self.relevance.filter(&content, &run.headlines);
        tracing::info!("{} headlines are relevant", run.relevant_headlines.len());

        if run.relevant_headlines.is_empty() {
            return Ok(run.halt(RunStatus::NoRelevantNews));
        }

        let generator = SuggestionGenerator::new(
            self.clients.model.as_ref(),
            self.settings.transcript_snippet_chars,
        );
        let request = SuggestionRequest {
            title: &metadata.title,
            transcript: transcript.text(),
            trending_topics: &run.relevant_headlines,
        };

        let stage = self.reporter.stage("Generating AI-suggested metadata...");
        let suggestion = generator.generate(&request).await;
        stage.finish("Suggestion received");

        match suggestion? {
            Some(suggestion) => {
                run.suggestion = Some(suggestion);
                tracing::info!("Run completed");
                Ok(run)
            }
            None => Ok(run.halt(RunStatus::SuggestionParseFailure)),
        }
    }

    /// Metadata, plus the transcript when both are fetched concurrently
    async fn fetch_video(
        &self,
        video_id: &str,
    ) -> Result<(Option<VideoMetadata>, Option<Transcript>)> {
        if self.settings.concurrent_fetch {
            let stage = self.reporter.stage("Fetching video data and transcript...");
            let (metadata, transcript) = tokio::join!(
                self.clients.platform.fetch_metadata(video_id),
                fetch_transcript(self.clients.captions.as_ref(), video_id),
            );
            stage.finish("Video data fetched");
            return Ok((metadata?, Some(transcript)));
        }

        let stage = self.reporter.stage("Fetching video data...");
        let metadata = self.clients.platform.fetch_metadata(video_id).await;
        stage.finish("Video data fetched");
        Ok((metadata?, None))
    }

    /// Write edited metadata back to the video.
    ///
    /// `tags` is the comma-separated text the operator edited. The category is echoed
    /// back when known.
    pub async fn apply_update(
        &self,
        video_id: &str,
        title: &str,
        description: &str,
        tags: &str,
        category_id: Option<String>,
    ) -> Result<()> {
        let update = SnippetUpdate {
            title: title.to_string(),
            description: description.to_string(),
            tags: split_tags(tags),
            category_id,
        };

        let stage = self.reporter.stage("Updating video metadata...");
        let result = self.clients.platform.update_metadata(video_id, &update).await;
        stage.finish("Update finished");

        result.map_err(|e| {
            tracing::error!("Metadata update for {} failed: {}", video_id, e);
            ReindexError::UpdateFailure {
                video_id: video_id.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
