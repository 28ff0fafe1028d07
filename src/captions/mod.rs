use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::utils::join_url;
use crate::ReindexError;

/// Text substituted for the transcript whenever captions cannot be fetched
pub const TRANSCRIPT_PLACEHOLDER: &str = "Transcript not available.";

/// One caption cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Why a transcript could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Captions are disabled or the track is empty
    NoCaptions,
    /// Connection failure or non-success status
    Transport,
    /// The response was not the expected caption format
    Malformed,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::NoCaptions => write!(f, "no captions"),
            UnavailableReason::Transport => write!(f, "transport failure"),
            UnavailableReason::Malformed => write!(f, "malformed caption data"),
        }
    }
}

/// Failure reported by a caption source, classified for logging
#[derive(Debug)]
pub struct CaptionError {
    pub reason: UnavailableReason,
    pub detail: String,
}

impl CaptionError {
    pub fn new(reason: UnavailableReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Video transcript, or the reason it is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Transcript {
    Available { text: String },
    Unavailable { reason: UnavailableReason },
}

impl Transcript {
    /// Join segments with single spaces in their original order
    pub fn from_segments(segments: &[CaptionSegment]) -> Self {
        let text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Transcript::Available { text }
    }

    /// Transcript text, or the placeholder when unavailable
    pub fn text(&self) -> &str {
        match self {
            Transcript::Available { text } => text,
            Transcript::Unavailable { .. } => TRANSCRIPT_PLACEHOLDER,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Transcript::Available { .. })
    }
}

/// Source of timed captions for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Caption segments in temporal order
    async fn fetch_segments(&self, video_id: &str) -> Result<Vec<CaptionSegment>, CaptionError>;
}

/// Fetch a transcript, absorbing every caption failure into the placeholder
pub async fn fetch_transcript(source: &dyn CaptionSource, video_id: &str) -> Transcript {
    let outcome = source.fetch_segments(video_id).await.and_then(|segments| {
        if segments.iter().all(|segment| segment.text.trim().is_empty()) {
            Err(CaptionError::new(
                UnavailableReason::NoCaptions,
                "caption track is empty",
            ))
        } else {
            Ok(segments)
        }
    });

    match outcome {
        Ok(segments) => {
            tracing::debug!("Fetched {} caption segments for {}", segments.len(), video_id);
            Transcript::from_segments(&segments)
        }
        Err(err) => {
            let unavailable = ReindexError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: format!("{}: {}", err.reason, err.detail),
            };
            tracing::warn!("{}", unavailable);
            Transcript::Unavailable { reason: err.reason }
        }
    }
}

/// YouTube `timedtext` json3 payload
#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Caption client for the YouTube timedtext endpoint
pub struct TimedTextClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
}

impl TimedTextClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            language: language.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            config.endpoints.captions_base_url.clone(),
            config.pipeline.transcript_language.clone(),
        )
    }

    /// Convert a json3 body into segments, skipping events that carry no text
    fn parse_json3(body: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
        if body.trim().is_empty() {
            return Err(CaptionError::new(
                UnavailableReason::NoCaptions,
                "empty response body",
            ));
        }

        let parsed: TimedTextResponse = serde_json::from_str(body)
            .map_err(|e| CaptionError::new(UnavailableReason::Malformed, e.to_string()))?;

        let segments = parsed
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
                let text = text.replace('\n', " ").trim().to_string();
                (!text.is_empty()).then(|| CaptionSegment {
                    text,
                    start: event.t_start_ms as f64 / 1000.0,
                    duration: event.d_duration_ms as f64 / 1000.0,
                })
            })
            .collect();

        Ok(segments)
    }
}

#[async_trait]
impl CaptionSource for TimedTextClient {
    async fn fetch_segments(&self, video_id: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
        let transport =
            |e: reqwest::Error| CaptionError::new(UnavailableReason::Transport, e.to_string());

        let response = self
            .http
            .get(join_url(&self.base_url, "api/timedtext"))
            .query(&[("v", video_id), ("lang", &self.language), ("fmt", "json3")])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptionError::new(
                UnavailableReason::Transport,
                format!("captions endpoint returned {}", status),
            ));
        }

        let body = response.text().await.map_err(transport)?;
        Self::parse_json3(&body)
    }
}
