use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, YOUTUBE_API_KEY_ENV, YOUTUBE_OAUTH_TOKEN_ENV};
use crate::utils::{ensure_success, join_url};
use crate::{ReindexError, Result};

const SERVICE: &str = "YouTube Data";

/// Snippet fields of a video as currently published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,

    /// Echoed back on update; the platform rejects snippet updates without it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// Full snippet replacement sent by an update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetUpdate {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// Read and update access to a video platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Snippet metadata for a video, `None` when the platform knows no such video
    async fn fetch_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>>;

    /// Replace the snippet of a video
    async fn update_metadata(&self, video_id: &str, update: &SnippetUpdate) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: ApiSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    category_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct VideoUpdateRequest<'a> {
    id: &'a str,
    snippet: &'a SnippetUpdate,
}

/// YouTube Data API v3 client
pub struct YoutubeDataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    oauth_token: Option<String>,
}

impl YoutubeDataClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        oauth_token: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            oauth_token,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            config.endpoints.youtube_base_url.clone(),
            config.api.youtube_api_key.clone(),
            config.api.youtube_oauth_token.clone(),
        )
    }

    fn videos_url(&self) -> String {
        join_url(&self.base_url, "youtube/v3/videos")
    }
}

#[async_trait]
impl VideoPlatform for YoutubeDataClient {
    async fn fetch_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>> {
        if self.api_key.is_empty() {
            return Err(ReindexError::MissingCredential {
                name: "YouTube API key",
                env_var: YOUTUBE_API_KEY_ENV,
            });
        }

        tracing::debug!("Fetching snippet for video {}", video_id);

        let response = self
            .http
            .get(self.videos_url())
            .query(&[("part", "snippet"), ("id", video_id), ("key", &self.api_key)])
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        let listing: VideoListResponse = response.json().await?;

        Ok(listing.items.into_iter().next().map(|item| VideoMetadata {
            title: item.snippet.title,
            description: item.snippet.description,
            tags: item.snippet.tags,
            category_id: item.snippet.category_id,
        }))
    }

    async fn update_metadata(&self, video_id: &str, update: &SnippetUpdate) -> Result<()> {
        let token = self
            .oauth_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ReindexError::MissingCredential {
                name: "YouTube OAuth token",
                env_var: YOUTUBE_OAUTH_TOKEN_ENV,
            })?;

        tracing::info!("Updating snippet for video {}", video_id);

        let response = self
            .http
            .put(self.videos_url())
            .query(&[("part", "snippet")])
            .bearer_auth(token)
            .json(&VideoUpdateRequest {
                id: video_id,
                snippet: update,
            })
            .send()
            .await?;
        ensure_success(SERVICE, response).await?;

        Ok(())
    }
}
