use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{Config, NEWS_API_KEY_ENV};
use crate::utils::{excerpt, join_url};
use crate::{ReindexError, Result};

const SERVICE: &str = "NewsAPI";

/// Keyword search over news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Titles of at most `limit` matching articles, in the order the source ranks them
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

/// NewsAPI `/v2/everything` client
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            config.endpoints.news_base_url.clone(),
            config.api.news_api_key.clone(),
        )
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if self.api_key.is_empty() {
            return Err(ReindexError::MissingCredential {
                name: "News API key",
                env_var: NEWS_API_KEY_ENV,
            });
        }

        let url = format!(
            "{}?q={}",
            join_url(&self.base_url, "v2/everything"),
            urlencoding::encode(query)
        );
        tracing::debug!("Searching news: {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("apiKey", &self.api_key)])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Error payloads are JSON without `articles`; those count as an empty result.
        let body: EverythingResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(ReindexError::Api {
                    service: SERVICE,
                    status: status.as_u16(),
                    body: excerpt(&text),
                })
            }
        };
        if !status.is_success() {
            tracing::warn!("{} returned {}: {}", SERVICE, status, excerpt(&text));
        }

        let titles = body
            .articles
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .filter_map(|article| article.title)
            .collect();

        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "rust async"))
            .and(query_param("apiKey", "news-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn client(server: &MockServer) -> NewsApiClient {
        NewsApiClient::new(reqwest::Client::new(), server.uri(), "news-key")
    }

    #[tokio::test]
    async fn test_first_five_titles_in_order() {
        let articles: Vec<_> = (1..=8)
            .map(|i| json!({ "title": format!("Headline {i}"), "url": "https://example.com" }))
            .collect();
        let server = server_with(json!({ "status": "ok", "articles": articles })).await;

        let titles = client(&server).headlines("rust async", 5).await.unwrap();
        assert_eq!(
            titles,
            vec!["Headline 1", "Headline 2", "Headline 3", "Headline 4", "Headline 5"]
        );
    }

    #[tokio::test]
    async fn test_missing_articles_field_is_empty() {
        let server = server_with(json!({ "status": "error", "code": "apiKeyInvalid" })).await;
        let titles = client(&server).headlines("rust async", 5).await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_empty_articles_is_empty() {
        let server = server_with(json!({ "status": "ok", "articles": [] })).await;
        let titles = client(&server).headlines("rust async", 5).await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_untitled_articles_are_skipped() {
        let server = server_with(json!({
            "articles": [{ "title": null }, { "title": "Kept" }, {}]
        }))
        .await;
        let titles = client(&server).headlines("rust async", 5).await.unwrap();
        assert_eq!(titles, vec!["Kept"]);
    }

    #[tokio::test]
    async fn test_error_status_with_json_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let titles = client(&server).headlines("rust async", 5).await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_without_json_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).headlines("rust async", 5).await.unwrap_err();
        assert!(matches!(err, ReindexError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_requires_api_key() {
        let client = NewsApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "");
        let err = client.headlines("anything", 5).await.unwrap_err();
        assert!(matches!(err, ReindexError::MissingCredential { .. }));
    }
}
