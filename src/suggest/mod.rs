use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, OPENAI_API_KEY_ENV};
use crate::utils::{ensure_success, join_url, truncate_chars};
use crate::{ReindexError, Result};

const SERVICE: &str = "OpenAI";

pub const SYSTEM_PROMPT: &str = "You are a YouTube SEO expert.";

/// Metadata proposed by the language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Chat-completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Text of the first completion for a system + user conversation
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Inputs to the suggestion prompt
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRequest<'a> {
    pub title: &'a str,
    pub transcript: &'a str,
    pub trending_topics: &'a [String],
}

/// Prompt asking for a JSON object with `title`, `description` and `tags`
pub fn build_prompt(request: &SuggestionRequest<'_>, transcript_chars: usize) -> String {
    let snippet = truncate_chars(request.transcript, transcript_chars);
    let topics = request
        .trending_topics
        .iter()
        .map(|topic| format!("'{}'", topic))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Given a YouTube video with the title: '{title}', and the following transcript snippet: '{snippet}',\n\
         optimize the video metadata based on these trending news topics: [{topics}].\n\
         \n\
         Suggest:\n\
         1. A new click-worthy title that aligns with trending topics.\n\
         2. A well-crafted description incorporating the trends.\n\
         3. The best tags to improve search visibility.\n\
         \n\
         Format the response as JSON with keys: \"title\", \"description\", \"tags\".",
        title = request.title,
    )
}

/// Parse a model reply as a suggestion; anything else is `None`
pub fn parse_suggestion(reply: &str) -> Option<SuggestedMetadata> {
    match serde_json::from_str::<SuggestedMetadata>(reply.trim()) {
        Ok(suggestion) => Some(suggestion),
        Err(e) => {
            tracing::warn!("Model reply is not a suggestion object: {}", e);
            None
        }
    }
}

/// Builds prompts, calls the model and parses its reply
pub struct SuggestionGenerator<'a> {
    model: &'a dyn LanguageModel,
    transcript_chars: usize,
}

impl<'a> SuggestionGenerator<'a> {
    pub fn new(model: &'a dyn LanguageModel, transcript_chars: usize) -> Self {
        Self {
            model,
            transcript_chars,
        }
    }

    /// `Ok(None)` when the model answered with something that is not a suggestion
    pub async fn generate(&self, request: &SuggestionRequest<'_>) -> Result<Option<SuggestedMetadata>> {
        let prompt = build_prompt(request, self.transcript_chars);
        let reply = self.model.complete(SYSTEM_PROMPT, &prompt).await?;
        Ok(parse_suggestion(&reply))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI chat-completions client
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            config.endpoints.openai_base_url.clone(),
            config.api.openai_api_key.clone(),
            config.pipeline.model.clone(),
        )
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ReindexError::MissingCredential {
                name: "OpenAI API key",
                env_var: OPENAI_API_KEY_ENV,
            });
        }

        tracing::debug!("Requesting completion from {}", self.model);

        let response = self
            .http
            .post(join_url(&self.base_url, "v1/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
            })
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        let body: ChatResponse = response.json().await?;

        // A missing choice is treated like an unparseable reply further up.
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{always, eq};
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_well_formed_reply() {
        let suggestion =
            parse_suggestion(r#"{"title":"A","description":"B","tags":["x","y"]}"#).unwrap();
        assert_eq!(suggestion.title, "A");
        assert_eq!(suggestion.description, "B");
        assert_eq!(suggestion.tags, vec!["x", "y"]);
    }

    #[test]
    fn test_parse_malformed_reply() {
        assert_eq!(parse_suggestion("Sure! Here are some ideas: ..."), None);
        assert_eq!(parse_suggestion(""), None);
        assert_eq!(parse_suggestion(r#"{"title":"A","description":"B"}"#), None);
        assert_eq!(
            parse_suggestion(r#"{"title":"A","description":"B","tags":"x, y"}"#),
            None
        );
    }

    #[test]
    fn test_prompt_truncates_transcript_by_chars() {
        let transcript = "é".repeat(600);
        let topics = vec!["Topic one".to_string(), "Topic two".to_string()];
        let request = SuggestionRequest {
            title: "My Video",
            transcript: &transcript,
            trending_topics: &topics,
        };

        let prompt = build_prompt(&request, 500);
        assert!(prompt.contains("'My Video'"));
        assert!(prompt.contains(&format!("'{}'", "é".repeat(500))));
        assert!(!prompt.contains(&"é".repeat(501)));
        assert!(prompt.contains("['Topic one', 'Topic two']"));
        assert!(prompt.contains(r#"keys: "title", "description", "tags""#));
    }

    #[tokio::test]
    async fn test_generator_sends_system_prompt() {
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .with(eq(SYSTEM_PROMPT), always())
            .times(1)
            .returning(|_, _| Ok(r#"{"title":"T","description":"D","tags":["t"]}"#.to_string()));

        let topics = vec!["Headline".to_string()];
        let request = SuggestionRequest {
            title: "Title",
            transcript: "transcript",
            trending_topics: &topics,
        };

        let suggestion = SuggestionGenerator::new(&model, 500)
            .generate(&request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(suggestion.tags, vec!["t"]);
    }

    #[tokio::test]
    async fn test_generator_yields_none_for_prose() {
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .returning(|_, _| Ok("I cannot help with that.".to_string()));

        let request = SuggestionRequest {
            title: "Title",
            transcript: "",
            trending_topics: &[],
        };

        let suggestion = SuggestionGenerator::new(&model, 500)
            .generate(&request)
            .await
            .unwrap();
        assert!(suggestion.is_none());
    }

    #[tokio::test]
    async fn test_openai_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"ok\":true}" } }]
            })))
            .mount(&server)
            .await;

        let client = OpenAiChatClient::new(reqwest::Client::new(), server.uri(), "sk-test", "gpt-4");
        let reply = client.complete(SYSTEM_PROMPT, "hello").await.unwrap();
        assert_eq!(reply, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_openai_client_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAiChatClient::new(reqwest::Client::new(), server.uri(), "sk-test", "gpt-4");
        let err = client.complete(SYSTEM_PROMPT, "hello").await.unwrap_err();
        assert!(matches!(err, ReindexError::Api { status: 429, .. }));
    }
}
