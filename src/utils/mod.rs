use anyhow::Result;
use url::Url;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Join a configured base URL and an API path without doubling the slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// First `max_chars` characters of `text`, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Truncated text with a trailing ellipsis when anything was cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let truncated = truncate_chars(text, max_chars);
    if truncated.len() < text.len() {
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

/// Split an operator-edited tag list on commas.
///
/// Surrounding whitespace is trimmed and empty entries are dropped.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tags for display or editing
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Shorten an error body for messages and logs
pub fn excerpt(body: &str) -> String {
    preview(body.trim(), 200)
}

/// Turn a non-2xx response into `ReindexError::Api`
pub async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> crate::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} responded with {}: {}", service, status, body);

    Err(crate::ReindexError::Api {
        service,
        status: status.as_u16(),
        body: excerpt(&body),
    })
}
