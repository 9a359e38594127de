use navmapcore::command::MapCommand;
use navmapcore::markers::model::Marker;
use navmapcore::news::{NewsQuery, NewsReport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const GATEWAY_URL_ENV: &str = "NAVMAP_GATEWAY_URL";
const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:9000";

pub fn gateway_url() -> String {
    std::env::var(GATEWAY_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string())
}

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    message: &'a str,
    markers: &'a [Marker],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub async fn send_chat(
    base: String,
    message: String,
    markers: Vec<Marker>,
) -> Result<MapCommand, String> {
    let payload = ChatPayload {
        message: &message,
        markers: &markers,
    };
    post_json(format!("{base}/map-ai-chat"), &payload).await
}

pub async fn search_news(base: String, query: NewsQuery) -> Result<NewsReport, String> {
    post_json(format!("{base}/search-news-events"), &query).await
}

async fn post_json<B, T>(url: String, body: &B) -> Result<T, String>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .json(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(|e| e.to_string())
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(error_message(status.as_u16(), &text))
    }
}

/// Human-readable failure for a non-success gateway reply.
pub fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|body| body.error)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        429 => format!("Rate limited: {detail}"),
        402 => format!("Credits required: {detail}"),
        _ => format!("{status}: {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_bodies_are_unwrapped() {
        assert_eq!(
            error_message(429, r#"{"error":"rate limit exceeded, try again later"}"#),
            "Rate limited: rate limit exceeded, try again later"
        );
        assert_eq!(error_message(500, "boom"), "500: boom");
    }
}
