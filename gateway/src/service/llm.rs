use crate::service::error::ProxyError;
use crate::workflow::config::{LlmConfig, LLM_KEY_ENV};
use anyhow::Context;
use log::{debug, error};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// System and user turns of a single-shot completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Something that turns a prompt into the model's reply text.
pub trait ChatBackend: Send + Sync {
    fn complete(
        &self,
        prompt: &ChatPrompt,
    ) -> impl Future<Output = Result<String, ProxyError>> + Send;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [CompletionMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionContent>,
}

#[derive(Debug, Deserialize)]
struct CompletionContent {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

/// OpenAI-compatible chat-completions client.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building LLM http client")?;
        Ok(Self { http, config })
    }
}

impl ChatBackend for LlmClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProxyError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProxyError::Configuration(format!("{LLM_KEY_ENV} is not set")))?;

        let body = CompletionRequest {
            model: &self.config.model,
            messages: [
                CompletionMessage {
                    role: "system",
                    content: &prompt.system,
                },
                CompletionMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProxyError::Upstream(err.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(ProxyError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => return Err(ProxyError::PaymentRequired),
            status if !status.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                error!("AI gateway answered {}: {}", status, detail);
                return Err(ProxyError::Upstream(status.to_string()));
            }
            _ => {}
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|err| ProxyError::Parse(format!("unreadable AI gateway reply: {err}")))?;
        let content = completion
            .into_first_content()
            .ok_or(ProxyError::EmptyResponse)?;
        debug!("AI reply: {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use warp::Filter;

    fn prompt() -> ChatPrompt {
        ChatPrompt {
            system: "system".into(),
            user: "hello".into(),
        }
    }

    fn client_for(addr: SocketAddr, api_key: Option<&str>) -> LlmClient {
        let config = LlmConfig {
            endpoint: format!("http://{addr}/v1/chat/completions"),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        LlmClient::new(config).unwrap()
    }

    #[test]
    fn first_choice_content_is_extracted() {
        let completion: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hi"}},{"message":{"content":"other"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion.into_first_content().as_deref(), Some("hi"));

        let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.into_first_content(), None);
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let client = LlmClient::new(LlmConfig::default()).unwrap();
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ProxyError::Configuration(_)));
    }

    #[tokio::test]
    async fn rate_limit_and_payment_statuses_are_mapped() {
        let limited = warp::any().map(|| {
            warp::reply::with_status("slow down", warp::http::StatusCode::TOO_MANY_REQUESTS)
        });
        let (addr, server) = warp::serve(limited).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = client_for(addr, Some("key"));
        assert!(matches!(
            client.complete(&prompt()).await,
            Err(ProxyError::RateLimited)
        ));

        let unpaid = warp::any().map(|| {
            warp::reply::with_status("pay up", warp::http::StatusCode::PAYMENT_REQUIRED)
        });
        let (addr, server) = warp::serve(unpaid).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = client_for(addr, Some("key"));
        assert!(matches!(
            client.complete(&prompt()).await,
            Err(ProxyError::PaymentRequired)
        ));
    }

    #[tokio::test]
    async fn successful_reply_returns_content() {
        let ok = warp::post()
            .and(warp::header::<String>("authorization"))
            .map(|auth: String| {
                assert_eq!(auth, "Bearer key");
                warp::reply::json(&serde_json::json!({
                    "choices": [{"message": {"content": "{\"action\":\"message\",\"message\":\"hi\"}"}}]
                }))
            });
        let (addr, server) = warp::serve(ok).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = client_for(addr, Some("key"));
        let content = client.complete(&prompt()).await.unwrap();
        assert!(content.contains("\"action\""));
    }

    #[tokio::test]
    async fn empty_choices_are_an_empty_response() {
        let empty = warp::any().map(|| warp::reply::json(&serde_json::json!({"choices": []})));
        let (addr, server) = warp::serve(empty).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = client_for(addr, Some("key"));
        assert!(matches!(
            client.complete(&prompt()).await,
            Err(ProxyError::EmptyResponse)
        ));
    }
}
