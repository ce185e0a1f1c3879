//! OpenAI-compatible chat-completions client
//!
//! The factory routes all reviewer calls through an OpenAI-compatible proxy,
//! so Claude and GPT reviewers share one endpoint and one credential. The
//! client performs a single completion per invocation; timeouts and retries
//! are the caller's concern (the evaluator bounds each invocation and never
//! retries).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default proxy endpoint, the Braintrust AI proxy
pub const DEFAULT_BASE_URL: &str = "https://api.braintrust.dev/v1/proxy";

/// Completion token budget for one scoring response
const MAX_COMPLETION_TOKENS: u32 = 2000;

/// Reviewer backend over an OpenAI-compatible `/chat/completions` endpoint
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProxyClient {
    /// Create a client against the default proxy endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Perform one chat completion
    async fn chat(&self, model: &str, system: Option<&str>, user: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(Message {
                role: "system",
                content: system,
            });
        }
        messages.push(Message {
            role: "user",
            content: user,
        });

        let request = ChatRequest {
            model,
            messages,
            temperature: 0.0,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        debug!(model = %model, url = %self.completions_url(), "requesting completion");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!("proxy rejected credentials ({})", status)));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited(body_excerpt(response).await));
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body_excerpt(response).await,
            });
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(Error::EmptyResponse)
    }
}

/// First part of an error body, enough to diagnose without logging payloads
async fn body_excerpt(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    let mut excerpt: String = body.chars().take(300).collect();
    if excerpt.len() < body.len() {
        excerpt.push_str("...");
    }
    excerpt
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl quorum_core::Reviewer for ProxyClient {
    async fn invoke(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        user_prompt: &str,
    ) -> quorum_core::Result<String> {
        self.chat(model, system_prompt, user_prompt)
            .await
            .map_err(|e| quorum_core::Error::Reviewer {
                model: model.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_joins_cleanly() {
        let client = ProxyClient::new("sk-test");
        assert_eq!(
            client.completions_url(),
            "https://api.braintrust.dev/v1/proxy/chat/completions"
        );

        let client = ProxyClient::new("sk-test").with_base_url("http://localhost:4000/v1/");
        assert_eq!(
            client.completions_url(),
            "http://localhost:4000/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_response_deserializes() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "{\"verdict\": \"PASS\"}"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"verdict\": \"PASS\"}")
        );
    }

    #[test]
    fn test_chat_response_without_choices() {
        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn test_request_serializes_messages_in_order() {
        let request = ChatRequest {
            model: "gpt-4o-2024-11-20",
            messages: vec![
                Message {
                    role: "system",
                    content: "context",
                },
                Message {
                    role: "user",
                    content: "score this",
                },
            ],
            temperature: 0.0,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = ProxyClient::new("sk-very-secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
