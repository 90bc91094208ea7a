//! Minimal client for an OpenAI-compatible chat-completions API. One request
//! per call, no retries; provider failures carry the underlying message.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key provided and no default key configured")]
    MissingKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat-completions client. The base URL, model, and default credential are
/// injected at construction; nothing here reads the environment.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    default_key: Option<String>,
}

impl LlmClient {
    pub fn new(base_url: String, model: String, default_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model,
            default_key,
        }
    }

    /// Effective credential: explicit request key, else the configured
    /// default.
    fn resolve_key<'a>(&'a self, request_key: Option<&'a str>) -> Result<&'a str, LlmError> {
        request_key
            .filter(|k| !k.trim().is_empty())
            .or(self.default_key.as_deref())
            .ok_or(LlmError::MissingKey)
    }

    /// Issues one chat-completions call and returns the assistant text.
    pub async fn chat(
        &self,
        api_key: Option<&str>,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let key = self.resolve_key(api_key)?;
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                temperature,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        first_choice_content(body)
    }

    /// Probes the models listing to check that a credential is accepted.
    pub async fn validate_key(&self, api_key: Option<&str>) -> Result<(), LlmError> {
        let key = self.resolve_key(api_key)?;
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

fn first_choice_content(body: ChatResponse) -> Result<String, LlmError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::MalformedResponse("response contained no choices".to_string()))
}

async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    if message.is_empty() {
        LlmError::Api(format!("HTTP {status}"))
    } else {
        LlmError::Api(format!("HTTP {status}: {message}"))
    }
}
