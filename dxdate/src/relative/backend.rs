//! Chat-completion backends.
//!
//! Both backends speak the OpenAI chat-completions wire format:
//!
//! ```text
//! POST {base}/chat/completions
//! { "model": ..., "messages": [{role, content}, ...], "temperature": 0, "max_tokens": N }
//!   ──► { "choices": [{ "message": { "content": "..." } }] }
//! ```
//!
//! [`LlamaChat`] targets a local server (llama.cpp, vLLM, ...) hosting a
//! Llama instruct model behind that same API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::RelativeDatesConfig;
use crate::{Error, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const PLACEHOLDER_KEYS: &[&str] = &["your_actual_api_key_here", "your_api_key_here"];

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A blocking chat model: messages in, completion text out.
pub trait ChatBackend: Send + Sync {
    /// Backend identifier for logs.
    fn name(&self) -> &str;

    /// Return the assistant's reply to `messages`.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

fn chat_completion(
    agent: &ureq::Agent,
    base_url: &str,
    api_key: Option<&str>,
    model: &str,
    max_tokens: u32,
    messages: &[ChatMessage],
) -> Result<String> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let mut request = agent.post(&url).set("Content-Type", "application/json");
    if let Some(key) = api_key {
        request = request.set("Authorization", &format!("Bearer {key}"));
    }

    let body = json!({
        "model": model,
        "messages": messages,
        "temperature": 0,
        "max_tokens": max_tokens,
    });
    let response: CompletionResponse = request
        .send_json(body)?
        .into_json()
        .map_err(|e| Error::remote(format!("unreadable response from {url}: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| Error::remote(format!("no choices in response from {url}")))
}

fn agent(timeout_secs: u64) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// OpenAI chat completions.
pub struct OpenAiChat {
    agent: ureq::Agent,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiChat {
    /// Create a client with an explicit key.
    ///
    /// # Errors
    ///
    /// Rejects empty and placeholder keys.
    pub fn new(api_key: impl Into<String>, config: &RelativeDatesConfig) -> Result<Self> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;
        Ok(Self {
            agent: agent(config.timeout_secs),
            api_key,
            model: config.openai_model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Create a client from `OPENAI_API_KEY`, loading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Fails when the variable is unset, empty, or still a placeholder.
    pub fn from_env(config: &RelativeDatesConfig) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        let key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            Error::config("OPENAI_API_KEY not found in .env file or environment variables")
        })?;
        Self::new(key, config)
    }

    /// Model name in use.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Check an API key is usable.
///
/// # Errors
///
/// Returns [`Error::Config`] for empty keys and the placeholder values
/// shipped in example `.env` files.
pub fn validate_api_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::config("OPENAI_API_KEY is empty"));
    }
    if PLACEHOLDER_KEYS.contains(&key) {
        return Err(Error::config(
            "OPENAI_API_KEY is still a placeholder; set your actual key in .env",
        ));
    }
    Ok(())
}

impl ChatBackend for OpenAiChat {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        chat_completion(
            &self.agent,
            OPENAI_BASE_URL,
            Some(&self.api_key),
            &self.model,
            self.max_tokens,
            messages,
        )
    }
}

/// Local Llama instruct model behind an OpenAI-compatible server.
pub struct LlamaChat {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl LlamaChat {
    /// Create a client from config.
    #[must_use]
    pub fn new(config: &RelativeDatesConfig) -> Self {
        Self {
            agent: agent(config.timeout_secs),
            endpoint: config.llama_endpoint.clone(),
            model: config.llama_model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Server base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChatBackend for LlamaChat {
    fn name(&self) -> &str {
        "llama"
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        chat_completion(
            &self.agent,
            &self.endpoint,
            None,
            &self.model,
            self.max_tokens,
            messages,
        )
    }
}

/// Backend returning a fixed reply (or error), recording nothing.
#[derive(Debug, Clone)]
pub struct MockChat {
    reply: std::result::Result<String, String>,
}

impl MockChat {
    /// Always reply with `content`.
    #[must_use]
    pub fn replying(content: impl Into<String>) -> Self {
        Self {
            reply: Ok(content.into()),
        }
    }

    /// Always fail with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

impl ChatBackend for MockChat {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.reply.clone().map_err(Error::remote)
    }
}
