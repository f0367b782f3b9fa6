//! Relative-date resolution through a chat model.
//!
//! "seen last week" in a note written on 2025-05-14 refers to a date the
//! entity extractor cannot see. When enabled, the note text (truncated to
//! the context window) and its reference timestamp go to a
//! [`ChatBackend`], and the returned absolute dates are appended to the
//! document's date mentions.
//!
//! Every external failure is contained: [`RelativeDateResolver::resolve`]
//! reports it as [`Resolution::Failed`], and [`resolve_relative_dates`]
//! logs it and returns an empty list.

mod backend;
mod prompt;

use chrono::NaiveDateTime;

use dxdate_core::DateMention;

use crate::config::{RelativeBackend, RelativeDatesConfig};
use crate::offset::truncate_chars;
use crate::Result;

pub use backend::{validate_api_key, ChatBackend, ChatMessage, LlamaChat, MockChat, OpenAiChat};
pub use prompt::{parse_response, user_prompt, SYSTEM_PROMPT};

/// Outcome of one resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// At least one relative date was resolved.
    Found(Vec<DateMention>),
    /// The model answered, but no usable relative date was in it.
    Empty,
    /// The request or the response parsing failed.
    Failed(String),
}

impl Resolution {
    /// Mentions, or nothing for `Empty` / `Failed`.
    #[must_use]
    pub fn into_mentions(self) -> Vec<DateMention> {
        match self {
            Resolution::Found(m) => m,
            Resolution::Empty | Resolution::Failed(_) => Vec::new(),
        }
    }
}

/// Resolves relative temporal phrases against a reference timestamp.
pub struct RelativeDateResolver<B: ChatBackend> {
    backend: B,
    context_window: usize,
}

impl<B: ChatBackend> RelativeDateResolver<B> {
    /// Create a resolver sending at most `context_window` characters.
    #[must_use]
    pub fn new(backend: B, context_window: usize) -> Self {
        Self {
            backend,
            context_window,
        }
    }

    /// Backend in use.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ask the model for relative dates in `text`.
    pub fn resolve(&self, text: &str, reference: &NaiveDateTime) -> Resolution {
        if text.trim().is_empty() {
            return Resolution::Empty;
        }
        let text = truncate_chars(text, self.context_window);
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt(text, reference)),
        ];

        let reply = match self.backend.complete(&messages) {
            Ok(reply) => reply,
            Err(e) => return Resolution::Failed(e.to_string()),
        };
        match parse_response(&reply) {
            Ok(m) if m.is_empty() => Resolution::Empty,
            Ok(m) => Resolution::Found(m),
            Err(e) => Resolution::Failed(e.to_string()),
        }
    }
}

/// Resolve relative dates, flattening failures to an empty list.
///
/// Failures are logged at `warn` with the backend name.
pub fn resolve_relative_dates<B: ChatBackend + ?Sized>(
    text: &str,
    reference: &NaiveDateTime,
    config: &RelativeDatesConfig,
    backend: &B,
) -> Vec<DateMention> {
    let resolver = RelativeDateResolver::new(BorrowedBackend(backend), config.context_window);
    match resolver.resolve(text, reference) {
        Resolution::Failed(msg) => {
            log::warn!("Relative date extraction via {} failed: {}", backend.name(), msg);
            Vec::new()
        }
        other => other.into_mentions(),
    }
}

struct BorrowedBackend<'a, B: ChatBackend + ?Sized>(&'a B);

impl<B: ChatBackend + ?Sized> ChatBackend for BorrowedBackend<'_, B> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.0.complete(messages)
    }
}

impl ChatBackend for Box<dyn ChatBackend> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).complete(messages)
    }
}

/// Build the backend selected in config.
///
/// # Errors
///
/// Fails for OpenAI when no usable API key is available.
pub fn backend_from_config(config: &RelativeDatesConfig) -> Result<Box<dyn ChatBackend>> {
    Ok(match config.backend {
        RelativeBackend::Openai => Box::new(OpenAiChat::from_env(config)?),
        RelativeBackend::Llama => Box::new(LlamaChat::new(config)),
    })
}

/// Build the configured backend, or `None` with a warning when it cannot be
/// built (for example, missing credentials).
///
/// Without a backend the run proceeds and relative dates contribute nothing.
#[must_use]
pub fn optional_backend(config: &RelativeDatesConfig) -> Option<Box<dyn ChatBackend>> {
    match backend_from_config(config) {
        Ok(backend) => Some(backend),
        Err(e) => {
            log::warn!("Relative date extraction disabled for this run: {}", e);
            None
        }
    }
}
