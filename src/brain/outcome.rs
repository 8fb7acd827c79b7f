//! Model invocation adapter.
//!
//! Turns a provider call into a [`ModelOutcome`] so that a failed request is an
//! ordinary value the conversation can show to the user, not an error that
//! escapes to the transport.

use std::time::Instant;

use uuid::Uuid;

use super::provider::{LLMRequest, Provider};

/// Prefix of the chat text shown when the model call fails.
pub const FAILURE_PREFIX: &str = "Ошибка при запросе к DeepSeek";

/// Result of asking the model one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    Answer(String),
    Failure { reason: String },
}

impl ModelOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ModelOutcome::Failure { .. })
    }

    /// Text to deliver to the chat.
    pub fn into_message(self) -> String {
        match self {
            ModelOutcome::Answer(text) => text,
            ModelOutcome::Failure { reason } => render_failure(&reason),
        }
    }
}

/// User-facing diagnostic for a failed model call.
pub fn render_failure(reason: &str) -> String {
    format!("{FAILURE_PREFIX}: {reason}")
}

/// Send `prompt` as a single user message and wait for the answer.
///
/// Never returns an error; every provider failure becomes
/// [`ModelOutcome::Failure`] carrying the error's description.
pub async fn ask(provider: &dyn Provider, prompt: &str) -> ModelOutcome {
    let request_id = Uuid::new_v4();
    let started = Instant::now();
    tracing::info!(%request_id, prompt_chars = prompt.chars().count(), "Asking model");

    match provider.complete(LLMRequest::user(prompt)).await {
        Ok(response) => {
            let usage = response.usage.unwrap_or_default();
            tracing::info!(
                %request_id,
                model = %response.model,
                answer_chars = response.content.chars().count(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Model answered"
            );
            ModelOutcome::Answer(response.content)
        }
        Err(e) => {
            tracing::warn!(
                %request_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                timed_out = e.is_timeout(),
                error = %e,
                "Model request failed"
            );
            ModelOutcome::Failure {
                reason: e.to_string(),
            }
        }
    }
}
