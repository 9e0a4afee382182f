//! Provider-agnostic LLM client abstraction.
//!
//! The run loop only ever talks to this trait; concrete provider SDKs
//! (OpenAI, Anthropic, ...) are out of scope for this crate and are plugged
//! in by the host. [`MockLlm`] gives run-loop integration tests a scripted,
//! deterministic stand-in.

mod mock;

pub use mock::MockLlm;

use async_trait::async_trait;

use crate::message::{ContentBlock, Message};
use crate::run_loop::RunError;
use crate::stream::StreamHandle;
use crate::tool_source::ToolSpec;

/// Tool choice mode for a chat completion request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model may choose between a text reply or tool calls.
    #[default]
    Auto,
    /// Model must not call any tool.
    None,
    /// Model must call at least one tool.
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!("unknown tool_choice: {s} (use auto, none, or required)")),
        }
    }
}

/// One request to the provider: system prompt, canonical history, and the
/// merged backend + frontend tool schemas available this turn.
pub struct LlmRequest<'a> {
    pub system_prompt: Option<&'a str>,
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
    pub tool_choice: ToolChoiceMode,
}

/// Token usage for one completion.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of one completion: the assistant turn in canonical form (may carry
/// `tool_use` blocks), the provider's stop reason, and usage if reported.
pub struct LlmResponse {
    pub message: Message,
    pub stop_reason: String,
    pub usage: Option<LlmUsage>,
}

/// Delta for one tool call emitted incrementally during streaming.
#[derive(Clone, Debug)]
pub struct ToolCallDelta {
    pub call_id: Option<String>,
    pub name: Option<String>,
    pub arguments_delta: String,
}

/// Provider-agnostic chat completion client.
///
/// `invoke_stream` defaults to calling `invoke` and emitting the resulting
/// text as a single `content-block-text` event; a streaming-capable provider
/// overrides it to emit events as tokens arrive.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, request: &LlmRequest<'_>) -> Result<LlmResponse, RunError>;

    async fn invoke_stream(
        &self,
        request: &LlmRequest<'_>,
        stream: Option<&StreamHandle>,
    ) -> Result<LlmResponse, RunError> {
        let response = self.invoke(request).await?;
        if let Some(stream) = stream {
            for block in &response.message.content {
                let event = match block {
                    ContentBlock::Text { text } => Some(crate::stream::StreamEvent::ContentBlockText { text: text.clone() }),
                    ContentBlock::Thinking { text, .. } => {
                        Some(crate::stream::StreamEvent::ContentBlockThinking { text: text.clone() })
                    }
                    ContentBlock::ToolUse { id, name, input } => Some(crate::stream::StreamEvent::ContentBlockToolCall {
                        id: id.clone(),
                        name: name.clone(),
                        arguments: input.clone(),
                    }),
                    _ => None,
                };
                if let Some(event) = event {
                    let _ = stream.send(event);
                }
            }
        }
        Ok(response)
    }
}
