//! Scripted [`LlmClient`] for run-loop integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmRequest, LlmResponse};
use crate::message::{ContentBlock, Message, Role};
use crate::run_loop::RunError;

/// Returns a fixed sequence of responses, one per call; the last response
/// repeats once the script is exhausted.
pub struct MockLlm {
    script: Vec<LlmResponse>,
    call_count: AtomicUsize,
}

impl MockLlm {
    pub fn new(script: Vec<LlmResponse>) -> Self {
        MockLlm {
            script,
            call_count: AtomicUsize::new(0),
        }
    }

    /// One-shot: a plain text reply with no tool calls, `end_turn` stop reason.
    pub fn with_text_reply(text: impl Into<String>) -> Self {
        MockLlm::new(vec![LlmResponse {
            message: Message::assistant_text(text),
            stop_reason: "end_turn".to_string(),
            usage: None,
        }])
    }

    /// One-shot: an assistant turn requesting a single tool call.
    pub fn with_tool_call(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        MockLlm::new(vec![LlmResponse {
            message: Message {
                role: Role::Assistant,
                content: vec![ContentBlock::ToolUse {
                    id: id.into(),
                    name: name.into(),
                    input,
                }],
            },
            stop_reason: "tool_use".to_string(),
            usage: None,
        }])
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, _request: &LlmRequest<'_>) -> Result<LlmResponse, RunError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.script.len().saturating_sub(1));
        let response = self.script.get(idx).ok_or_else(|| RunError::Llm("mock script exhausted".to_string()))?;
        Ok(LlmResponse {
            message: response.message.clone(),
            stop_reason: response.stop_reason.clone(),
            usage: response.usage.clone(),
        })
    }
}
