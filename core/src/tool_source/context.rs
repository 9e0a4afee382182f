//! Per-call context a [`crate::tools::Tool`] receives alongside its arguments.

use std::sync::Arc;

use uuid::Uuid;

use crate::message::Message;
use crate::sandbox::PathSandbox;
use crate::stream::StreamHandle;

/// Carries the sandbox, recent conversation, and an optional stream sink into
/// a tool call. Tools never reach into global state; everything they need to
/// act on behalf of a run arrives here.
#[derive(Clone)]
pub struct ToolCallContext {
    pub sandbox: Arc<PathSandbox>,
    pub session_id: Uuid,
    /// Recent messages up to and including the assistant turn that requested
    /// this call, oldest first. Used by tools that need conversational
    /// context (e.g. a search tool biasing results toward recent topics).
    pub recent_messages: Vec<Message>,
    /// Emits progress events for this call (e.g. streamed patch diagnostics).
    /// `None` in non-streaming contexts such as unit tests.
    pub stream: Option<StreamHandle>,
    pub user_id: Option<String>,
}

impl ToolCallContext {
    pub fn new(sandbox: Arc<PathSandbox>, session_id: Uuid) -> Self {
        ToolCallContext {
            sandbox,
            session_id,
            recent_messages: Vec::new(),
            stream: None,
            user_id: None,
        }
    }

    pub fn with_recent_messages(mut self, messages: Vec<Message>) -> Self {
        self.recent_messages = messages;
        self
    }

    pub fn with_stream(mut self, stream: StreamHandle) -> Self {
        self.stream = Some(stream);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::AllowlistPolicy;

    #[test]
    fn new_context_has_no_messages_or_stream() {
        let sandbox = Arc::new(PathSandbox::new("/tmp/x", AllowlistPolicy::default()));
        let ctx = ToolCallContext::new(sandbox, Uuid::nil());
        assert!(ctx.recent_messages.is_empty());
        assert!(ctx.stream.is_none());
    }
}
