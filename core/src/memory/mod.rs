//! The narrow seam through which an external memory/semantic-recall store
//! observes and, optionally, rewrites a run's working message list.
//!
//! The run loop and compactor only ever see this trait; concrete stores
//! (vector databases, summarizers) live outside this crate and are injected
//! by the host.

use async_trait::async_trait;

use crate::message::Message;

/// Hooks invoked by the [`crate::compress::Compactor`] around compaction and
/// by the run loop at the end of a completed run.
#[async_trait]
pub trait MemoryHook: Send + Sync {
    /// Called with the working list immediately before compaction runs.
    /// Implementations that need to record something (e.g. embeddings for
    /// later recall) should do it here; the list itself is not mutated.
    async fn before_compact(&self, _messages: &[Message]) {}

    /// Called after compaction with the new list, allowed to replace it
    /// entirely (e.g. to splice in a summary message). Returning `None`
    /// leaves the compactor's output unchanged.
    async fn after_compact(&self, _messages: &[Message]) -> Option<Vec<Message>> {
        None
    }

    /// Called once a run finalizes successfully, with the full message list
    /// for the run.
    async fn update(&self, _messages: &[Message]) {}
}

/// A hook that does nothing; the default when no memory store is configured.
pub struct NoopMemoryHook;

#[async_trait]
impl MemoryHook for NoopMemoryHook {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_hook_leaves_messages_unchanged() {
        let hook = NoopMemoryHook;
        let messages = vec![Message::user_text("hi")];
        hook.before_compact(&messages).await;
        assert!(hook.after_compact(&messages).await.is_none());
    }
}
