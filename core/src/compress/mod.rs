//! Context compaction: shrinks the working message list once it crosses a
//! token threshold, by applying four progressively more aggressive phases
//! in order and stopping as soon as the estimate drops back under budget.

pub mod config;
pub mod phases;
pub mod tokens;

pub use config::CompactConfig;
pub use tokens::{estimate_message_tokens, estimate_tokens};

use crate::memory::MemoryHook;
use crate::message::Message;

/// Outcome of a single [`Compactor::compact`] call.
#[derive(Clone, Debug)]
pub struct CompactionReport {
    pub tokens_before: usize,
    pub tokens_after: usize,
    pub phases_applied: Vec<&'static str>,
}

pub struct Compactor {
    config: CompactConfig,
}

impl Compactor {
    pub fn new(config: CompactConfig) -> Self {
        Compactor { config }
    }

    pub fn config(&self) -> &CompactConfig {
        &self.config
    }

    /// Whether `messages` currently exceed the configured threshold.
    pub fn needs_compaction(&self, messages: &[Message]) -> bool {
        estimate_tokens(messages) > self.config.threshold_tokens()
    }

    /// Run the four phases in order, stopping as soon as the list is back
    /// under threshold. Calls `hook.before_compact`/`after_compact` around
    /// the work when a memory hook is supplied.
    pub async fn compact(&self, messages: &mut Vec<Message>, hook: Option<&dyn MemoryHook>) -> CompactionReport {
        let tokens_before = estimate_tokens(messages);
        let mut phases_applied = Vec::new();

        if tokens_before <= self.config.threshold_tokens() {
            return CompactionReport {
                tokens_before,
                tokens_after: tokens_before,
                phases_applied,
            };
        }

        if let Some(hook) = hook {
            hook.before_compact(messages).await;
        }

        let threshold = self.config.threshold_tokens();

        if estimate_tokens(messages) > threshold && phases::remove_old_thinking(messages) {
            phases_applied.push("remove_old_thinking");
        }

        if estimate_tokens(messages) > threshold
            && phases::truncate_long_tool_results(messages, self.config.max_result_chars, self.config.keep_recent_turns)
        {
            phases_applied.push("truncate_long_tool_results");
        }

        if estimate_tokens(messages) > threshold
            && phases::placeholder_old_tool_results(messages, self.config.keep_recent_turns)
        {
            phases_applied.push("placeholder_old_tool_results");
        }

        while estimate_tokens(messages) > threshold && phases::slide_window(messages, self.config.keep_recent_turns) {
            if phases_applied.last() != Some(&"slide_window") {
                phases_applied.push("slide_window");
            }
        }

        if let Some(hook) = hook {
            if let Some(replacement) = hook.after_compact(messages).await {
                *messages = replacement;
            }
        }

        CompactionReport {
            tokens_before,
            tokens_after: estimate_tokens(messages),
            phases_applied,
        }
    }
}
