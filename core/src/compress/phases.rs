//! The four progressive compaction phases, applied in order until the
//! estimated token count drops under threshold.

use crate::message::{ContentBlock, Message, Role, ToolResultContent};

const TRUNCATION_SUFFIX: &str = "...[truncated]";
const PLACEHOLDER: &str = "[tool result omitted for context length]";

fn is_tool_result_turn(m: &Message) -> bool {
    m.role == Role::User
        && m.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolResult { .. }))
}

/// Indices (into `messages`) of user turns carrying at least one tool_result,
/// oldest first.
fn tool_result_turn_indices(messages: &[Message]) -> Vec<usize> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| is_tool_result_turn(m))
        .map(|(i, _)| i)
        .collect()
}

/// Phase 1: drop thinking blocks from every assistant message except the
/// last one. Returns whether anything changed.
pub fn remove_old_thinking(messages: &mut [Message]) -> bool {
    let last_assistant = messages.iter().rposition(|m| m.role == Role::Assistant);
    let Some(last_assistant) = last_assistant else {
        return false;
    };
    let mut changed = false;
    for (i, m) in messages.iter_mut().enumerate() {
        if i == last_assistant || m.role != Role::Assistant {
            continue;
        }
        let before = m.content.len();
        m.content.retain(|b| !matches!(b, ContentBlock::Thinking { .. }));
        if m.content.len() != before {
            changed = true;
        }
    }
    changed
}

fn truncate_text(text: &mut String, max_chars: usize) -> bool {
    if text.chars().count() <= max_chars {
        return false;
    }
    let truncated: String = text.chars().take(max_chars).collect();
    *text = format!("{truncated}{TRUNCATION_SUFFIX}");
    true
}

/// Phase 2: truncate long tool results beyond `max_result_chars`, skipping
/// the most recent `keep_recent_turns` tool-result-bearing turns.
pub fn truncate_long_tool_results(messages: &mut [Message], max_result_chars: usize, keep_recent_turns: usize) -> bool {
    let turn_indices = tool_result_turn_indices(messages);
    if turn_indices.len() <= keep_recent_turns {
        return false;
    }
    let cutoff = turn_indices.len() - keep_recent_turns;
    let eligible: Vec<usize> = turn_indices[..cutoff].to_vec();

    let mut changed = false;
    for &idx in &eligible {
        for block in &mut messages[idx].content {
            if let ContentBlock::ToolResult { content, .. } = block {
                match content {
                    ToolResultContent::Text(s) => {
                        changed |= truncate_text(s, max_result_chars);
                    }
                    ToolResultContent::Blocks(blocks) => {
                        for b in blocks {
                            if let ContentBlock::Text { text } = b {
                                changed |= truncate_text(text, max_result_chars);
                            }
                        }
                    }
                }
            }
        }
    }
    changed
}

/// Phase 3: replace tool_result content with a placeholder, preserving
/// `tool_use_id`, for turns older than the most recent `keep_recent_turns`.
pub fn placeholder_old_tool_results(messages: &mut [Message], keep_recent_turns: usize) -> bool {
    let turn_indices = tool_result_turn_indices(messages);
    if turn_indices.len() <= keep_recent_turns {
        return false;
    }
    let cutoff = turn_indices.len() - keep_recent_turns;
    let eligible: Vec<usize> = turn_indices[..cutoff].to_vec();

    let mut changed = false;
    for &idx in &eligible {
        for block in &mut messages[idx].content {
            if let ContentBlock::ToolResult { content, .. } = block {
                let is_placeholder = matches!(content, ToolResultContent::Text(s) if s == PLACEHOLDER);
                if !is_placeholder {
                    *content = ToolResultContent::Text(PLACEHOLDER.to_string());
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Phase 4: drop the oldest assistant/user pairs while preserving the first
/// user message and at least `2 * keep_recent_turns` messages.
pub fn slide_window(messages: &mut Vec<Message>, keep_recent_turns: usize) -> bool {
    let floor = 2 * keep_recent_turns;
    if messages.len() <= floor.max(1) {
        return false;
    }
    let first_user = messages.iter().position(|m| m.role == Role::User);
    let Some(first_user) = first_user else {
        return false;
    };

    let mut changed = false;
    // Drop the oldest pair after the first user message, one pair per call,
    // repeated until we hit the floor or have nothing safe left to drop.
    while messages.len() > floor.max(first_user + 1) {
        let drop_at = first_user + 1;
        if drop_at + 1 >= messages.len() {
            break;
        }
        messages.drain(drop_at..drop_at + 2);
        changed = true;
    }
    changed
}
