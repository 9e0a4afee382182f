//! Canonical message and content-block types shared by the run loop, the
//! compactor, and the stream formatter.
//!
//! A message has a `role` and a sequence of typed `ContentBlock`s. Providers
//! see their own wire schema; the core only ever manipulates this shape.

use serde::{Deserialize, Serialize};

/// Message role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One typed content block within a message.
///
/// `tool_result` blocks only ever appear inside a `Role::User` message;
/// `thinking` blocks only ever appear inside a `Role::Assistant` message. The
/// run loop and compactor both rely on these placement invariants rather than
/// re-deriving them from role at every call site.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// Reasoning block. Providers that support extended thinking require the
    /// most recent assistant turn to retain this block; see `compress::phases`.
    Thinking {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: ToolResultContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    Image {
        src: String,
        media_type: String,
    },
    Document {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
}

/// Content of a `tool_result` block: either a plain string or a list of
/// text blocks (for tools that return multiple chunks, e.g. image + caption).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl ToolResultContent {
    /// Approximate character length, used by the compactor's token heuristic.
    pub fn char_len(&self) -> usize {
        match self {
            ToolResultContent::Text(s) => s.chars().count(),
            ToolResultContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { text } => text.chars().count(),
                    _ => 0,
                })
                .sum(),
        }
    }
}

/// A canonical message: a role plus an ordered sequence of content blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn system_text(text: impl Into<String>) -> Self {
        // The runtime treats the system prompt as a distinguished user-role
        // message carried outside `messages` (see RunLoopConfig::system_prompt);
        // this constructor exists for callers that build one-off messages.
        Message {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Message {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: ToolResultContent::Text(content.into()),
                is_error: if is_error { Some(true) } else { None },
            }],
        }
    }

    /// All `tool_use` blocks in this message, in order.
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
            .collect()
    }

    /// Whether this message carries any `tool_use` blocks.
    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// The thinking block, if any (assistant messages only, by construction).
    pub fn thinking(&self) -> Option<&ContentBlock> {
        self.content
            .iter()
            .find(|b| matches!(b, ContentBlock::Thinking { .. }))
    }

    /// Concatenated text of all `text` blocks, used for the final answer and
    /// for the `chars/4` token estimate.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Rough size in characters of the whole message, used by the token
    /// estimator (`chars / 4`).
    pub fn approx_char_len(&self) -> usize {
        self.content
            .iter()
            .map(|b| match b {
                ContentBlock::Text { text } => text.chars().count(),
                ContentBlock::Thinking { text, .. } => text.chars().count(),
                ContentBlock::ToolUse { input, .. } => input.to_string().chars().count(),
                ContentBlock::ToolResult { content, .. } => content.char_len(),
                ContentBlock::Image { src, .. } | ContentBlock::Document { src, .. } => {
                    src.chars().count()
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_text_has_single_text_block() {
        let m = Message::user_text("hi");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.text_content(), "hi");
    }

    #[test]
    fn has_tool_use_detects_tool_use_block() {
        let m = Message {
            role: Role::Assistant,
            content: vec![ContentBlock::ToolUse {
                id: "t1".to_string(),
                name: "read_file".to_string(),
                input: serde_json::json!({"path": "a.txt"}),
            }],
        };
        assert!(m.has_tool_use());
        assert_eq!(m.tool_uses().len(), 1);
    }

    #[test]
    fn tool_result_content_char_len_counts_text_blocks_only() {
        let content = ToolResultContent::Blocks(vec![
            ContentBlock::Text {
                text: "abcd".to_string(),
            },
            ContentBlock::Image {
                src: "x".to_string(),
                media_type: "image/png".to_string(),
            },
        ]);
        assert_eq!(content.char_len(), 4);
    }

    #[test]
    fn thinking_only_found_on_assistant_message() {
        let m = Message {
            role: Role::Assistant,
            content: vec![ContentBlock::Thinking {
                text: "reasoning".to_string(),
                signature: None,
            }],
        };
        assert!(m.thinking().is_some());
    }
}
