//! Tool invocation types shared by every [`crate::tools::Tool`] implementation.

pub mod context;

pub use context::ToolCallContext;

use serde_json::Value;
use thiserror::Error;

use crate::message::ContentBlock;
use crate::patch::PatchError;
use crate::sandbox::SandboxError;

/// Error kinds a tool call can fail with.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("sandbox: {0}")]
    Sandbox(#[from] SandboxError),
    #[error("patch: {0}")]
    Patch(#[from] PatchError),
    #[error("transport: {0}")]
    Transport(String),
}

/// JSON-schema-backed description of a tool, sent to the LLM provider.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the call's `input`.
    pub parameters: Value,
}

/// Whether a tool runs on the backend (executed by the run loop directly)
/// or the frontend (surfaced to the host, which must resume the run with a
/// result once it has one).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Backend,
    Frontend,
}

/// The payload a successful tool call resolves to; wrapped into a
/// `tool_result` content block by the run loop.
#[derive(Clone, Debug)]
pub enum ToolCallContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl ToolCallContent {
    pub fn text(s: impl Into<String>) -> Self {
        ToolCallContent::Text(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_displays_message() {
        let err = ToolSourceError::InvalidInput("bad path".to_string());
        assert_eq!(err.to_string(), "invalid input: bad path");
    }

    #[test]
    fn sandbox_error_converts_via_from() {
        let sandbox_err = SandboxError::InvalidPath("x".to_string());
        let err: ToolSourceError = sandbox_err.into();
        assert!(matches!(err, ToolSourceError::Sandbox(_)));
    }
}
