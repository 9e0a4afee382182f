//! The [`Tool`] trait every callable tool implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolKind, ToolSourceError, ToolSpec};

/// A callable tool exposed to the LLM provider and invoked by the run loop.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use agent_core::tool_source::{ToolCallContent, ToolCallContext, ToolKind, ToolSourceError, ToolSpec};
/// use agent_core::tools::Tool;
/// use serde_json::Value;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn kind(&self) -> ToolKind {
///         ToolKind::Backend
///     }
///
///     fn spec(&self) -> ToolSpec {
///         ToolSpec {
///             name: self.name().to_string(),
///             description: "Echoes its input back.".to_string(),
///             parameters: serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}}),
///         }
///     }
///
///     async fn call(&self, args: Value, _ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
///         let text = args["text"].as_str().unwrap_or_default().to_string();
///         Ok(ToolCallContent::text(text))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used in `tool_use` blocks and provider tool specs.
    fn name(&self) -> &str;

    /// Whether the run loop executes this tool directly (`Backend`) or must
    /// suspend and wait on the host (`Frontend`).
    fn kind(&self) -> ToolKind {
        ToolKind::Backend
    }

    /// JSON-schema-backed description sent to the LLM provider.
    fn spec(&self) -> ToolSpec;

    /// Executes the call. Backend tools run this directly; frontend tools
    /// never have `call` invoked by the run loop (their result arrives via
    /// `continue_with_tool_results` instead) but may still implement it for
    /// host-side reuse.
    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError>;
}
