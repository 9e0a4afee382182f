//! `move_file`: renames/moves a file within the sandbox.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub struct MoveFileTool;

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &str {
        "move_file"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Renames or moves a file within the sandbox, refusing to overwrite an existing destination.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "from": {"type": "string"},
                    "to": {"type": "string"},
                },
                "required": ["from", "to"],
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let from = args["from"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'from'".to_string()))?;
        let to = args["to"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'to'".to_string()))?;

        let (from_abs, from_rel) = ctx.sandbox.resolve(from)?;
        let (to_abs, to_rel) = ctx.sandbox.resolve(to)?;

        if !from_abs.exists() {
            return Err(ToolSourceError::NotFound(from_rel));
        }
        if !from_abs.is_file() {
            return Err(ToolSourceError::InvalidInput(format!("{from_rel} is not a regular file")));
        }
        if to_abs.exists() {
            return Err(ToolSourceError::InvalidInput(format!("{to_rel} already exists")));
        }
        if let Some(parent) = to_abs.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        }
        std::fs::rename(&from_abs, &to_abs).map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(ToolCallContent::text(format!("moved {from_rel} to {to_rel}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{AllowlistPolicy, PathSandbox};
    use std::sync::Arc;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn ctx(root: &std::path::Path) -> ToolCallContext {
        ToolCallContext::new(
            Arc::new(PathSandbox::new(
                root.to_path_buf(),
                AllowlistPolicy {
                    enforce_allowlist: false,
                    ..AllowlistPolicy::default()
                },
            )),
            Uuid::nil(),
        )
    }

    #[tokio::test]
    async fn moves_file_to_new_path() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        let tool = MoveFileTool;
        tool.call(serde_json::json!({"from": "a.txt", "to": "b.txt"}), &ctx(dir.path()))
            .await
            .unwrap();
        assert!(!dir.path().join("a.txt").exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("b.txt")).unwrap(), "x");
    }

    #[tokio::test]
    async fn refuses_to_overwrite_existing_destination() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::write(dir.path().join("b.txt"), "y").unwrap();
        let tool = MoveFileTool;
        assert!(tool
            .call(serde_json::json!({"from": "a.txt", "to": "b.txt"}), &ctx(dir.path()))
            .await
            .is_err());
    }
}
