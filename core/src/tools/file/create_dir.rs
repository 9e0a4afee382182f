//! `create_dir`: creates a directory (and parents) under the sandbox.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub struct CreateDirTool;

#[async_trait]
impl Tool for CreateDirTool {
    fn name(&self) -> &str {
        "create_dir"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Creates a directory (and any missing parents) under the sandbox root.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"],
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let path = args["path"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'path'".to_string()))?;
        let (abs, rel) = ctx.sandbox.resolve_unchecked(path)?;
        if abs.exists() && !abs.is_dir() {
            return Err(ToolSourceError::InvalidInput(format!("{rel} exists and is not a directory")));
        }
        std::fs::create_dir_all(&abs).map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(ToolCallContent::text(format!("created directory {rel}")))
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
            Arc::new(PathSandbox::new(root.to_path_buf(), AllowlistPolicy::default())),
            Uuid::nil(),
        )
    }

    #[tokio::test]
    async fn creates_nested_directory() {
        let dir = tempdir().unwrap();
        let tool = CreateDirTool;
        tool.call(serde_json::json!({"path": "a/b/c"}), &ctx(dir.path()))
            .await
            .unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
    }

    #[tokio::test]
    async fn is_noop_if_already_a_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let tool = CreateDirTool;
        assert!(tool
            .call(serde_json::json!({"path": "a"}), &ctx(dir.path()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn errors_if_path_exists_as_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a"), "x").unwrap();
        let tool = CreateDirTool;
        assert!(tool
            .call(serde_json::json!({"path": "a"}), &ctx(dir.path()))
            .await
            .is_err());
    }
}
