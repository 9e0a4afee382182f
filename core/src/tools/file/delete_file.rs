//! `delete_file`: removes a single regular file under the sandbox.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub struct DeleteFileTool;

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Removes a single regular file under the sandbox root.".to_string(),
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
        let (abs, rel) = ctx.sandbox.resolve(path)?;
        if !abs.exists() {
            return Err(ToolSourceError::NotFound(rel));
        }
        if !abs.is_file() {
            return Err(ToolSourceError::InvalidInput(format!("{rel} is not a regular file")));
        }
        std::fs::remove_file(&abs).map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(ToolCallContent::text(format!("deleted {rel}")))
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
    async fn deletes_existing_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        let tool = DeleteFileTool;
        tool.call(serde_json::json!({"path": "a.txt"}), &ctx(dir.path()))
            .await
            .unwrap();
        assert!(!dir.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn errors_on_missing_file() {
        let dir = tempdir().unwrap();
        let tool = DeleteFileTool;
        assert!(tool
            .call(serde_json::json!({"path": "missing.txt"}), &ctx(dir.path()))
            .await
            .is_err());
    }
}
