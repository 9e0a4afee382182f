//! `write_file`: writes or appends text content to a sandboxed path.

use std::io::Write as _;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Writes text content to a sandboxed path, creating parent directories as needed.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"},
                    "append": {"type": "boolean", "default": false},
                },
                "required": ["path", "content"],
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let path = args["path"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'path'".to_string()))?;
        let content = args["content"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'content'".to_string()))?;
        let append = args.get("append").and_then(|v| v.as_bool()).unwrap_or(false);

        let (abs, rel) = ctx.sandbox.resolve(path)?;
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(&abs)
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        file.write_all(content.as_bytes())
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;

        Ok(ToolCallContent::text(format!("wrote {} bytes to {rel}", content.len())))
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
        let sandbox = Arc::new(PathSandbox::new(
            root.to_path_buf(),
            AllowlistPolicy {
                enforce_allowlist: false,
                ..AllowlistPolicy::default()
            },
        ));
        ToolCallContext::new(sandbox, Uuid::nil())
    }

    #[tokio::test]
    async fn writes_new_file_with_parent_dirs() {
        let dir = tempdir().unwrap();
        let tool = WriteFileTool;
        let args = serde_json::json!({"path": "notes/a.txt", "content": "hi"});
        tool.call(args, &ctx(dir.path())).await.unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("notes/a.txt")).unwrap(), "hi");
    }

    #[tokio::test]
    async fn append_extends_existing_content() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one").unwrap();
        let tool = WriteFileTool;
        let args = serde_json::json!({"path": "a.txt", "content": "two", "append": true});
        tool.call(args, &ctx(dir.path())).await.unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "onetwo");
    }

    #[tokio::test]
    async fn overwrite_truncates_existing_content() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "long content here").unwrap();
        let tool = WriteFileTool;
        let args = serde_json::json!({"path": "a.txt", "content": "hi"});
        tool.call(args, &ctx(dir.path())).await.unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hi");
    }
}
