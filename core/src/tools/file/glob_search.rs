//! `glob_search`: recursive extension-allowlisted file search, newest first.

use std::collections::BTreeMap;
use std::time::SystemTime;

use async_trait::async_trait;
use serde_json::Value;
use walkdir::WalkDir;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub const DEFAULT_MAX_RESULTS: usize = 50;

pub struct GlobFileSearchTool {
    pub max_results: usize,
}

impl Default for GlobFileSearchTool {
    fn default() -> Self {
        GlobFileSearchTool {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[async_trait]
impl Tool for GlobFileSearchTool {
    fn name(&self) -> &str {
        "glob_file_search"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Recursively lists allowlisted files under a base directory, most recently modified first.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {"base": {"type": "string", "default": "."}},
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let base = args.get("base").and_then(|v| v.as_str()).unwrap_or(".");
        let (base_abs, _) = ctx.sandbox.resolve_unchecked(base)?;
        if !base_abs.is_dir() {
            return Err(ToolSourceError::InvalidInput(format!("{base} is not a directory")));
        }

        let mut entries: Vec<(String, SystemTime)> = Vec::new();
        for entry in WalkDir::new(&base_abs).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if !ctx.sandbox.policy.is_allowed(entry.path()) {
                continue;
            }
            let rel = ctx.sandbox.to_relative(entry.path()).unwrap_or_default();
            let mtime = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((rel, mtime));
        }

        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase())));

        let total = entries.len();
        let truncated = total > self.max_results;
        let shown: Vec<&str> = entries.iter().take(self.max_results).map(|(p, _)| p.as_str()).collect();

        let mut out = shown.join("\n");
        if truncated {
            let mut by_ext: BTreeMap<String, usize> = BTreeMap::new();
            for (path, _) in entries.iter().skip(self.max_results) {
                let ext = std::path::Path::new(path)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("(none)")
                    .to_string();
                *by_ext.entry(ext).or_insert(0) += 1;
            }
            out.push_str(&format!("\n... {} more files omitted (", total - self.max_results));
            let groups: Vec<String> = by_ext.iter().map(|(ext, n)| format!("{n} .{ext}")).collect();
            out.push_str(&groups.join(", "));
            out.push(')');
        }
        Ok(ToolCallContent::text(out))
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
        ToolCallContext::new(Arc::new(PathSandbox::new(root.to_path_buf(), AllowlistPolicy::default())), Uuid::nil())
    }

    #[tokio::test]
    async fn finds_allowlisted_files_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "x").unwrap();
        std::fs::write(dir.path().join("a.png"), "x").unwrap();
        let tool = GlobFileSearchTool::default();
        let out = tool.call(serde_json::json!({"base": "."}), &ctx(dir.path())).await.unwrap();
        match out {
            ToolCallContent::Text(t) => {
                assert!(t.contains("a.md"));
                assert!(!t.contains("a.png"));
            }
            _ => panic!("expected text"),
        }
    }
}
