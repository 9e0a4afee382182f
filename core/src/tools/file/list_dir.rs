//! `list_dir`: an ASCII directory tree, depth-capped and extension-pruned.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::sandbox::PathSandbox;
use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_LARGE_DIR_THRESHOLD: usize = 50;
pub const DEFAULT_SHOW_DIRS: usize = 10;
pub const DEFAULT_SHOW_FILES: usize = 10;

pub struct ListDirTool {
    pub max_depth: usize,
    pub large_dir_threshold: usize,
    pub show_dirs: usize,
    pub show_files: usize,
}

impl Default for ListDirTool {
    fn default() -> Self {
        ListDirTool {
            max_depth: DEFAULT_MAX_DEPTH,
            large_dir_threshold: DEFAULT_LARGE_DIR_THRESHOLD,
            show_dirs: DEFAULT_SHOW_DIRS,
            show_files: DEFAULT_SHOW_FILES,
        }
    }
}

fn is_ignored(rel: &str, ignore_globs: &[String]) -> bool {
    ignore_globs.iter().any(|pat| {
        glob::Pattern::new(pat)
            .map(|p| p.matches(rel))
            .unwrap_or(false)
    })
}

/// Whether `dir` (or any descendant) contains at least one allowed file.
fn has_allowed_file(sandbox: &PathSandbox, dir: &Path, ignore_globs: &[String]) -> bool {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return false,
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let rel = sandbox.to_relative(&path).unwrap_or_default();
        if is_ignored(&rel, ignore_globs) {
            continue;
        }
        if path.is_dir() {
            if has_allowed_file(sandbox, &path, ignore_globs) {
                return true;
            }
        } else if sandbox.policy.is_allowed(&path) {
            return true;
        }
    }
    false
}

struct Listing {
    dirs: Vec<std::path::PathBuf>,
    files: Vec<std::path::PathBuf>,
}

fn list_entries(sandbox: &PathSandbox, dir: &Path, ignore_globs: &[String]) -> Listing {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let rel = sandbox.to_relative(&path).unwrap_or_default();
            if is_ignored(&rel, ignore_globs) {
                continue;
            }
            if path.is_dir() {
                if has_allowed_file(sandbox, &path, ignore_globs) {
                    dirs.push(path);
                }
            } else if sandbox.policy.is_allowed(&path) {
                files.push(path);
            }
        }
    }
    dirs.sort_by_key(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default());
    files.sort_by_key(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default());
    Listing { dirs, files }
}

fn render(sandbox: &PathSandbox, dir: &Path, depth: usize, opts: &ListDirTool, ignore_globs: &[String], out: &mut String, prefix: &str) {
    let listing = list_entries(sandbox, dir, ignore_globs);

    if depth >= opts.max_depth {
        let mut by_ext: BTreeMap<String, usize> = BTreeMap::new();
        for f in &listing.files {
            let ext = f.extension().and_then(|e| e.to_str()).unwrap_or("(none)").to_string();
            *by_ext.entry(ext).or_insert(0) += 1;
        }
        if !listing.files.is_empty() || !listing.dirs.is_empty() {
            let ext_summary: Vec<String> = by_ext.iter().map(|(e, n)| format!("{n} .{e}")).collect();
            out.push_str(&format!(
                "{prefix}[depth limit: {} subdirs, files: {}]\n",
                listing.dirs.len(),
                if ext_summary.is_empty() { "none".to_string() } else { ext_summary.join(", ") }
            ));
        }
        return;
    }

    let dirs_to_show = if listing.dirs.len() > opts.large_dir_threshold { opts.show_dirs } else { listing.dirs.len() };

    for d in listing.dirs.iter().take(dirs_to_show) {
        let name = d.file_name().unwrap_or_default().to_string_lossy();
        out.push_str(&format!("{prefix}{name}/\n"));
        render(sandbox, d, depth + 1, opts, ignore_globs, out, &format!("{prefix}  "));
    }
    if listing.dirs.len() > dirs_to_show {
        out.push_str(&format!("{prefix}... {} more directories\n", listing.dirs.len() - dirs_to_show));
    }

    let files_to_show = if listing.files.len() > opts.large_dir_threshold { opts.show_files } else { listing.files.len() };
    for f in listing.files.iter().take(files_to_show) {
        let name = f.file_name().unwrap_or_default().to_string_lossy();
        out.push_str(&format!("{prefix}{name}\n"));
    }
    if listing.files.len() > files_to_show {
        out.push_str(&format!("{prefix}... {} more files\n", listing.files.len() - files_to_show));
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "list_dir"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Renders an ASCII directory tree of allowlisted files under the sandbox, depth-capped.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "base": {"type": "string", "default": "."},
                    "ignore_globs": {"type": "array", "items": {"type": "string"}, "default": []},
                },
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let base = args.get("base").and_then(|v| v.as_str()).unwrap_or(".");
        let ignore_globs: Vec<String> = args
            .get("ignore_globs")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str().map(|s| s.to_string())).collect())
            .unwrap_or_default();

        let (base_abs, _) = ctx.sandbox.resolve_unchecked(base)?;
        if !base_abs.is_dir() {
            return Err(ToolSourceError::InvalidInput(format!("{base} is not a directory")));
        }

        let mut out = String::new();
        render(&ctx.sandbox, &base_abs, 0, self, &ignore_globs, &mut out, "");
        Ok(ToolCallContent::text(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::AllowlistPolicy;
    use std::sync::Arc;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn ctx(root: &std::path::Path) -> ToolCallContext {
        ToolCallContext::new(Arc::new(PathSandbox::new(root.to_path_buf(), AllowlistPolicy::default())), Uuid::nil())
    }

    #[tokio::test]
    async fn lists_allowed_files_and_prunes_empty_dirs() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/a.md"), "x").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let tool = ListDirTool::default();
        let out = tool.call(serde_json::json!({}), &ctx(dir.path())).await.unwrap();
        match out {
            ToolCallContent::Text(t) => {
                assert!(t.contains("docs/"));
                assert!(t.contains("a.md"));
                assert!(!t.contains("empty"));
            }
            _ => panic!("expected text"),
        }
    }
}
