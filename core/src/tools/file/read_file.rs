//! `read_file`: a header line plus a clamped slice of a sandboxed file.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub const DEFAULT_MAX_LINES: usize = 100;
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 2 << 20;

pub struct ReadFileTool {
    pub max_lines: usize,
    pub streaming_threshold: u64,
}

impl Default for ReadFileTool {
    fn default() -> Self {
        ReadFileTool {
            max_lines: DEFAULT_MAX_LINES,
            streaming_threshold: DEFAULT_STREAMING_THRESHOLD,
        }
    }
}

/// Builds the `[lines X-Y of TOTAL in <path>]` header followed by the slice.
pub fn render_slice(rel_path: &str, all_lines: &[String], offset: usize, limit: usize) -> String {
    let total = all_lines.len();
    if total == 0 {
        return format!("[lines 0-0 of 0 in {rel_path}]\n");
    }
    let start = offset.clamp(1, total);
    if limit == 0 {
        return format!("[lines 0-0 of {total} in {rel_path}]\n");
    }
    let end = (start + limit - 1).min(total);
    let mut out = format!("[lines {start}-{end} of {total} in {rel_path}]\n");
    out.push_str(&all_lines[start - 1..end].join("\n"));
    if end >= start {
        out.push('\n');
    }
    out
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Reads a slice of a sandboxed text file, with a header reporting the range and total line count.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "target": {"type": "string"},
                    "offset": {"type": "integer", "default": 1},
                    "limit": {"type": "integer", "default": DEFAULT_MAX_LINES},
                },
                "required": ["target"],
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let target = args["target"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'target'".to_string()))?;
        let offset = args.get("offset").and_then(|v| v.as_i64()).unwrap_or(1);
        let limit_raw = args.get("limit").and_then(|v| v.as_i64()).unwrap_or(self.max_lines as i64);
        if limit_raw < 0 {
            return Err(ToolSourceError::InvalidInput("'limit' must not be negative".to_string()));
        }
        let offset = offset.max(1) as usize;
        let limit = (limit_raw as usize).min(self.max_lines);

        let (abs, rel) = ctx.sandbox.resolve(target)?;
        if !abs.is_file() {
            return Err(ToolSourceError::NotFound(rel));
        }

        let metadata = tokio::fs::metadata(&abs)
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        let bytes = tokio::fs::read(&abs)
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        let _ = metadata.len().min(self.streaming_threshold); // streaming vs. whole-file read is an I/O detail; content is identical either way
        let text = String::from_utf8_lossy(&bytes).replace("\r\n", "\n").replace('\r', "\n");
        let all_lines: Vec<String> = if text.is_empty() {
            vec![]
        } else {
            text.split('\n').map(|s| s.to_string()).collect()
        };

        if !all_lines.is_empty() && offset > all_lines.len() {
            return Err(ToolSourceError::InvalidInput(format!(
                "offset {offset} exceeds total lines {}",
                all_lines.len()
            )));
        }

        Ok(ToolCallContent::text(render_slice(&rel, &all_lines, offset, limit)))
    }
}
