//! `grep_search`: ripgrep-backed content search over allowlisted files.

use async_trait::async_trait;
use grep_matcher::Matcher;
use grep_regex::RegexMatcher;
use grep_searcher::sinks::UTF8;
use grep_searcher::Searcher;
use ignore::WalkBuilder;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub const DEFAULT_MAX_MATCH_LINES: usize = 20;

pub struct GrepSearchTool {
    pub max_match_lines: usize,
}

impl Default for GrepSearchTool {
    fn default() -> Self {
        GrepSearchTool {
            max_match_lines: DEFAULT_MAX_MATCH_LINES,
        }
    }
}

fn highlight_line(matcher: &RegexMatcher, line: &str) -> Option<String> {
    let mut out = String::new();
    let mut last = 0usize;
    let mut any = false;
    let _ = matcher.find_iter(line.as_bytes(), |m| {
        any = true;
        out.push_str(&line[last..m.start()]);
        out.push_str("<match>");
        out.push_str(&line[m.start()..m.end()]);
        out.push_str("</match>");
        last = m.end();
        true
    });
    if !any {
        return None;
    }
    out.push_str(&line[last..]);
    Some(out)
}

#[async_trait]
impl Tool for GrepSearchTool {
    fn name(&self) -> &str {
        "grep_search"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Searches allowlisted files under the sandbox for a regex pattern, grouped by file with matches highlighted.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string"},
                    "base": {"type": "string", "default": "."},
                },
                "required": ["pattern"],
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let pattern = args["pattern"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'pattern'".to_string()))?;
        let base = args.get("base").and_then(|v| v.as_str()).unwrap_or(".");
        let (base_abs, _) = ctx.sandbox.resolve_unchecked(base)?;

        let matcher = RegexMatcher::new(pattern).map_err(|e| ToolSourceError::InvalidInput(e.to_string()))?;

        let mut out = String::new();
        let mut total_matches = 0usize;
        let mut truncated = false;

        'files: for entry in WalkBuilder::new(&base_abs).hidden(false).build().filter_map(|e| e.ok()) {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if !ctx.sandbox.policy.is_allowed(entry.path()) {
                continue;
            }
            let rel = ctx.sandbox.to_relative(entry.path()).unwrap_or_default();

            let mut file_matches: Vec<(u64, String)> = Vec::new();
            let search_result = Searcher::new().search_path(
                &matcher,
                entry.path(),
                UTF8(|line_num, line| {
                    if let Some(highlighted) = highlight_line(&matcher, line) {
                        file_matches.push((line_num, highlighted));
                    }
                    Ok(true)
                }),
            );
            if search_result.is_err() || file_matches.is_empty() {
                continue;
            }

            out.push_str(&format!("{rel}:\n"));
            for (line_num, text) in &file_matches {
                if total_matches >= self.max_match_lines {
                    truncated = true;
                    break 'files;
                }
                out.push_str(&format!("  {line_num}: {}\n", text.trim_end()));
                total_matches += 1;
            }
        }

        if truncated {
            out.push_str(&format!("[... more matches omitted past {}]\n", self.max_match_lines));
        }
        Ok(ToolCallContent::text(out))
    }
}
