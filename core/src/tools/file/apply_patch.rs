//! `apply_patch`: parses and applies a structured text patch.

use async_trait::async_trait;
use serde_json::Value;

use crate::patch::{check_patch_size, parse_patch, ApplyOptions, PatchApplier};
use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

pub struct ApplyPatchTool {
    pub options: ApplyOptions,
}

impl Default for ApplyPatchTool {
    fn default() -> Self {
        ApplyPatchTool {
            options: ApplyOptions::default(),
        }
    }
}

#[async_trait]
impl Tool for ApplyPatchTool {
    fn name(&self) -> &str {
        "apply_patch"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: "Applies a *** Begin Patch ... *** End Patch structured text patch to sandboxed files.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "patch": {"type": "string"},
                    "dry_run": {"type": "boolean", "default": false},
                },
                "required": ["patch"],
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
        let patch_text = args["patch"]
            .as_str()
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'patch'".to_string()))?;
        let dry_run = args.get("dry_run").and_then(|v| v.as_bool()).unwrap_or(self.options.dry_run);

        let mut options = self.options.clone();
        options.dry_run = dry_run;

        check_patch_size(patch_text, &options)?;
        let parsed = parse_patch(patch_text, true)?;

        let applier = PatchApplier::new(&ctx.sandbox);
        let result = applier.apply(&parsed, &options)?;

        let summary = match &result.moved_to {
            Some(dest) => format!(
                "{:?} {} -> {} (+{} -{}, fuzz={})",
                result.op, result.path, dest, result.lines_added, result.lines_removed, result.max_fuzz
            ),
            None => format!(
                "{:?} {} (+{} -{}, fuzz={})",
                result.op, result.path, result.lines_added, result.lines_removed, result.max_fuzz
            ),
        };
        Ok(ToolCallContent::text(summary))
    }
}
