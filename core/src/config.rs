//! Environment/file-based overrides for the handful of values worth tuning
//! outside of code: sandbox root, model token budget, and max steps.
//!
//! Loading goes through the `config` crate's `load_and_apply` (XDG
//! `config.toml` + project `.env` + process env, existing env wins), then
//! this module reads the resulting environment into a [`RunLoopConfig`] and
//! sandbox root path.

use std::path::PathBuf;

use crate::compress::CompactConfig;
use crate::run_loop::RunLoopConfig;

const APP_NAME: &str = "agent-core";

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Loads XDG/`.env`/process-env configuration and applies it to the process
/// environment, then builds a [`RunLoopConfig`] from the resulting values.
/// Call once at host startup, before constructing a `RunLoop`.
pub fn load_run_loop_config(override_dir: Option<&std::path::Path>) -> RunLoopConfig {
    let _ = env_config::load_and_apply(APP_NAME, override_dir);

    let defaults = RunLoopConfig::default();
    RunLoopConfig {
        system_prompt: std::env::var("AGENT_SYSTEM_PROMPT").ok(),
        max_parallel_tool_calls: env_usize("AGENT_MAX_PARALLEL_TOOL_CALLS", defaults.max_parallel_tool_calls),
        max_steps: env_u32("AGENT_MAX_STEPS", defaults.max_steps),
        model_label: std::env::var("AGENT_MODEL_LABEL").unwrap_or(defaults.model_label),
        compact: CompactConfig {
            context_window: env_usize("AGENT_CONTEXT_WINDOW", defaults.compact.context_window),
            threshold_ratio: env_f32("AGENT_COMPACT_THRESHOLD_RATIO", defaults.compact.threshold_ratio),
            max_result_chars: env_usize("AGENT_MAX_RESULT_CHARS", defaults.compact.max_result_chars),
            keep_recent_turns: env_usize("AGENT_KEEP_RECENT_TURNS", defaults.compact.keep_recent_turns),
        },
    }
}

/// Sandbox root override, falling back to `default_root` when unset.
pub fn load_sandbox_root(default_root: impl Into<PathBuf>) -> PathBuf {
    std::env::var("AGENT_SANDBOX_ROOT").map(PathBuf::from).unwrap_or_else(|_| default_root.into())
}
