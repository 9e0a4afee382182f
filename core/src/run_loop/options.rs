//! Tunables for one [`crate::run_loop::RunLoop`].

use crate::compress::CompactConfig;

pub const DEFAULT_MAX_PARALLEL_TOOL_CALLS: usize = 5;
pub const DEFAULT_MAX_STEPS: u32 = 50;

#[derive(Clone)]
pub struct RunLoopConfig {
    /// System prompt sent with every completion request.
    pub system_prompt: Option<String>,
    /// Upper bound on concurrently executing backend tool calls within one step.
    pub max_parallel_tool_calls: usize,
    /// Hard ceiling on assistant turns before the loop forces a final, tool-less call.
    pub max_steps: u32,
    /// Model identifier surfaced in the `meta_init` stream event only.
    pub model_label: String,
    pub compact: CompactConfig,
}

impl Default for RunLoopConfig {
    fn default() -> Self {
        RunLoopConfig {
            system_prompt: None,
            max_parallel_tool_calls: DEFAULT_MAX_PARALLEL_TOOL_CALLS,
            max_steps: DEFAULT_MAX_STEPS,
            model_label: "default".to_string(),
            compact: CompactConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let config = RunLoopConfig::default();
        assert_eq!(config.max_parallel_tool_calls, 5);
        assert_eq!(config.max_steps, 50);
        assert!(config.system_prompt.is_none());
    }
}
