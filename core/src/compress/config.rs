//! Tunable thresholds for the compactor's four phases.

/// Default context window assumed when a provider doesn't report one.
pub const DEFAULT_CONTEXT_WINDOW: usize = 200_000;
/// Compaction triggers once estimated tokens exceed this fraction of the window.
pub const DEFAULT_THRESHOLD_RATIO: f32 = 0.8;
pub const DEFAULT_MAX_RESULT_CHARS: usize = 2000;
pub const DEFAULT_KEEP_RECENT_TURNS: usize = 10;

#[derive(Clone, Debug)]
pub struct CompactConfig {
    pub context_window: usize,
    pub threshold_ratio: f32,
    pub max_result_chars: usize,
    pub keep_recent_turns: usize,
}

impl Default for CompactConfig {
    fn default() -> Self {
        CompactConfig {
            context_window: DEFAULT_CONTEXT_WINDOW,
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            max_result_chars: DEFAULT_MAX_RESULT_CHARS,
            keep_recent_turns: DEFAULT_KEEP_RECENT_TURNS,
        }
    }
}

impl CompactConfig {
    pub fn threshold_tokens(&self) -> usize {
        (self.context_window as f32 * self.threshold_ratio) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_tokens_applies_ratio() {
        let config = CompactConfig {
            context_window: 1000,
            threshold_ratio: 0.5,
            ..CompactConfig::default()
        };
        assert_eq!(config.threshold_tokens(), 500);
    }
}
