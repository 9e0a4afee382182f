use thiserror::Error;

/// Errors that abort a run outright rather than being surfaced to the model
/// as a `tool_result`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("llm: {0}")]
    Llm(String),
    #[error("tool registry is missing tool: {0}")]
    ToolRegistryMissing(String),
    #[error("resume mismatch: expected {expected:?}, got {got:?}")]
    ResumeMismatch { expected: Vec<String>, got: Vec<String> },
    #[error("persistence: {0}")]
    Persistence(String),
    #[error("maximum steps exceeded")]
    MaxStepsExceeded,
}
