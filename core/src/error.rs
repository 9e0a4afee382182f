//! Top-level error type for the agent runtime.
//!
//! Every public fallible entry point returns `Result<_, AgentError>`. Subsystem
//! errors (`SandboxError`, `PatchError`, `ToolSourceError`, `RunError`,
//! `PersistError`) convert in via `#[from]`.

use thiserror::Error;

use crate::patch::PatchError;
use crate::persistence::PersistError;
use crate::run_loop::RunError;
use crate::sandbox::SandboxError;
use crate::tool_source::ToolSourceError;

/// Top-level error for the agent runtime.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("sandbox: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("patch: {0}")]
    Patch(#[from] PatchError),

    #[error("tool: {0}")]
    Tool(#[from] ToolSourceError),

    #[error("run loop: {0}")]
    Run(#[from] RunError),

    #[error("persistence: {0}")]
    Persist(#[from] PersistError),

    #[error("llm transport: {0}")]
    Llm(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_error_converts_via_from() {
        let e: AgentError = SandboxError::InvalidPath("..".to_string()).into();
        assert!(e.to_string().contains("sandbox"));
    }

    #[test]
    fn llm_error_display() {
        let e = AgentError::Llm("rate limited".to_string());
        assert!(e.to_string().contains("rate limited"));
    }
}
