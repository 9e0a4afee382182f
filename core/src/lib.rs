//! # agent-core
//!
//! A provider-agnostic runtime for multi-step, tool-using LLM conversations.
//! One [`run_loop::RunLoop`] drives the whole turn: compact the working
//! history, ask the provider for a completion, dispatch any backend tool
//! calls it requested, and either suspend for frontend tools or loop again.
//!
//! ## Main modules
//!
//! - [`run_loop`]: [`run_loop::RunLoop`], [`run_loop::RunLoopConfig`], [`run_loop::RunError`] — the step state machine.
//! - [`config`]: [`config::load_run_loop_config`], [`config::load_sandbox_root`] — env/XDG overrides for the handful of tunables worth changing outside of code.
//! - [`llm`]: [`llm::LlmClient`] trait, [`llm::LlmRequest`], [`llm::LlmResponse`], [`llm::MockLlm`].
//! - [`message`]: [`message::Message`], [`message::ContentBlock`], [`message::Role`] — the canonical data model.
//! - [`state`]: [`state::AgentState`] — persisted per-session state, including pause state for frontend tools.
//! - [`compress`]: [`compress::Compactor`] and its four phases — context compaction.
//! - [`sandbox`]: [`sandbox::PathSandbox`], [`sandbox::AllowlistPolicy`] — confines file tools to a session root.
//! - [`patch`]: [`patch::parse_patch`], [`patch::find_hunk`], [`patch::PatchApplier`] — whitespace-fuzzy patch application.
//! - [`tools`]: [`tools::Tool`] trait, [`tools::ToolRegistry`], built-in sandboxed filesystem tools.
//! - [`tool_source`]: [`tool_source::ToolSourceError`], [`tool_source::ToolCallContext`], [`tool_source::ToolSpec`].
//! - [`memory`]: [`memory::MemoryHook`] — the narrow seam an external semantic-recall store plugs into.
//! - [`persistence`]: [`persistence::Persistence`] trait group, [`persistence::FilesystemPersistence`].
//! - [`stream`]: [`stream::StreamEvent`], [`stream::StreamHandle`] — the live XML event stream.
//! - [`error`]: [`error::AgentError`], the top-level error every public entry point returns.

pub mod compress;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod message;
pub mod patch;
pub mod persistence;
pub mod run_loop;
pub mod sandbox;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use config::{load_run_loop_config, load_sandbox_root};
pub use error::AgentError;
pub use llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage, MockLlm, ToolChoiceMode};
pub use memory::{MemoryHook, NoopMemoryHook};
pub use message::{ContentBlock, Message, Role, ToolResultContent};
pub use patch::{parse_patch, ApplyOptions, ApplyResult, Hunk, ParsedPatch, PatchApplier, PatchError, PatchOp};
pub use persistence::{FilesystemPersistence, Persistence, PersistError, RunLogEvent};
pub use run_loop::{FrontendToolResult, RunError, RunLoop, RunLoopConfig, RunOutcome};
pub use sandbox::{AllowlistPolicy, PathSandbox, SandboxError};
pub use state::AgentState;
pub use stream::{format_event, StreamEvent, StreamHandle};
pub use tool_source::{ToolCallContent, ToolCallContext, ToolKind, ToolSourceError, ToolSpec};
pub use tools::{Tool, ToolRegistry};

/// Initializes tracing from `RUST_LOG` so that unit tests across `src/**` can
/// print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
