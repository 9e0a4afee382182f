//! The narrow seam through which the run loop persists session state.
//!
//! The core only ever depends on the [`Persistence`] trait group; concrete
//! backends (SQL, object storage) are out of scope. [`FilesystemPersistence`]
//! is a reference implementation following the layout in the external
//! interfaces section, usable directly in tests and small deployments.

mod filesystem;
mod task_set;

pub use filesystem::FilesystemPersistence;
pub use task_set::{DrainReport, PersistenceTaskSet};

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::message::Message;
use crate::state::AgentState;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),
}

/// One structured event captured during a run, per the flat `run_logs` sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunLogEvent {
    RunStarted { step: u32 },
    ApiResponseReceived { step: u32, stop_reason: String },
    ToolExecution { step: u32, tool_use_id: String, name: String, is_error: bool },
    Compaction { step: u32, phases_applied: Vec<String>, tokens_before: usize, tokens_after: usize },
    AwaitingFrontendTools { step: u32, tool_use_ids: Vec<String> },
    FinalSummaryGeneration { step: u32 },
    RunCompleted { step: u32, stop_reason: String },
}

/// Snapshot store: the current `AgentState` per session, written atomically.
#[async_trait]
pub trait AgentConfigStore: Send + Sync {
    async fn save_agent_config(&self, state: &AgentState) -> Result<(), PersistError>;
    async fn load_agent_config(&self, session_id: Uuid) -> Result<Option<AgentState>, PersistError>;
}

/// Append-only log of completed runs per session, numbered monotonically.
#[async_trait]
pub trait ConversationHistoryStore: Send + Sync {
    async fn append_run(&self, session_id: Uuid, messages: &[Message]) -> Result<u32, PersistError>;
}

/// Flat sequence of structured run events, one JSON line per event.
#[async_trait]
pub trait RunLogStore: Send + Sync {
    async fn append_event(&self, session_id: Uuid, run_id: &str, event: &RunLogEvent) -> Result<(), PersistError>;
}

/// Convenience supertrait grouping the three artifact stores, implemented by
/// [`FilesystemPersistence`] and any other single-backend implementation.
pub trait Persistence: AgentConfigStore + ConversationHistoryStore + RunLogStore {}

impl<T: AgentConfigStore + ConversationHistoryStore + RunLogStore> Persistence for T {}
