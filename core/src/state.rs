//! Persisted per-session agent state: working messages, file registry, token
//! counters, and the pause state a suspended run resumes from.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::message::Message;

/// One entry in a session's file registry: metadata about a file the model
/// has seen (via a tool result or an uploaded attachment), keyed by file id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRegistryEntry {
    pub filename: String,
    pub first_seen_step: u32,
    pub last_seen_step: u32,
    #[serde(default)]
    pub storage_backend: Option<String>,
}

/// A tool call the assistant requested that is still awaiting a frontend
/// (browser-executed) result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingFrontendTool {
    pub tool_use_id: String,
    pub name: String,
    pub input: Value,
}

/// Persisted state for one agent session, keyed by `session_id`.
///
/// Created on first run; updated and persisted at the end of every run and
/// before every suspension for frontend tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentState {
    pub session_id: Uuid,

    /// Compacted conversation used as the next LLM input.
    pub messages: Vec<Message>,
    /// Uncompacted record of the current run, reset at the start of each run.
    pub conversation_history: Vec<Message>,

    /// Opaque provider session handle (e.g. a hosted "container" or thread id).
    #[serde(default)]
    pub container_id: Option<String>,

    pub file_registry: HashMap<String, FileRegistryEntry>,

    pub last_known_input_tokens: u32,
    pub last_known_output_tokens: u32,

    /// True while suspended awaiting `continue_with_tool_results`.
    pub awaiting_frontend_tools: bool,
    pub pending_frontend_tools: Vec<PendingFrontendTool>,
    pub pending_backend_results: Vec<Message>,
    pub current_step: u32,

    pub total_runs: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

impl AgentState {
    /// A fresh, empty session created on first run.
    pub fn new(session_id: Uuid, now: DateTime<Utc>) -> Self {
        AgentState {
            session_id,
            messages: Vec::new(),
            conversation_history: Vec::new(),
            container_id: None,
            file_registry: HashMap::new(),
            last_known_input_tokens: 0,
            last_known_output_tokens: 0,
            awaiting_frontend_tools: false,
            pending_frontend_tools: Vec::new(),
            pending_backend_results: Vec::new(),
            current_step: 0,
            total_runs: 0,
            created_at: now,
            updated_at: now,
            last_run_at: None,
            title: None,
        }
    }

    /// Clears pause state after a successful resume; the caller is
    /// responsible for re-entering the loop at `current_step`.
    pub fn clear_pause_state(&mut self) {
        self.awaiting_frontend_tools = false;
        self.pending_frontend_tools.clear();
        self.pending_backend_results.clear();
    }

    pub fn upsert_file(&mut self, file_id: impl Into<String>, filename: impl Into<String>, step: u32) {
        let entry = self.file_registry.entry(file_id.into()).or_insert_with(|| FileRegistryEntry {
            filename: filename.into(),
            first_seen_step: step,
            last_seen_step: step,
            storage_backend: None,
        });
        entry.last_seen_step = step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_pause_state() {
        let state = AgentState::new(Uuid::nil(), Utc::now());
        assert!(!state.awaiting_frontend_tools);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.total_runs, 0);
    }

    #[test]
    fn upsert_file_tracks_first_and_last_seen_step() {
        let mut state = AgentState::new(Uuid::nil(), Utc::now());
        state.upsert_file("f1", "notes.md", 1);
        state.upsert_file("f1", "notes.md", 3);
        let entry = &state.file_registry["f1"];
        assert_eq!(entry.first_seen_step, 1);
        assert_eq!(entry.last_seen_step, 3);
    }

    #[test]
    fn clear_pause_state_resets_frontend_fields() {
        let mut state = AgentState::new(Uuid::nil(), Utc::now());
        state.awaiting_frontend_tools = true;
        state.pending_frontend_tools.push(PendingFrontendTool {
            tool_use_id: "t1".to_string(),
            name: "browser_click".to_string(),
            input: serde_json::json!({}),
        });
        state.clear_pause_state();
        assert!(!state.awaiting_frontend_tools);
        assert!(state.pending_frontend_tools.is_empty());
    }
}
