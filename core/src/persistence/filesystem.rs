//! Filesystem reference implementation of the persistence traits.
//!
//! Layout:
//! ```text
//! <root>/agent_config/<uuid>.json
//! <root>/conversation_history/<uuid>/<NNN>.json
//! <root>/conversation_history/<uuid>/index.json
//! <root>/agent_runs/<uuid>/<run_id>.jsonl
//! ```
//! Every write goes through a temp file in the same directory followed by an
//! atomic rename, the same discipline [`crate::patch::applier`] uses for
//! file-tool writes.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;
use crate::persistence::{AgentConfigStore, ConversationHistoryStore, PersistError, RunLogEvent, RunLogStore};
use crate::state::AgentState;

pub struct FilesystemPersistence {
    root: PathBuf,
}

impl FilesystemPersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemPersistence { root: root.into() }
    }

    fn agent_config_path(&self, session_id: Uuid) -> PathBuf {
        self.root.join("agent_config").join(format!("{session_id}.json"))
    }

    fn history_dir(&self, session_id: Uuid) -> PathBuf {
        self.root.join("conversation_history").join(session_id.to_string())
    }

    fn runs_dir(&self, session_id: Uuid) -> PathBuf {
        self.root.join("agent_runs").join(session_id.to_string())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ConversationIndex {
    last_sequence: u32,
    total: u32,
    updated_at: Option<DateTime<Utc>>,
}

fn atomic_write(dest: &Path, content: &[u8]) -> Result<(), PersistError> {
    let dir = dest.parent().ok_or_else(|| PersistError::InvalidPath(dest.to_path_buf()))?;
    fs::create_dir_all(dir)?;
    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PersistError::InvalidPath(dest.to_path_buf()))?;
    let tmp = dir.join(format!(".{file_name}.tmp-{}", std::process::id()));
    fs::write(&tmp, content)?;
    fs::rename(&tmp, dest)?;
    Ok(())
}

#[async_trait]
impl AgentConfigStore for FilesystemPersistence {
    async fn save_agent_config(&self, state: &AgentState) -> Result<(), PersistError> {
        let path = self.agent_config_path(state.session_id);
        let body = serde_json::to_vec_pretty(state)?;
        atomic_write(&path, &body)
    }

    async fn load_agent_config(&self, session_id: Uuid) -> Result<Option<AgentState>, PersistError> {
        let path = self.agent_config_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let body = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}

#[async_trait]
impl ConversationHistoryStore for FilesystemPersistence {
    async fn append_run(&self, session_id: Uuid, messages: &[Message]) -> Result<u32, PersistError> {
        let dir = self.history_dir(session_id);
        let index_path = dir.join("index.json");
        let mut index: ConversationIndex = if index_path.exists() {
            serde_json::from_slice(&fs::read(&index_path)?)?
        } else {
            ConversationIndex::default()
        };

        let sequence = index.last_sequence + 1;
        let run_path = dir.join(format!("{sequence:03}.json"));
        atomic_write(&run_path, &serde_json::to_vec_pretty(messages)?)?;

        index.last_sequence = sequence;
        index.total += 1;
        index.updated_at = Some(Utc::now());
        atomic_write(&index_path, &serde_json::to_vec_pretty(&index)?)?;

        Ok(sequence)
    }
}

#[async_trait]
impl RunLogStore for FilesystemPersistence {
    async fn append_event(&self, session_id: Uuid, run_id: &str, event: &RunLogEvent) -> Result<(), PersistError> {
        let path = self.runs_dir(session_id).join(format!("{run_id}.jsonl"));
        let mut existing = if path.exists() { String::from_utf8_lossy(&fs::read(&path)?).into_owned() } else { String::new() };
        existing.push_str(&serde_json::to_string(event)?);
        existing.push('\n');
        atomic_write(&path, existing.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn round_trips_agent_config() {
        let dir = tempdir().unwrap();
        let store = FilesystemPersistence::new(dir.path());
        let session_id = Uuid::new_v4();
        let state = AgentState::new(session_id, Utc::now());
        store.save_agent_config(&state).await.unwrap();
        let loaded = store.load_agent_config(session_id).await.unwrap().unwrap();
        assert_eq!(loaded.session_id, session_id);
    }

    #[tokio::test]
    async fn load_missing_session_returns_none() {
        let dir = tempdir().unwrap();
        let store = FilesystemPersistence::new(dir.path());
        assert!(store.load_agent_config(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn append_run_numbers_sequences_monotonically() {
        let dir = tempdir().unwrap();
        let store = FilesystemPersistence::new(dir.path());
        let session_id = Uuid::new_v4();
        let seq1 = store.append_run(session_id, &[Message::user_text("hi")]).await.unwrap();
        let seq2 = store.append_run(session_id, &[Message::assistant_text("hello")]).await.unwrap();
        assert_eq!(seq1, 1);
        assert_eq!(seq2, 2);
        let index_path = dir.path().join("conversation_history").join(session_id.to_string()).join("index.json");
        let index: ConversationIndex = serde_json::from_slice(&fs::read(index_path).unwrap()).unwrap();
        assert_eq!(index.total, 2);
    }

    #[tokio::test]
    async fn append_event_accumulates_jsonl_lines() {
        let dir = tempdir().unwrap();
        let store = FilesystemPersistence::new(dir.path());
        let session_id = Uuid::new_v4();
        store.append_event(session_id, "run-1", &RunLogEvent::RunStarted { step: 0 }).await.unwrap();
        store
            .append_event(session_id, "run-1", &RunLogEvent::RunCompleted { step: 1, stop_reason: "end_turn".to_string() })
            .await
            .unwrap();
        let path = dir.path().join("agent_runs").join(session_id.to_string()).join("run-1.jsonl");
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
