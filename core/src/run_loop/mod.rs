//! The run loop: the `Idle -> Initializing -> Looping -> (Suspended |
//! Finalizing) -> Idle` state machine that drives one multi-step agent turn.
//!
//! Each step compacts the working history, asks the provider for a
//! completion, executes any backend tool calls it requested (bounded
//! concurrency, original order preserved), and either suspends for frontend
//! tools or loops again with the combined `tool_result` turn. A run ends
//! either because the model stopped requesting tools or because the step
//! budget was exhausted.

mod error;
mod options;

pub use error::RunError;
pub use options::RunLoopConfig;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::compress::Compactor;
use crate::llm::{LlmClient, LlmRequest, ToolChoiceMode};
use crate::memory::MemoryHook;
use crate::message::{ContentBlock, Message, Role, ToolResultContent};
use crate::sandbox::PathSandbox;
use crate::state::{AgentState, PendingFrontendTool};
use crate::stream::{StreamEvent, StreamHandle};
use crate::tool_source::{ToolCallContent, ToolCallContext, ToolKind, ToolSourceError};
use crate::tools::{Tool, ToolRegistry};

/// Outcome of a completed or suspended run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub stop_reason: String,
    pub total_steps: u32,
    /// The assistant's final text, present unless the run suspended.
    pub final_answer: Option<String>,
}

/// One frontend tool's result, supplied to [`RunLoop::continue_with_tool_results`].
#[derive(Clone, Debug)]
pub struct FrontendToolResult {
    pub tool_use_id: String,
    pub content: String,
    pub is_error: bool,
}

struct PendingCall {
    id: String,
    name: String,
    input: serde_json::Value,
    tool: Arc<dyn Tool>,
}

enum StepResult {
    Continue,
    Suspended,
    Done(Message),
}

pub struct RunLoop {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    sandbox: Arc<PathSandbox>,
    config: RunLoopConfig,
    memory_hook: Option<Arc<dyn MemoryHook>>,
}

impl RunLoop {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>, sandbox: Arc<PathSandbox>, config: RunLoopConfig) -> Self {
        RunLoop {
            llm,
            tools,
            sandbox,
            config,
            memory_hook: None,
        }
    }

    pub fn with_memory_hook(mut self, hook: Arc<dyn MemoryHook>) -> Self {
        self.memory_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &RunLoopConfig {
        &self.config
    }

    /// Starts a fresh run with a new user prompt.
    pub async fn run(&self, state: &mut AgentState, user_prompt: &str, stream: Option<StreamHandle>) -> Result<RunOutcome, RunError> {
        state.conversation_history.clear();
        state.total_runs += 1;

        let user_message = Message::user_text(user_prompt);
        state.messages.push(user_message.clone());
        state.conversation_history.push(user_message);

        if let Some(tx) = &stream {
            let _ = tx.send(StreamEvent::MetaInit {
                session_id: state.session_id.to_string(),
                user_query: user_prompt.to_string(),
                model: self.config.model_label.clone(),
            });
        }

        self.drive(state, stream).await
    }

    /// Resumes a run suspended on `awaiting_frontend_tools`, supplying the
    /// host-executed results for every pending frontend tool call.
    pub async fn continue_with_tool_results(
        &self,
        state: &mut AgentState,
        results: Vec<FrontendToolResult>,
        stream: Option<StreamHandle>,
    ) -> Result<RunOutcome, RunError> {
        let expected: BTreeSet<String> = state.pending_frontend_tools.iter().map(|t| t.tool_use_id.clone()).collect();
        let got: BTreeSet<String> = results.iter().map(|r| r.tool_use_id.clone()).collect();
        if expected != got {
            return Err(RunError::ResumeMismatch {
                expected: expected.into_iter().collect(),
                got: got.into_iter().collect(),
            });
        }

        let mut by_id: HashMap<String, FrontendToolResult> = results.into_iter().map(|r| (r.tool_use_id.clone(), r)).collect();

        let mut blocks: Vec<ContentBlock> = Vec::new();
        for backend_message in state.pending_backend_results.drain(..) {
            blocks.extend(backend_message.content);
        }
        for pending in &state.pending_frontend_tools {
            if let Some(result) = by_id.remove(&pending.tool_use_id) {
                blocks.push(ContentBlock::ToolResult {
                    tool_use_id: pending.tool_use_id.clone(),
                    content: ToolResultContent::Text(result.content),
                    is_error: if result.is_error { Some(true) } else { None },
                });
            }
        }
        state.clear_pause_state();

        let combined = Message { role: Role::User, content: blocks };
        state.messages.push(combined.clone());
        state.conversation_history.push(combined);

        self.drive(state, stream).await
    }

    async fn drive(&self, state: &mut AgentState, stream: Option<StreamHandle>) -> Result<RunOutcome, RunError> {
        let compactor = Compactor::new(self.config.compact.clone());

        loop {
            if state.current_step >= self.config.max_steps {
                return self.finalize_max_steps(state, stream.as_ref()).await;
            }

            match self.step(state, &compactor, stream.as_ref()).await? {
                StepResult::Continue => continue,
                StepResult::Suspended => {
                    if let Some(tx) = &stream {
                        let _ = tx.send(StreamEvent::MetaFinal {
                            stop_reason: "awaiting_frontend_tools".to_string(),
                            total_steps: state.current_step,
                        });
                    }
                    state.updated_at = Utc::now();
                    return Ok(RunOutcome {
                        stop_reason: "awaiting_frontend_tools".to_string(),
                        total_steps: state.current_step,
                        final_answer: None,
                    });
                }
                StepResult::Done(message) => {
                    if let Some(hook) = &self.memory_hook {
                        hook.update(&state.conversation_history).await;
                    }
                    if let Some(tx) = &stream {
                        let _ = tx.send(StreamEvent::MetaFinal {
                            stop_reason: "end_turn".to_string(),
                            total_steps: state.current_step,
                        });
                    }
                    state.updated_at = Utc::now();
                    state.last_run_at = Some(Utc::now());
                    return Ok(RunOutcome {
                        stop_reason: "end_turn".to_string(),
                        total_steps: state.current_step,
                        final_answer: Some(message.text_content()),
                    });
                }
            }
        }
    }

    /// One compact -> invoke -> (execute | suspend) cycle.
    async fn step(&self, state: &mut AgentState, compactor: &Compactor, stream: Option<&StreamHandle>) -> Result<StepResult, RunError> {
        compactor.compact(&mut state.messages, self.memory_hook.as_deref()).await;

        let specs = self.tools.specs();
        let request = LlmRequest {
            system_prompt: self.config.system_prompt.as_deref(),
            messages: &state.messages,
            tools: &specs,
            tool_choice: ToolChoiceMode::Auto,
        };
        let response = self.llm.invoke_stream(&request, stream).await?;

        state.messages.push(response.message.clone());
        state.conversation_history.push(response.message.clone());
        state.current_step += 1;
        if let Some(usage) = &response.usage {
            state.last_known_input_tokens = usage.prompt_tokens;
            state.last_known_output_tokens = usage.completion_tokens;
        }

        if !response.message.has_tool_use() {
            return Ok(StepResult::Done(response.message));
        }

        let mut backend_calls: Vec<PendingCall> = Vec::new();
        let mut frontend_calls: Vec<PendingFrontendTool> = Vec::new();
        for block in response.message.tool_uses() {
            if let ContentBlock::ToolUse { id, name, input } = block {
                match self.tools.kind_of(name) {
                    Some(ToolKind::Backend) => {
                        let tool = self.tools.get(name).expect("kind_of confirmed presence");
                        backend_calls.push(PendingCall {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                            tool,
                        });
                    }
                    Some(ToolKind::Frontend) => {
                        frontend_calls.push(PendingFrontendTool {
                            tool_use_id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });
                    }
                    None => return Err(RunError::ToolRegistryMissing(name.clone())),
                }
            }
        }

        let mut ctx = ToolCallContext::new(self.sandbox.clone(), state.session_id).with_recent_messages(state.messages.clone());
        if let Some(tx) = stream {
            ctx = ctx.with_stream(tx.clone());
        }
        let max_parallel = self.config.max_parallel_tool_calls.max(1);

        let mut executed: Vec<(usize, String, ContentBlock)> = stream::iter(backend_calls.into_iter().enumerate())
            .map(|(idx, call)| {
                let ctx = ctx.clone();
                async move {
                    let result = call.tool.call(call.input, &ctx).await;
                    (idx, call.name, tool_result_block(&call.id, result))
                }
            })
            .buffer_unordered(max_parallel)
            .collect()
            .await;
        executed.sort_by_key(|(idx, _, _)| *idx);

        if let Some(tx) = stream {
            for (_, name, block) in &executed {
                if let ContentBlock::ToolResult { tool_use_id, content, is_error } = block {
                    let _ = tx.send(StreamEvent::ContentBlockToolResult {
                        id: tool_use_id.clone(),
                        name: name.clone(),
                        content: tool_result_text(content),
                        is_error: is_error.unwrap_or(false),
                    });
                }
            }
        }

        let backend_blocks: Vec<ContentBlock> = executed.into_iter().map(|(_, _, block)| block).collect();

        if !frontend_calls.is_empty() {
            state.awaiting_frontend_tools = true;
            state.pending_backend_results = backend_blocks
                .into_iter()
                .map(|block| Message { role: Role::User, content: vec![block] })
                .collect();
            state.pending_frontend_tools = frontend_calls;

            if let Some(tx) = stream {
                let _ = tx.send(StreamEvent::AwaitingFrontendTools {
                    tool_use_ids: state.pending_frontend_tools.iter().map(|t| t.tool_use_id.clone()).collect(),
                });
            }
            return Ok(StepResult::Suspended);
        }

        let combined = Message { role: Role::User, content: backend_blocks };
        state.messages.push(combined.clone());
        state.conversation_history.push(combined);
        Ok(StepResult::Continue)
    }

    /// Forces a final, tool-less completion once the step budget is spent.
    async fn finalize_max_steps(&self, state: &mut AgentState, stream: Option<&StreamHandle>) -> Result<RunOutcome, RunError> {
        let request = LlmRequest {
            system_prompt: self.config.system_prompt.as_deref(),
            messages: &state.messages,
            tools: &[],
            tool_choice: ToolChoiceMode::None,
        };
        let response = self.llm.invoke_stream(&request, stream).await?;
        if response.message.has_tool_use() {
            return Err(RunError::MaxStepsExceeded);
        }

        state.messages.push(response.message.clone());
        state.conversation_history.push(response.message.clone());
        state.updated_at = Utc::now();
        state.last_run_at = Some(Utc::now());

        if let Some(tx) = stream {
            let _ = tx.send(StreamEvent::MetaFinal {
                stop_reason: "max_steps".to_string(),
                total_steps: state.current_step,
            });
        }

        Ok(RunOutcome {
            stop_reason: "max_steps".to_string(),
            total_steps: state.current_step,
            final_answer: Some(response.message.text_content()),
        })
    }
}

fn tool_result_block(tool_use_id: &str, result: Result<ToolCallContent, ToolSourceError>) -> ContentBlock {
    match result {
        Ok(ToolCallContent::Text(text)) => ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: ToolResultContent::Text(text),
            is_error: None,
        },
        Ok(ToolCallContent::Blocks(blocks)) => ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: ToolResultContent::Blocks(blocks),
            is_error: None,
        },
        Err(e) => ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: ToolResultContent::Text(e.to_string()),
            is_error: Some(true),
        },
    }
}

fn tool_result_text(content: &ToolResultContent) -> String {
    match content {
        ToolResultContent::Text(s) => s.clone(),
        ToolResultContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(""),
    }
}
