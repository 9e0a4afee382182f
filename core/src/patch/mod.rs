//! Structured patch parsing, matching, and application.
//!
//! `parser::parse_patch` turns the `*** Begin Patch ... *** End Patch` text
//! envelope into a [`ParsedPatch`]; `matcher::find_hunk` locates each hunk's
//! context unambiguously in a file; `applier::PatchApplier` applies the parsed
//! patch atomically under a [`crate::sandbox::PathSandbox`].

pub mod applier;
pub mod matcher;
pub mod parser;

use std::path::PathBuf;

use thiserror::Error;

pub use applier::{ApplyOptions, ApplyResult, PatchApplier};
pub use matcher::find_hunk;
pub use parser::parse_patch;

/// Error kinds across parsing, matching, and application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("missing *** Begin Patch / *** End Patch sentinel")]
    MissingSentinel,
    #[error("patch body is empty")]
    EmptyPatch,
    #[error("patch contains more than one file operation")]
    MultipleOps,
    #[error("invalid line {line_no}: {text}")]
    InvalidLine { line_no: usize, text: String },
    #[error("update patch has no hunks")]
    NoHunks,
    #[error("invalid move target: {0}")]
    InvalidMoveTarget(String),
    #[error("ambiguous scope signature {signature:?}: {candidates} candidate lines")]
    AmbiguousScope { signature: String, candidates: usize },
    #[error("ambiguous context match ({candidates:?} candidates)")]
    AmbiguousContext { candidates: Vec<usize> },
    #[error("hunk matched before the previous hunk's cursor (out-of-order)")]
    OutOfOrderHunk,
    #[error("no match found for hunk context")]
    NoMatch,
    #[error("target already exists: {0}")]
    TargetExists(PathBuf),
    #[error("target does not exist: {0}")]
    TargetMissing(PathBuf),
    #[error("target is not a regular file: {0}")]
    NotRegularFile(PathBuf),
    #[error("target contains NUL bytes: {0}")]
    ContainsNulBytes(PathBuf),
    #[error("content too large: {actual} bytes exceeds limit of {limit}")]
    TooLarge { limit: usize, actual: usize },
    #[error("sandbox: {0}")]
    Sandbox(#[from] crate::sandbox::SandboxError),
    #[error("io: {0}")]
    Io(String),
    #[error("invalid utf-8 content")]
    InvalidUtf8,
}

/// One file operation parsed from a patch envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchOp {
    Add,
    Update,
    Delete,
}

/// A single hunk within an `Update File` patch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hunk {
    /// Nested `@@` scope signatures, applied in sequence to narrow the search.
    pub scope_lines: Vec<String>,
    /// Context + removed lines, in file order — what must be matched.
    pub old_lines: Vec<String>,
    /// Context + inserted lines, in patch order — what gets written.
    pub new_lines: Vec<String>,
    /// Whether `*** End of File` followed this hunk.
    pub is_eof: bool,
}

impl Hunk {
    pub fn lines_added(&self) -> usize {
        self.new_lines.len().saturating_sub(
            self.old_lines
                .iter()
                .filter(|l| self.new_lines.contains(l))
                .count(),
        )
    }
}

/// The typed result of parsing a patch envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPatch {
    pub op: PatchOp,
    pub path: String,
    pub hunks: Vec<Hunk>,
    /// `Add File` initial content (joined with `\n`).
    pub add_content: Option<String>,
    /// `Move to` target, valid only alongside `Update`.
    pub move_to: Option<String>,
}
