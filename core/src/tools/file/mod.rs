//! Sandboxed filesystem tools: read-side (`ReadFile`, `GlobFileSearch`,
//! `GrepSearch`, `ListDir`) and direct-mutation (`WriteFile`, `CreateDir`,
//! `DeleteFile`, `MoveFile`, `ApplyPatch`).

pub mod apply_patch;
pub mod create_dir;
pub mod delete_file;
pub mod glob_search;
pub mod grep_search;
pub mod list_dir;
pub mod move_file;
pub mod read_file;
pub mod write_file;

pub use apply_patch::ApplyPatchTool;
pub use create_dir::CreateDirTool;
pub use delete_file::DeleteFileTool;
pub use glob_search::GlobFileSearchTool;
pub use grep_search::GrepSearchTool;
pub use list_dir::ListDirTool;
pub use move_file::MoveFileTool;
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;
