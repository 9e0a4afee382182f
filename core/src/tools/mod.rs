//! Built-in sandboxed filesystem tools and the [`Tool`] trait they implement.

pub mod file;
pub mod registry;
#[allow(clippy::module_inception)]
#[path = "trait.rs"]
pub mod r#trait;

pub use registry::ToolRegistry;
pub use r#trait::Tool;
