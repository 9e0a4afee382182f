//! Holds the tools available to a run and partitions them by [`ToolKind`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::tool_source::{ToolKind, ToolSpec};
use crate::tools::r#trait::Tool;

/// A name-keyed collection of tools, queried by the run loop each step to
/// build the provider's tool spec list and to dispatch `tool_use` calls.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Every registered tool's spec, in an unspecified but stable-per-call order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    /// Names of tools whose `kind()` is `Backend`.
    pub fn backend_names(&self) -> Vec<String> {
        self.tools
            .values()
            .filter(|t| t.kind() == ToolKind::Backend)
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Names of tools whose `kind()` is `Frontend`.
    pub fn frontend_names(&self) -> Vec<String> {
        self.tools
            .values()
            .filter(|t| t.kind() == ToolKind::Frontend)
            .map(|t| t.name().to_string())
            .collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ToolKind> {
        self.tools.get(name).map(|t| t.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{AllowlistPolicy, PathSandbox};
    use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc as StdArc;

    struct Dummy(&'static str, ToolKind);

    #[async_trait]
    impl Tool for Dummy {
        fn name(&self) -> &str {
            self.0
        }

        fn kind(&self) -> ToolKind {
            self.1
        }

        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: self.0.to_string(),
                description: "dummy".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }
        }

        async fn call(&self, _args: Value, _ctx: &ToolCallContext) -> Result<ToolCallContent, ToolSourceError> {
            Ok(ToolCallContent::text("ok"))
        }
    }

    #[test]
    fn register_and_get_roundtrips() {
        let mut registry = ToolRegistry::new();
        registry.register(StdArc::new(Dummy("read_file", ToolKind::Backend)));
        assert!(registry.contains("read_file"));
        assert_eq!(registry.get("read_file").unwrap().name(), "read_file");
    }

    #[test]
    fn partitions_backend_and_frontend_names() {
        let mut registry = ToolRegistry::new();
        registry.register(StdArc::new(Dummy("read_file", ToolKind::Backend)));
        registry.register(StdArc::new(Dummy("ask_user", ToolKind::Frontend)));
        assert_eq!(registry.backend_names(), vec!["read_file".to_string()]);
        assert_eq!(registry.frontend_names(), vec!["ask_user".to_string()]);
    }

    #[test]
    fn unknown_tool_returns_none() {
        let registry = ToolRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(registry.kind_of("missing").is_none());
    }

    #[test]
    fn sandbox_unused_here_but_importable_for_context_tests() {
        let _sandbox = PathSandbox::new("/tmp", AllowlistPolicy::default());
    }
}
