//! The `AgentRegistry` trait and an in-memory implementation.
//!
//! The semantic validator (M1, M2) and the planner's callers need a way
//! to resolve an [`AgentId`] to its [`AgentDefinition`] without the core
//! crate knowing anything about where that definition lives — a real
//! deployment might back this with a database or a remote catalog
//! service; tests and the demonstration API use [`InMemoryAgentRegistry`].

use std::collections::HashMap;

use agentforge_core::{AgentDefinition, AgentId};

/// Resolves agent ids to their static definitions. Implementors must be
/// `Send + Sync` since the orchestrator is called from request handlers
/// that may hold the registry behind a shared reference across threads.
pub trait AgentRegistry: Send + Sync {
    fn get(&self, id: &AgentId) -> Option<&AgentDefinition>;
}

/// A registry backed by a plain in-process map. Good enough for the
/// demonstration API and for tests; a production deployment would swap
/// this for something backed by persistent storage without touching the
/// validator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentRegistry {
    definitions: HashMap<AgentId, AgentDefinition>,
}

impl InMemoryAgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: AgentDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn with_definitions(definitions: impl IntoIterator<Item = AgentDefinition>) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// Remove a definition, reporting whether one was actually present.
    pub fn unregister(&mut self, id: &AgentId) -> bool {
        self.definitions.remove(id).is_some()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.definitions.values()
    }
}

impl AgentRegistry for InMemoryAgentRegistry {
    fn get(&self, id: &AgentId) -> Option<&AgentDefinition> {
        self.definitions.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_core::{AgentCategory, RetryPolicy};

    fn agent(id: &str) -> AgentDefinition {
        AgentDefinition {
            id: AgentId::from(id),
            name: id.to_string(),
            category: AgentCategory::Logic,
            input_schema: vec![],
            output_schema: vec![],
            default_config: serde_json::json!({}),
            cacheable: false,
            retry_policy: RetryPolicy::default(),
        }
    }

    #[test]
    fn unregister_removes_and_reports_presence() {
        let mut registry = InMemoryAgentRegistry::new();
        registry.register(agent("summarizer"));
        assert!(registry.unregister(&AgentId::from("summarizer")));
        assert!(!registry.unregister(&AgentId::from("summarizer")));
        assert!(registry.get(&AgentId::from("summarizer")).is_none());
    }

    #[test]
    fn registers_and_resolves_by_id() {
        let mut registry = InMemoryAgentRegistry::new();
        registry.register(agent("summarizer"));

        assert!(registry.get(&AgentId::from("summarizer")).is_some());
        assert!(registry.get(&AgentId::from("unknown")).is_none());
    }
}
