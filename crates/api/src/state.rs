//! Shared application state: in-memory workflow/execution stores, the
//! agent registry, and the execution event hub. Mirrors the teacher's
//! `AppState`/`AppStateInner` split (a cheaply-cloneable handle over a
//! single `Arc`, storage behind `RwLock`), generalized from the
//! teacher's single workflow/execution maps to also carry the registry
//! and hub this domain needs.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use agentforge_core::{Execution, ExecutionId, Workflow, WorkflowId};
use agentforge_events::ExecutionHub;
use agentforge_registry::InMemoryAgentRegistry;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub workflows: RwLock<HashMap<WorkflowId, Workflow>>,
    pub executions: RwLock<HashMap<ExecutionId, Execution>>,
    pub registry: RwLock<InMemoryAgentRegistry>,
    pub hub: ExecutionHub,
    /// One cancellation flag per in-flight execution, checked by the
    /// simulated driver between steps. Not an `Execution` field itself
    /// since it's connection/request plumbing, not domain state.
    pub cancel_flags: RwLock<HashMap<ExecutionId, Arc<AtomicBool>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                workflows: RwLock::new(HashMap::new()),
                executions: RwLock::new(HashMap::new()),
                registry: RwLock::new(InMemoryAgentRegistry::new()),
                hub: ExecutionHub::new(),
                cancel_flags: RwLock::new(HashMap::new()),
            }),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
