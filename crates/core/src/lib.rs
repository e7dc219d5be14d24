//! Domain model, graph index, structural validator, and topological
//! planner for workflow graphs.
//!
//! This crate is deliberately synchronous and registry-free: it has no
//! suspension points and no notion of where an `AgentDefinition` comes
//! from. Semantic validation (which needs an agent registry) and the
//! orchestrator that composes structural and semantic rules together
//! live one layer up, in `agentforge-registry`.

pub mod error;
pub mod graph;
pub mod model;
pub mod plan;
pub mod validate;

pub use error::{ErrorCode, RuleErrors, ValidationError, ValidationOutcome};
pub use graph::GraphIndex;
pub use model::{
    AgentCategory, AgentDefinition, AgentId, Edge, EdgeId, Execution, ExecutionId, ExecutionStatus,
    Node, NodeConfig, NodeExecStatus, NodeExecutionState, NodeId, NodeKind, PortId, PortSchema,
    PortType, Position, RetryPolicy, Workflow, WorkflowId, WorkflowMeta, WorkflowStatus,
};
pub use plan::{plan, PlanOutcome};
