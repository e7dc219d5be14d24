//! Workflow domain model: identifiers, nodes, edges, workflows, agent
//! definitions, and executions.
//!
//! Every identifier is a branded newtype over `String` so a `NodeId` can
//! never be passed where an `EdgeId` is expected, even though both are
//! plain strings on the wire.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(NodeId, "Opaque identifier for a workflow node.");
string_id!(EdgeId, "Opaque identifier for a workflow edge.");
string_id!(PortId, "Opaque identifier for a node port.");
string_id!(WorkflowId, "Opaque identifier for a workflow.");
string_id!(ExecutionId, "Opaque identifier for an execution.");
string_id!(AgentId, "Opaque identifier for an agent definition.");

/// Visual position in the canvas editor. Ignored by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Primitive data type carried by a port or a declared input/output node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

/// Discriminant for [`Node::kind`]. Mirrors the tag on [`NodeConfig`]; kept
/// as a separate enum because callers frequently want to match on the kind
/// without destructuring the config payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Agent,
    Tool,
    Input,
    Output,
}

/// Per-type node configuration. The `type` tag is the single source of
/// truth for [`Node::kind`] — there is no separate, independently
/// settable type field to drift out of sync with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    Agent {
        agent_id: AgentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameters: Option<serde_json::Value>,
    },
    Tool {
        tool_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameters: Option<serde_json::Value>,
    },
    Input {
        data_type: PortType,
    },
    Output {
        data_type: PortType,
    },
}

/// A node in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub position: Position,
    pub config: NodeConfig,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match &self.config {
            NodeConfig::Agent { .. } => NodeKind::Agent,
            NodeConfig::Tool { .. } => NodeKind::Tool,
            NodeConfig::Input { .. } => NodeKind::Input,
            NodeConfig::Output { .. } => NodeKind::Output,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self.kind(), NodeKind::Agent)
    }

    /// The agent this node invokes, if it is an agent node.
    pub fn agent_id(&self) -> Option<&AgentId> {
        match &self.config {
            NodeConfig::Agent { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

/// A directed edge connecting a source port to a target port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_port: PortId,
    pub target: NodeId,
    pub target_port: PortId,
}

/// Lifecycle status of a workflow as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
    Valid,
    Invalid,
    Archived,
}

/// Workflow metadata, including the optimistic-concurrency version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
    /// Monotonically increasing; bumped on every edit, reset to `draft`
    /// status in the process (invariant 8, enforced by the persistence
    /// layer — the core only stamps the value it is given).
    pub version: u64,
}

/// An immutable workflow snapshot, as handed to the validator.
///
/// `nodes` and `edges` are plain vectors rather than maps: insertion
/// order is preserved for free, which the topological planner and the
/// structural validator both rely on for deterministic tie-breaking
/// (see `DESIGN.md`). Node/edge id uniqueness is an invariant of a valid
/// snapshot, not enforced by this type itself — `GraphIndex::build`
/// tolerates duplicates by keeping the first occurrence, the same way it
/// tolerates dangling edges (both are reported by the structural
/// validator instead of panicking).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub status: WorkflowStatus,
    pub meta: WorkflowMeta,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Workflow {
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }
}

/// Category an agent belongs to; informational, not enforced by the
/// validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCategory {
    Llm,
    Retrieval,
    Transform,
    Integration,
    Logic,
}

/// A named, typed port on an agent's input or output schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSchema {
    pub name: PortId,
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// Retry policy for an agent's execution attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Static definition of an agent, as looked up from an `AgentRegistry`
/// during semantic validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: AgentId,
    pub name: String,
    pub category: AgentCategory,
    pub input_schema: Vec<PortSchema>,
    pub output_schema: Vec<PortSchema>,
    #[serde(default)]
    pub default_config: serde_json::Value,
    pub cacheable: bool,
    pub retry_policy: RetryPolicy,
}

impl AgentDefinition {
    pub fn input_port(&self, name: &PortId) -> Option<&PortSchema> {
        self.input_schema.iter().find(|p| &p.name == name)
    }

    pub fn output_port(&self, name: &PortId) -> Option<&PortSchema> {
        self.output_schema.iter().find(|p| &p.name == name)
    }
}

/// Execution status of a node within an execution. This is the
/// authoritative state machine described by the execution event
/// contract (`agentforge-events` drives transitions through it via the
/// same rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeExecStatus {
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl Default for NodeExecStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl NodeExecStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// States this one may transition to, per the node state machine in
    /// the execution event contract.
    pub fn valid_transitions(&self) -> &'static [NodeExecStatus] {
        match self {
            Self::Pending => &[Self::Queued, Self::Skipped],
            Self::Queued => &[Self::Running, Self::Skipped],
            Self::Running => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed | Self::Skipped => &[],
        }
    }

    pub fn can_transition_to(&self, to: NodeExecStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

/// Execution-wide status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Per-node execution record within an [`Execution`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecutionState {
    pub node_id: NodeId,
    pub status: NodeExecStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

impl NodeExecutionState {
    pub fn pending(node_id: NodeId) -> Self {
        Self {
            node_id,
            status: NodeExecStatus::Pending,
            started_at: None,
            completed_at: None,
            retry_count: 0,
            error: None,
            output: None,
        }
    }
}

/// A single execution of a validated workflow snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    /// The workflow version that passed validation for this execution
    /// (invariant 8).
    pub workflow_version: u64,
    pub status: ExecutionStatus,
    pub triggered_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inputs: serde_json::Value,
    #[serde(default)]
    pub outputs: Option<serde_json::Value>,
    pub node_states: Vec<NodeExecutionState>,
}

impl Execution {
    pub fn new(
        workflow: &Workflow,
        triggered_by: impl Into<String>,
        inputs: serde_json::Value,
    ) -> Self {
        Self {
            id: ExecutionId::new(uuid::Uuid::new_v4().to_string()),
            workflow_id: workflow.id.clone(),
            workflow_version: workflow.meta.version,
            status: ExecutionStatus::Pending,
            triggered_by: triggered_by.into(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            inputs,
            outputs: None,
            node_states: workflow
                .nodes
                .iter()
                .map(|n| NodeExecutionState::pending(n.id.clone()))
                .collect(),
        }
    }

    pub fn node_state(&self, node_id: &NodeId) -> Option<&NodeExecutionState> {
        self.node_states.iter().find(|s| &s.node_id == node_id)
    }

    pub fn node_state_mut(&mut self, node_id: &NodeId) -> Option<&mut NodeExecutionState> {
        self.node_states.iter_mut().find(|s| &s.node_id == node_id)
    }

    pub fn is_complete(&self) -> bool {
        self.node_states.iter().all(|s| s.status.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow_meta() -> WorkflowMeta {
        WorkflowMeta {
            name: "test".into(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner_id: "owner-1".into(),
            version: 1,
        }
    }

    #[test]
    fn node_kind_follows_config_tag() {
        let node = Node {
            id: NodeId::from("n1"),
            label: "Agent".into(),
            position: Position::default(),
            config: NodeConfig::Agent {
                agent_id: AgentId::from("agent-1"),
                parameters: None,
            },
        };
        assert_eq!(node.kind(), NodeKind::Agent);
        assert!(node.is_agent());
    }

    #[test]
    fn node_state_transitions() {
        assert!(NodeExecStatus::Pending.can_transition_to(NodeExecStatus::Queued));
        assert!(!NodeExecStatus::Pending.can_transition_to(NodeExecStatus::Completed));
        assert!(NodeExecStatus::Running.can_transition_to(NodeExecStatus::Failed));
        assert!(NodeExecStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn execution_tracks_one_state_per_node() {
        let workflow = Workflow {
            id: WorkflowId::from("wf-1"),
            status: WorkflowStatus::Valid,
            meta: workflow_meta(),
            nodes: vec![Node {
                id: NodeId::from("n1"),
                label: "In".into(),
                position: Position::default(),
                config: NodeConfig::Input {
                    data_type: PortType::String,
                },
            }],
            edges: vec![],
        };

        let execution = Execution::new(&workflow, "user-1", serde_json::json!({}));
        assert_eq!(execution.node_states.len(), 1);
        assert_eq!(execution.workflow_version, 1);
        assert!(!execution.is_complete());
    }
}
