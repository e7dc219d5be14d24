//! The closed validation error taxonomy (§7) and the result types rules
//! and the orchestrator return.

use serde::{Deserialize, Serialize};

use crate::model::{EdgeId, NodeId};

/// Closed set of error codes a validator can report. Any other code is a
/// defect in the validator, not a legitimate extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    CycleDetected,
    InvalidEdgeReference,
    DuplicateEdge,
    NoEntryNode,
    OrphanNode,
    TypeMismatch,
    MissingRequiredInput,
}

/// A single validation failure, carrying enough context (`node_ids`,
/// `edge_ids`) for a UI to highlight the offending elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_ids: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_ids: Vec<EdgeId>,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            node_ids: Vec::new(),
            edge_ids: Vec::new(),
        }
    }

    pub fn with_nodes(mut self, node_ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.node_ids = node_ids.into_iter().collect();
        self
    }

    pub fn with_edges(mut self, edge_ids: impl IntoIterator<Item = EdgeId>) -> Self {
        self.edge_ids = edge_ids.into_iter().collect();
        self
    }
}

/// The result of running one validation rule. Rules collect every
/// failure they can observe rather than stopping at the first, so this
/// is a plain `Vec` rather than a fail-fast `Result`: an empty vector
/// means the rule passed.
pub type RuleErrors = Vec<ValidationError>;

/// The final result of the validation orchestrator (C6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid { execution_order: Vec<NodeId> },
    Invalid { errors: Vec<ValidationError> },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationOutcome::Valid { .. } => &[],
            ValidationOutcome::Invalid { errors } => errors,
        }
    }
}
