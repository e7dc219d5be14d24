//! Wire form of the validator's external interface (§6):
//! `{ valid: true, executionOrder: [...] }` or
//! `{ valid: false, errors: [...] }`.
//!
//! `agentforge_core::ValidationOutcome` is the internal, idiomatic-Rust
//! shape (a real enum); this is the camelCase, single-struct shape a
//! non-Rust client actually receives over the wire, matching the
//! teacher's pattern of a dedicated `protocol` crate translating core
//! domain types into message DTOs (`WorkflowDefinition` from
//! `swarmx_core::Workflow`, in the teacher's case).

use agentforge_core::{EdgeId, ErrorCode, NodeId, ValidationError, ValidationOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorWire {
    pub code: ErrorCode,
    pub message: String,
    #[serde(rename = "nodeIds", default, skip_serializing_if = "Vec::is_empty")]
    pub node_ids: Vec<NodeId>,
    #[serde(rename = "edgeIds", default, skip_serializing_if = "Vec::is_empty")]
    pub edge_ids: Vec<EdgeId>,
}

impl From<&ValidationError> for ValidationErrorWire {
    fn from(error: &ValidationError) -> Self {
        Self {
            code: error.code,
            message: error.message.clone(),
            node_ids: error.node_ids.clone(),
            edge_ids: error.edge_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResultWire {
    pub valid: bool,
    #[serde(rename = "executionOrder", default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<Vec<NodeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationErrorWire>>,
}

impl From<&ValidationOutcome> for ValidationResultWire {
    fn from(outcome: &ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid { execution_order } => Self {
                valid: true,
                execution_order: Some(execution_order.clone()),
                errors: None,
            },
            ValidationOutcome::Invalid { errors } => Self {
                valid: false,
                execution_order: None,
                errors: Some(errors.iter().map(ValidationErrorWire::from).collect()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_outcome_omits_errors_key() {
        let outcome = ValidationOutcome::Valid {
            execution_order: vec![NodeId::from("a")],
        };
        let wire = ValidationResultWire::from(&outcome);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["valid"], true);
        assert!(json.get("errors").is_none());
        assert_eq!(json["executionOrder"][0], "a");
    }

    #[test]
    fn invalid_outcome_omits_execution_order_key() {
        let outcome = ValidationOutcome::Invalid {
            errors: vec![ValidationError::new(ErrorCode::NoEntryNode, "no entries")],
        };
        let wire = ValidationResultWire::from(&outcome);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["valid"], false);
        assert!(json.get("executionOrder").is_none());
        assert_eq!(json["errors"][0]["code"], "NO_ENTRY_NODE");
    }
}
