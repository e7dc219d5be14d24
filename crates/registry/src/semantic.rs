//! Semantic Validator (C4): rules M1–M2, which need an [`AgentRegistry`]
//! to resolve the agent/port information the structural validator has no
//! visibility into.

use std::collections::HashSet;

use agentforge_core::{ErrorCode, NodeKind, PortId, RuleErrors, ValidationError, Workflow};

use crate::registry::AgentRegistry;

/// M1 TYPE_MISMATCH: for every edge directly connecting two agent nodes,
/// resolve both sides' agent definitions and ports. An unknown agent or
/// an unknown port is reported as `TYPE_MISMATCH` too — there is no
/// separate "unresolved reference" code for the semantic layer, only a
/// message distinguishing the cause. Edges touching a tool, input, or
/// output node are out of scope for this rule.
pub fn type_mismatch(workflow: &Workflow, registry: &dyn AgentRegistry) -> RuleErrors {
    let mut errors = Vec::new();

    for edge in &workflow.edges {
        let (Some(source_node), Some(target_node)) =
            (workflow.get_node(&edge.source), workflow.get_node(&edge.target))
        else {
            continue;
        };
        if source_node.kind() != NodeKind::Agent || target_node.kind() != NodeKind::Agent {
            continue;
        }
        // Both sides are agent nodes, so `agent_id()` is always `Some`.
        let source_agent_id = source_node.agent_id().unwrap();
        let target_agent_id = target_node.agent_id().unwrap();

        let source_def = registry.get(source_agent_id);
        let target_def = registry.get(target_agent_id);

        let (Some(source_def), Some(target_def)) = (source_def, target_def) else {
            errors.push(
                ValidationError::new(
                    ErrorCode::TypeMismatch,
                    format!(
                        "edge '{}' connects an unresolvable agent ('{}' or '{}' is not registered)",
                        edge.id, source_agent_id, target_agent_id
                    ),
                )
                .with_nodes([edge.source.clone(), edge.target.clone()])
                .with_edges([edge.id.clone()]),
            );
            continue;
        };

        let source_port = source_def.output_port(&edge.source_port);
        let target_port = target_def.input_port(&edge.target_port);

        match (source_port, target_port) {
            (Some(sp), Some(tp)) if sp.port_type == tp.port_type => {}
            (Some(sp), Some(tp)) => {
                errors.push(
                    ValidationError::new(
                        ErrorCode::TypeMismatch,
                        format!(
                            "edge '{}' connects output port '{}' ({:?}) to input port '{}' ({:?})",
                            edge.id, edge.source_port, sp.port_type, edge.target_port, tp.port_type
                        ),
                    )
                    .with_nodes([edge.source.clone(), edge.target.clone()])
                    .with_edges([edge.id.clone()]),
                );
            }
            _ => {
                errors.push(
                    ValidationError::new(
                        ErrorCode::TypeMismatch,
                        format!(
                            "edge '{}' references a port not declared on its agent's schema",
                            edge.id
                        ),
                    )
                    .with_nodes([edge.source.clone(), edge.target.clone()])
                    .with_edges([edge.id.clone()]),
                );
            }
        }
    }

    errors
}

/// M2 MISSING_REQUIRED_INPUT: per agent node, one error listing every
/// required input port with no incoming edge. A node whose agent id does
/// not resolve in the registry is skipped here — that condition is
/// `TYPE_MISMATCH`'s concern wherever it shows up on an edge, not a
/// reason to report every one of its (unknowable) required ports missing.
pub fn missing_required_input(workflow: &Workflow, registry: &dyn AgentRegistry) -> RuleErrors {
    let mut errors = Vec::new();

    for node in &workflow.nodes {
        if node.kind() != NodeKind::Agent {
            continue;
        }
        let Some(agent_id) = node.agent_id() else { continue };
        let Some(definition) = registry.get(agent_id) else { continue };

        let incoming_ports: HashSet<&PortId> = workflow
            .edges
            .iter()
            .filter(|e| e.target == node.id)
            .map(|e| &e.target_port)
            .collect();

        let missing: Vec<PortId> = definition
            .input_schema
            .iter()
            .filter(|port| port.required && !incoming_ports.contains(&port.name))
            .map(|port| port.name.clone())
            .collect();

        if missing.is_empty() {
            continue;
        }

        errors.push(
            ValidationError::new(
                ErrorCode::MissingRequiredInput,
                format!(
                    "agent node '{}' is missing required input(s): {}",
                    node.id,
                    missing.iter().map(PortId::as_str).collect::<Vec<_>>().join(", ")
                ),
            )
            .with_nodes([node.id.clone()]),
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_core::{
        AgentCategory, AgentDefinition, AgentId, Edge, EdgeId, Node, NodeConfig, NodeId, Position,
        PortSchema, PortType, RetryPolicy,
    };
    use crate::registry::InMemoryAgentRegistry;

    fn agent_def(id: &str, inputs: Vec<PortSchema>, outputs: Vec<PortSchema>) -> AgentDefinition {
        AgentDefinition {
            id: AgentId::from(id),
            name: id.to_string(),
            category: AgentCategory::Llm,
            input_schema: inputs,
            output_schema: outputs,
            default_config: serde_json::json!({}),
            cacheable: false,
            retry_policy: RetryPolicy::default(),
        }
    }

    fn port(name: &str, port_type: PortType, required: bool) -> PortSchema {
        PortSchema {
            name: PortId::from(name),
            port_type,
            required,
            description: String::new(),
        }
    }

    fn agent_node(id: &str, agent_id: &str) -> Node {
        Node {
            id: NodeId::from(id),
            label: id.to_string(),
            position: Position::default(),
            config: NodeConfig::Agent {
                agent_id: AgentId::from(agent_id),
                parameters: None,
            },
        }
    }

    fn edge(id: &str, source: &str, source_port: &str, target: &str, target_port: &str) -> Edge {
        Edge {
            id: EdgeId::from(id),
            source: NodeId::from(source),
            source_port: PortId::from(source_port),
            target: NodeId::from(target),
            target_port: PortId::from(target_port),
        }
    }

    fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
        use agentforge_core::{WorkflowId, WorkflowMeta, WorkflowStatus};
        use chrono::Utc;
        Workflow {
            id: WorkflowId::from("wf"),
            status: WorkflowStatus::Draft,
            meta: WorkflowMeta {
                name: "wf".into(),
                description: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                owner_id: "owner".into(),
                version: 1,
            },
            nodes,
            edges,
        }
    }

    #[test]
    fn type_mismatch_flags_incompatible_ports() {
        let registry = InMemoryAgentRegistry::with_definitions([
            agent_def("a", vec![], vec![port("out", PortType::String, false)]),
            agent_def("b", vec![port("in", PortType::Number, true)], vec![]),
        ]);
        let w = workflow(
            vec![agent_node("n1", "a"), agent_node("n2", "b")],
            vec![edge("e1", "n1", "out", "n2", "in")],
        );

        let errors = type_mismatch(&w, &registry);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::TypeMismatch);
    }

    #[test]
    fn type_mismatch_ignores_edges_not_between_two_agents() {
        let registry = InMemoryAgentRegistry::new();
        let input_node = Node {
            id: NodeId::from("in"),
            label: "in".into(),
            position: Position::default(),
            config: NodeConfig::Input {
                data_type: PortType::String,
            },
        };
        let w = workflow(
            vec![input_node, agent_node("n2", "unregistered")],
            vec![edge("e1", "in", "out", "n2", "in")],
        );
        assert!(type_mismatch(&w, &registry).is_empty());
    }

    #[test]
    fn missing_required_input_lists_all_unmet_ports_in_one_error() {
        let registry = InMemoryAgentRegistry::with_definitions([agent_def(
            "a",
            vec![port("x", PortType::String, true), port("y", PortType::Number, true)],
            vec![],
        )]);
        let w = workflow(vec![agent_node("n1", "a")], vec![]);

        let errors = missing_required_input(&w, &registry);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].node_ids, vec![NodeId::from("n1")]);
    }
}
