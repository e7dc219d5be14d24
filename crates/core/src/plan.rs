//! Topological Planner (C5): Kahn's algorithm over a [`GraphIndex`],
//! producing a deterministic execution order and per-node execution
//! levels for a workflow already known to be acyclic.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::graph::GraphIndex;
use crate::model::{Edge, EdgeId, NodeId, Workflow};

/// Result of running the planner on a workflow snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    Success {
        execution_order: Vec<NodeId>,
        /// Execution level per node: entries are level 0, every other
        /// node is `1 + max(predecessor levels)`.
        levels: HashMap<NodeId, u32>,
    },
    CycleDetected,
}

impl PlanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PlanOutcome::Success { .. })
    }

    pub fn execution_order(&self) -> Option<&[NodeId]> {
        match self {
            PlanOutcome::Success { execution_order, .. } => Some(execution_order),
            PlanOutcome::CycleDetected => None,
        }
    }
}

/// Plan a topological execution order for `workflow`, assuming the graph
/// has already passed the structural validator's cycle check. Still
/// returns [`PlanOutcome::CycleDetected`] rather than panicking if that
/// assumption doesn't hold — Kahn's algorithm detects the condition for
/// free by simply failing to drain the frontier.
pub fn plan(workflow: &Workflow, index: &GraphIndex) -> PlanOutcome {
    let position: HashMap<&NodeId, usize> = index
        .node_order()
        .iter()
        .enumerate()
        .map(|(i, n)| (n, i))
        .collect();
    let edges: HashMap<&EdgeId, &Edge> = workflow.edges.iter().map(|e| (&e.id, e)).collect();

    let mut remaining_in_degree: HashMap<&NodeId, usize> = index
        .node_order()
        .iter()
        .map(|n| (n, index.in_degree(n)))
        .collect();

    let mut queue: VecDeque<NodeId> = index.entry_nodes().into();
    let mut levels: HashMap<NodeId, u32> = HashMap::with_capacity(index.node_order().len());
    let mut order: Vec<NodeId> = Vec::with_capacity(index.node_order().len());

    while let Some(node) = queue.pop_front() {
        let node_level = *levels.entry(node.clone()).or_insert(0);
        order.push(node.clone());

        let mut newly_ready: Vec<NodeId> = Vec::new();
        for edge_id in index.outgoing(&node) {
            let Some(edge) = edges.get(edge_id) else { continue };
            let target = &edge.target;
            let Some(degree) = remaining_in_degree.get_mut(target) else { continue };

            let candidate_level = node_level + 1;
            let entry = levels.entry(target.clone()).or_insert(0);
            if candidate_level > *entry {
                *entry = candidate_level;
            }

            *degree -= 1;
            if *degree == 0 {
                newly_ready.push(target.clone());
            }
        }

        // Nodes that became ready while processing this node's edges may
        // not themselves be in workflow-insertion order (that depends on
        // edge order, not node order) — sort before enqueuing so ties
        // within a wave break deterministically by insertion order.
        newly_ready.sort_by_key(|id| position[id]);
        queue.extend(newly_ready);
    }

    if order.len() == index.node_order().len() {
        PlanOutcome::Success {
            execution_order: order,
            levels,
        }
    } else {
        PlanOutcome::CycleDetected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeConfig, NodeId as Nid, PortId, Position, PortType, WorkflowId, WorkflowMeta, WorkflowStatus};
    use chrono::Utc;

    fn node(id: &str) -> Node {
        Node {
            id: Nid::from(id),
            label: id.to_string(),
            position: Position::default(),
            config: NodeConfig::Input {
                data_type: PortType::String,
            },
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: EdgeId::from(id),
            source: Nid::from(source),
            source_port: PortId::from("out"),
            target: Nid::from(target),
            target_port: PortId::from("in"),
        }
    }

    fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
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
    fn diamond_orders_by_level_and_breaks_ties_by_insertion() {
        // a -> b, a -> c, b -> d, c -> d ("b" inserted before "c").
        let w = workflow(
            vec![node("a"), node("b"), node("c"), node("d")],
            vec![
                edge("e1", "a", "b"),
                edge("e2", "a", "c"),
                edge("e3", "b", "d"),
                edge("e4", "c", "d"),
            ],
        );
        let idx = GraphIndex::build(&w);
        let outcome = plan(&w, &idx);

        match outcome {
            PlanOutcome::Success { execution_order, levels } => {
                assert_eq!(
                    execution_order,
                    vec![Nid::from("a"), Nid::from("b"), Nid::from("c"), Nid::from("d")]
                );
                assert_eq!(levels[&Nid::from("a")], 0);
                assert_eq!(levels[&Nid::from("b")], 1);
                assert_eq!(levels[&Nid::from("c")], 1);
                assert_eq!(levels[&Nid::from("d")], 2);
            }
            PlanOutcome::CycleDetected => panic!("expected success"),
        }
    }

    #[test]
    fn cyclic_graph_is_detected_without_panicking() {
        let w = workflow(
            vec![node("a"), node("b")],
            vec![edge("e1", "a", "b"), edge("e2", "b", "a")],
        );
        let idx = GraphIndex::build(&w);
        assert_eq!(plan(&w, &idx), PlanOutcome::CycleDetected);
    }

    #[test]
    fn level_takes_longest_incoming_path() {
        // a -> b -> d, a -> d directly: d's level must follow the longer path.
        let w = workflow(
            vec![node("a"), node("b"), node("d")],
            vec![edge("e1", "a", "b"), edge("e2", "b", "d"), edge("e3", "a", "d")],
        );
        let idx = GraphIndex::build(&w);
        match plan(&w, &idx) {
            PlanOutcome::Success { levels, .. } => assert_eq!(levels[&Nid::from("d")], 2),
            PlanOutcome::CycleDetected => panic!("expected success"),
        }
    }
}
