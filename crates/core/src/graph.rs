//! Graph index: adjacency, reverse-adjacency, and degree maps derived
//! from an immutable [`Workflow`] snapshot.
//!
//! Every accessor here is O(V+E), pure, and deterministic for a given
//! snapshot — building the index never allocates more than one pass over
//! nodes and edges and never mutates the workflow.

use std::collections::HashMap;

use crate::model::{EdgeId, NodeId, Workflow};

/// Adjacency, reverse-adjacency, and degree information for a workflow
/// snapshot, plus the node insertion order needed for deterministic
/// tie-breaking downstream (the topological planner, cycle reporting).
#[derive(Debug, Clone)]
pub struct GraphIndex {
    node_order: Vec<NodeId>,
    adjacency: HashMap<NodeId, Vec<EdgeId>>,
    reverse_adjacency: HashMap<NodeId, Vec<EdgeId>>,
    in_degree: HashMap<NodeId, usize>,
    out_degree: HashMap<NodeId, usize>,
}

impl GraphIndex {
    /// Build the index from a workflow snapshot.
    ///
    /// An edge whose source or target does not name a node in the
    /// workflow still shows up in the adjacency list of whichever
    /// endpoint *does* exist, but contributes nothing to the degree of
    /// the missing side (there is no entry to contribute to). The
    /// dangling condition itself is reported by the structural
    /// validator's S2 rule, not by this function.
    pub fn build(workflow: &Workflow) -> Self {
        let mut node_order = Vec::with_capacity(workflow.nodes.len());
        let mut adjacency = HashMap::with_capacity(workflow.nodes.len());
        let mut reverse_adjacency = HashMap::with_capacity(workflow.nodes.len());
        let mut in_degree = HashMap::with_capacity(workflow.nodes.len());
        let mut out_degree = HashMap::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            if in_degree.contains_key(&node.id) {
                // Duplicate node id in the snapshot; keep the first
                // occurrence's position, reported separately by callers
                // that care (the data model documents this as an
                // invariant of a *valid* snapshot, not something this
                // index enforces).
                continue;
            }
            node_order.push(node.id.clone());
            adjacency.insert(node.id.clone(), Vec::new());
            reverse_adjacency.insert(node.id.clone(), Vec::new());
            in_degree.insert(node.id.clone(), 0usize);
            out_degree.insert(node.id.clone(), 0usize);
        }

        for edge in &workflow.edges {
            if let Some(list) = adjacency.get_mut(&edge.source) {
                list.push(edge.id.clone());
                *out_degree.get_mut(&edge.source).unwrap() += 1;
            }
            if let Some(list) = reverse_adjacency.get_mut(&edge.target) {
                list.push(edge.id.clone());
                *in_degree.get_mut(&edge.target).unwrap() += 1;
            }
        }

        Self {
            node_order,
            adjacency,
            reverse_adjacency,
            in_degree,
            out_degree,
        }
    }

    /// Nodes in workflow-insertion order.
    pub fn node_order(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Outgoing edge ids for a node, in workflow-insertion order.
    pub fn outgoing(&self, node: &NodeId) -> &[EdgeId] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Incoming edge ids for a node, in workflow-insertion order.
    pub fn incoming(&self, node: &NodeId) -> &[EdgeId] {
        self.reverse_adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn in_degree(&self, node: &NodeId) -> usize {
        self.in_degree.get(node).copied().unwrap_or(0)
    }

    pub fn out_degree(&self, node: &NodeId) -> usize {
        self.out_degree.get(node).copied().unwrap_or(0)
    }

    /// Nodes with in-degree zero, in workflow-insertion order.
    pub fn entry_nodes(&self) -> Vec<NodeId> {
        self.node_order
            .iter()
            .filter(|id| self.in_degree(id) == 0)
            .cloned()
            .collect()
    }

    /// Nodes with out-degree zero, in workflow-insertion order.
    pub fn exit_nodes(&self) -> Vec<NodeId> {
        self.node_order
            .iter()
            .filter(|id| self.out_degree(id) == 0)
            .cloned()
            .collect()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.in_degree.contains_key(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, NodeConfig, Position, PortId, PortType, WorkflowMeta, WorkflowStatus};
    use chrono::Utc;

    fn node(id: &str) -> Node {
        Node {
            id: NodeId::from(id),
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
            source: NodeId::from(source),
            source_port: PortId::from("out"),
            target: NodeId::from(target),
            target_port: PortId::from("in"),
        }
    }

    fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
        Workflow {
            id: crate::model::WorkflowId::from("wf"),
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
    fn linear_chain_degrees() {
        let w = workflow(
            vec![node("a"), node("b"), node("c")],
            vec![edge("e1", "a", "b"), edge("e2", "b", "c")],
        );
        let idx = GraphIndex::build(&w);

        assert_eq!(idx.entry_nodes(), vec![NodeId::from("a")]);
        assert_eq!(idx.exit_nodes(), vec![NodeId::from("c")]);
        assert_eq!(idx.in_degree(&NodeId::from("b")), 1);
        assert_eq!(idx.out_degree(&NodeId::from("b")), 1);
    }

    #[test]
    fn dangling_edge_does_not_inflate_missing_side() {
        let w = workflow(vec![node("a")], vec![edge("e1", "a", "ghost")]);
        let idx = GraphIndex::build(&w);

        assert_eq!(idx.outgoing(&NodeId::from("a")), &[EdgeId::from("e1")]);
        assert!(!idx.contains(&NodeId::from("ghost")));
        // "a" still shows out-degree 1 from the source side.
        assert_eq!(idx.out_degree(&NodeId::from("a")), 1);
    }

    #[test]
    fn entry_and_exit_order_follows_insertion() {
        let w = workflow(vec![node("b"), node("a")], vec![]);
        let idx = GraphIndex::build(&w);
        assert_eq!(idx.entry_nodes(), vec![NodeId::from("b"), NodeId::from("a")]);
    }
}
