use crate::error::GraphError;
use crate::flow::edge::{Branch, Edge, EdgeId};
use crate::flow::node::{MenuPayload, Node, NodeId, NodePayload, Position};
use crate::flow::registry::is_dtmf_key;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::VecDeque;
use tracing::debug;

/// The in-memory node/edge graph of a flow.
///
/// Node and edge ids are unique at all times. Every mutator validates first and
/// applies second, so a returned error means the graph is untouched. Structural
/// edge constraints (one edge per handle, at most one edge out of non-menu nodes,
/// handles a node actually offers) are enforced here at insert time; the
/// validator reports the same problems for graphs loaded from documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: AHashMap<NodeId, usize>,
    edge_index: AHashMap<EdgeId, usize>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a graph from already-parsed parts, enforcing only id uniqueness.
    ///
    /// Dangling edges and handle violations are admitted so that the validator can
    /// report all of them at once.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut graph = Self {
            nodes,
            edges,
            node_index: AHashMap::new(),
            edge_index: AHashMap::new(),
        };
        for (idx, node) in graph.nodes.iter().enumerate() {
            if graph.node_index.insert(node.id.clone(), idx).is_some() {
                return Err(GraphError::DuplicateId {
                    entity: "node",
                    id: node.id.clone(),
                });
            }
        }
        for (idx, edge) in graph.edges.iter().enumerate() {
            if graph.edge_index.insert(edge.id.clone(), idx).is_some() {
                return Err(GraphError::DuplicateId {
                    entity: "edge",
                    id: edge.id.clone(),
                });
            }
        }
        Ok(graph)
    }

    /// A graph holding just `node`. Like [`FlowGraph::from_parts`], menu keys are
    /// left for the validator.
    pub fn single(node: Node) -> Self {
        let node_index = AHashMap::from_iter([(node.id.clone(), 0)]);
        Self {
            nodes: vec![node],
            edges: Vec::new(),
            node_index,
            edge_index: AHashMap::new(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateId {
                entity: "node",
                id: node.id,
            });
        }
        if let NodePayload::Menu(menu) = &node.payload {
            check_menu_keys(&node.id, menu)?;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node together with every edge that touches it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let idx = *self
            .node_index
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let node = self.nodes.remove(idx);
        let before = self.edges.len();
        self.edges
            .retain(|e| e.source_node_id != node.id && e.target_node_id != node.id);
        debug!(
            node_id = %node.id,
            removed_edges = before - self.edges.len(),
            "Removed node"
        );
        self.reindex();
        Ok(node)
    }

    /// Replaces a node's payload. The kind cannot change, and a menu may not drop a
    /// key that an outgoing edge still uses.
    pub fn update_payload(
        &mut self,
        id: &str,
        payload: NodePayload,
    ) -> Result<NodePayload, GraphError> {
        let idx = *self
            .node_index
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let current = self.nodes[idx].kind();
        if current != payload.kind() {
            return Err(GraphError::KindMismatch {
                node_id: id.to_string(),
                expected: current.as_str(),
                found: payload.kind().as_str(),
            });
        }
        if let NodePayload::Menu(menu) = &payload {
            check_menu_keys(id, menu)?;
            for edge in self.outgoing_edges(id) {
                if let Branch::Key(key) = edge.branch(current) {
                    if menu.option(&key).is_none() {
                        return Err(GraphError::HandleInUse {
                            node_id: id.to_string(),
                            key,
                            edge_id: edge.id.clone(),
                        });
                    }
                }
            }
        }
        Ok(std::mem::replace(&mut self.nodes[idx].payload, payload))
    }

    pub fn update_position(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        let idx = *self
            .node_index
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        self.nodes[idx].position = position;
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edge_index.contains_key(&edge.id) {
            return Err(GraphError::DuplicateId {
                entity: "edge",
                id: edge.id,
            });
        }
        let source = self
            .node(&edge.source_node_id)
            .ok_or_else(|| GraphError::NodeNotFound(edge.source_node_id.clone()))?;
        if !self.contains_node(&edge.target_node_id) {
            return Err(GraphError::NodeNotFound(edge.target_node_id.clone()));
        }

        let kind = source.kind();
        let branch = edge.branch(kind);
        let offered = match (&branch, &source.payload) {
            (Branch::Unknown(_), _) => false,
            (Branch::Key(key), NodePayload::Menu(menu)) => menu.option(key).is_some(),
            _ => true,
        };
        if !offered {
            return Err(GraphError::InvalidHandle {
                node_id: source.id.clone(),
                kind: kind.as_str(),
                handle: branch.label().to_string(),
            });
        }
        if self
            .outgoing_edges(&source.id)
            .any(|existing| existing.branch(kind) == branch)
        {
            return Err(GraphError::DuplicateHandle {
                node_id: source.id.clone(),
                handle: branch.label().to_string(),
            });
        }

        self.edge_index.insert(edge.id.clone(), self.edges.len());
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let idx = *self
            .edge_index
            .get(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.to_string()))?;
        let edge = self.edges.remove(idx);
        self.reindex();
        Ok(edge)
    }

    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source_node_id == node_id)
    }

    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.target_node_id == node_id)
    }

    /// Breadth-first set of node ids reachable from `start`, including `start` itself.
    /// Edges pointing at missing nodes are not followed. Empty if `start` is unknown.
    pub fn reachable_from(&self, start: &str) -> AHashSet<NodeId> {
        let mut seen = AHashSet::new();
        if !self.contains_node(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start.to_string()]);
        seen.insert(start.to_string());
        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing_edges(&current) {
                if self.contains_node(&edge.target_node_id)
                    && seen.insert(edge.target_node_id.clone())
                {
                    queue.push_back(edge.target_node_id.clone());
                }
            }
        }
        seen
    }

    fn reindex(&mut self) {
        self.node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id.clone(), idx))
            .collect();
        self.edge_index = self
            .edges
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.id.clone(), idx))
            .collect();
    }
}

/// Problems with a menu's declared option keys, in declaration order.
pub(crate) fn menu_key_problems(menu: &MenuPayload) -> Vec<(String, &'static str)> {
    let mut problems: Vec<(String, &'static str)> = menu
        .options
        .iter()
        .filter(|o| !is_dtmf_key(&o.key))
        .map(|o| (o.key.clone(), "not a DTMF token (digits, '*' or '#')"))
        .collect();
    problems.extend(
        menu.options
            .iter()
            .map(|o| o.key.as_str())
            .duplicates()
            .map(|key| (key.to_string(), "declared more than once")),
    );
    problems
}

fn check_menu_keys(node_id: &str, menu: &MenuPayload) -> Result<(), GraphError> {
    match menu_key_problems(menu).into_iter().next() {
        Some((key, message)) => Err(GraphError::InvalidOptionKey {
            node_id: node_id.to_string(),
            key,
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}
