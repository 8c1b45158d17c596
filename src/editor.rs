//! Client-side editing state for the node configuration panels.
//!
//! Nothing here is persisted. A draft payload lives next to the graph until it is
//! committed through [`FlowGraph::update_payload`] or thrown away.

use crate::error::GraphError;
use crate::flow::{FlowGraph, NodeId, NodePayload};
use ahash::AHashMap;

/// Panel state of a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeEditState {
    pub open: bool,
    pub draft: Option<NodePayload>,
}

/// Open panels and pending drafts, keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    nodes: AHashMap<NodeId, NodeEditState>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeEditState> {
        self.nodes.get(node_id)
    }

    pub fn is_open(&self, node_id: &str) -> bool {
        self.nodes.get(node_id).is_some_and(|s| s.open)
    }

    pub fn draft(&self, node_id: &str) -> Option<&NodePayload> {
        self.nodes.get(node_id).and_then(|s| s.draft.as_ref())
    }

    /// Opens the panel and seeds the draft with the node's current payload.
    pub fn open(&mut self, graph: &FlowGraph, node_id: &str) -> Result<(), GraphError> {
        let node = graph
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        self.nodes.insert(
            node_id.to_string(),
            NodeEditState {
                open: true,
                draft: Some(node.payload.clone()),
            },
        );
        Ok(())
    }

    pub fn set_draft(&mut self, node_id: &str, payload: NodePayload) {
        let state = self.nodes.entry(node_id.to_string()).or_default();
        state.open = true;
        state.draft = Some(payload);
    }

    /// Discards the draft and closes the panel.
    pub fn cancel(&mut self, node_id: &str) {
        self.nodes.remove(node_id);
    }

    /// Applies the draft to the graph. On failure the draft is kept so the user can
    /// fix it.
    pub fn commit(&mut self, graph: &mut FlowGraph, node_id: &str) -> Result<(), GraphError> {
        let Some(draft) = self.draft(node_id).cloned() else {
            self.nodes.remove(node_id);
            return Ok(());
        };
        graph.update_payload(node_id, draft)?;
        self.nodes.remove(node_id);
        Ok(())
    }

    /// Drops state for nodes no longer in the graph.
    pub fn retain_existing(&mut self, graph: &FlowGraph) {
        self.nodes.retain(|id, _| graph.contains_node(id));
    }
}
