use crate::flow::document::FlowDocument;
use crate::flow::graph::FlowGraph;
use crate::flow::node::{Node, NodeId};
use crate::flow::registry::{NodeKind, create_default};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of a persisted flow.
pub type FlowId = String;

/// An isolated customer account. Every flow belongs to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A named, versioned call flow owned by one tenant.
///
/// Serializes to and from the JSON resource shape via [`FlowDocument`]; parsing is
/// strict and rejects the whole document on an unknown kind, a malformed payload or
/// a duplicated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlowDocument", into = "FlowDocument")]
pub struct Flow {
    pub id: FlowId,
    pub tenant_id: TenantId,
    pub name: String,
    pub entry_node_id: NodeId,
    pub version: u64,
    pub graph: FlowGraph,
}

impl Flow {
    /// Structural hash of everything the validator and compiler look at: entry id,
    /// node ids and payloads, edges. Positions and the version do not contribute.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.id.hash(&mut hasher);
        self.entry_node_id.hash(&mut hasher);
        for node in self.graph.nodes().iter().sorted_by(|a, b| a.id.cmp(&b.id)) {
            node.id.hash(&mut hasher);
            node.payload.hash(&mut hasher);
        }
        for edge in self.graph.edges().iter().sorted_by(|a, b| a.id.cmp(&b.id)) {
            edge.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn entry_node(&self) -> Option<&Node> {
        self.graph.node(&self.entry_node_id)
    }
}

/// A flow that has not been persisted yet: no id, no version.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDraft {
    pub name: String,
    pub entry_node_id: NodeId,
    pub graph: FlowGraph,
}

impl FlowDraft {
    /// A new flow holding a single entry node of `entry_kind`, the editor default.
    pub fn new(name: impl Into<String>, entry_kind: NodeKind) -> Self {
        let entry = create_default(entry_kind);
        Self {
            name: name.into(),
            entry_node_id: entry.id.clone(),
            graph: FlowGraph::single(entry),
        }
    }

    pub fn from_graph(
        name: impl Into<String>,
        entry_node_id: impl Into<NodeId>,
        graph: FlowGraph,
    ) -> Self {
        Self {
            name: name.into(),
            entry_node_id: entry_node_id.into(),
            graph,
        }
    }

    pub fn into_flow(self, id: FlowId, tenant_id: TenantId) -> Flow {
        Flow {
            id,
            tenant_id,
            name: self.name,
            entry_node_id: self.entry_node_id,
            version: 0,
            graph: self.graph,
        }
    }
}
