use crate::flow::node::NodeId;
use crate::flow::registry::{HANDLE_DEFAULT, HANDLE_INVALID, HANDLE_TIMEOUT, NodeKind, is_dtmf_key};
use serde::{Deserialize, Serialize};

/// Identifier of an edge, unique within its flow.
pub type EdgeId = String;

/// A control transfer from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Edge {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    /// Which branch of the source this edge leaves from. `None` for the single
    /// branch of non-menu nodes.
    #[serde(default)]
    pub source_handle: Option<String>,
    pub target_node_id: NodeId,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source_node_id: impl Into<NodeId>,
        source_handle: Option<&str>,
        target_node_id: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source_node_id: source_node_id.into(),
            source_handle: source_handle.map(str::to_string),
            target_node_id: target_node_id.into(),
        }
    }

    /// The branch this edge occupies on its source, given the source's kind.
    pub fn branch(&self, source_kind: NodeKind) -> Branch {
        Branch::classify(source_kind, self.source_handle.as_deref())
    }
}

/// The outgoing slot of a node that an edge occupies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    /// A menu option key (not yet checked against the menu's declared keys).
    Key(String),
    Timeout,
    Invalid,
    /// The single outgoing branch of a non-menu node, `null` or `"default"`.
    Next,
    /// A handle that no node kind accepts in this position.
    Unknown(String),
}

impl Branch {
    pub fn classify(source_kind: NodeKind, handle: Option<&str>) -> Self {
        if source_kind.is_branching() {
            return match handle {
                Some(HANDLE_TIMEOUT) => Branch::Timeout,
                Some(HANDLE_INVALID) => Branch::Invalid,
                Some(key) if is_dtmf_key(key) => Branch::Key(key.to_string()),
                other => Branch::Unknown(other.unwrap_or("null").to_string()),
            };
        }
        match handle {
            None | Some(HANDLE_DEFAULT) => Branch::Next,
            Some(other) => Branch::Unknown(other.to_string()),
        }
    }

    /// The handle text used in diagnostics and error messages.
    pub fn label(&self) -> &str {
        match self {
            Branch::Key(key) => key,
            Branch::Timeout => HANDLE_TIMEOUT,
            Branch::Invalid => HANDLE_INVALID,
            Branch::Next => HANDLE_DEFAULT,
            Branch::Unknown(handle) => handle,
        }
    }
}
