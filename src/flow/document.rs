//! The JSON resource shape exchanged with the surrounding CRUD layer.

use crate::error::{DocumentError, GraphError};
use crate::flow::edge::Edge;
use crate::flow::graph::FlowGraph;
use crate::flow::model::{Flow, TenantId};
use crate::flow::node::{Node, NodePayload, Position};
use crate::flow::registry::NodeKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Wire form of a [`Flow`], one JSON document per tenant and flow name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub entry_node_id: String,
    pub version: u64,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Wire form of a [`Node`]. The payload stays untyped until its kind is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    pub kind: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub position: Position,
}

/// A trait for external data models that can be converted into a [`Flow`].
///
/// This is the extension point for importing flows from formats other than the
/// canonical document, such as exports of older editor versions.
///
/// # Example
///
/// ```rust,no_run
/// use ura::error::DocumentError;
/// use ura::flow::{Flow, IntoFlow};
///
/// struct LegacyExport { json: String }
///
/// impl IntoFlow for LegacyExport {
///     fn into_flow(self) -> Result<Flow, DocumentError> {
///         Flow::from_json(&self.json)
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a typed flow.
    fn into_flow(self) -> Result<Flow, DocumentError>;
}

impl IntoFlow for FlowDocument {
    fn into_flow(self) -> Result<Flow, DocumentError> {
        Flow::try_from(self)
    }
}

impl NodeDocument {
    fn into_node(self) -> Result<Node, DocumentError> {
        let kind: NodeKind = self
            .kind
            .parse()
            .map_err(|source| DocumentError::UnknownKind {
                node_id: self.id.clone(),
                source,
            })?;
        let payload = match kind {
            NodeKind::Menu => NodePayload::Menu(typed_payload(&self.id, kind, self.payload)?),
            NodeKind::Extension => {
                NodePayload::Extension(typed_payload(&self.id, kind, self.payload)?)
            }
            NodeKind::Group => NodePayload::Group(typed_payload(&self.id, kind, self.payload)?),
            NodeKind::Ai => NodePayload::Ai(typed_payload(&self.id, kind, self.payload)?),
        };
        Ok(Node {
            id: self.id,
            payload,
            position: self.position,
        })
    }
}

fn typed_payload<T: DeserializeOwned>(
    node_id: &str,
    kind: NodeKind,
    value: serde_json::Value,
) -> Result<T, DocumentError> {
    serde_json::from_value(value).map_err(|e| DocumentError::MalformedPayload {
        node_id: node_id.to_string(),
        kind: kind.as_str(),
        message: e.to_string(),
    })
}

impl From<&Node> for NodeDocument {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind().as_str().to_string(),
            payload: node.payload.to_value(),
            position: node.position,
        }
    }
}

impl TryFrom<FlowDocument> for Flow {
    type Error = DocumentError;

    fn try_from(doc: FlowDocument) -> Result<Self, Self::Error> {
        let nodes = doc
            .nodes
            .into_iter()
            .map(NodeDocument::into_node)
            .collect::<Result<Vec<_>, _>>()?;
        let graph = FlowGraph::from_parts(nodes, doc.edges).map_err(|e| match e {
            GraphError::DuplicateId { entity, id } => DocumentError::DuplicateId { entity, id },
            other => DocumentError::JsonParseError(other.to_string()),
        })?;
        Ok(Flow {
            id: doc.id,
            tenant_id: TenantId::new(doc.tenant_id),
            name: doc.name,
            entry_node_id: doc.entry_node_id,
            version: doc.version,
            graph,
        })
    }
}

impl From<&Flow> for FlowDocument {
    fn from(flow: &Flow) -> Self {
        Self {
            id: flow.id.clone(),
            tenant_id: flow.tenant_id.as_str().to_string(),
            name: flow.name.clone(),
            entry_node_id: flow.entry_node_id.clone(),
            version: flow.version,
            nodes: flow.graph.nodes().iter().map(NodeDocument::from).collect(),
            edges: flow.graph.edges().to_vec(),
        }
    }
}

impl From<Flow> for FlowDocument {
    fn from(flow: Flow) -> Self {
        FlowDocument::from(&flow)
    }
}

impl Flow {
    /// Parses a flow document, rejecting it entirely on any typing problem.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: FlowDocument =
            serde_json::from_str(json).map_err(|e| DocumentError::JsonParseError(e.to_string()))?;
        doc.into_flow()
    }

    pub fn to_json(&self) -> String {
        // Documents hold only strings, numbers and nested plain structs.
        serde_json::to_string(&FlowDocument::from(self)).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&FlowDocument::from(self)).unwrap_or_default()
    }
}
