use crate::flow::registry::NodeKind;
use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within its flow.
pub type NodeId = String;

/// Canvas coordinates of a node. Presentation only: the validator, the compiler and
/// the flow fingerprint never look at it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One DTMF choice offered by a menu prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuOption {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MenuPayload {
    pub prompt_text: String,
    pub options: Vec<MenuOption>,
}

impl MenuPayload {
    pub fn option(&self, key: &str) -> Option<&MenuOption> {
        self.options.iter().find(|o| o.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtensionPayload {
    pub extension_number: String,
    pub display_name: String,
}

/// How a ring group distributes an incoming call over its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingStrategy {
    /// Ring every member at once.
    #[default]
    Simultaneous,
    /// Ring members one after another.
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupPayload {
    pub group_id: String,
    pub display_name: String,
    pub strategy: RingStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiPayload {
    pub project_id: String,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// The persisted data of a node. Exactly one payload shape per [`NodeKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodePayload {
    Menu(MenuPayload),
    Extension(ExtensionPayload),
    Group(GroupPayload),
    Ai(AiPayload),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Menu(_) => NodeKind::Menu,
            NodePayload::Extension(_) => NodeKind::Extension,
            NodePayload::Group(_) => NodeKind::Group,
            NodePayload::Ai(_) => NodeKind::Ai,
        }
    }

    pub fn as_menu(&self) -> Option<&MenuPayload> {
        match self {
            NodePayload::Menu(menu) => Some(menu),
            _ => None,
        }
    }

    /// Serializes the payload body alone, without the kind tag.
    pub fn to_value(&self) -> serde_json::Value {
        let value = match self {
            NodePayload::Menu(p) => serde_json::to_value(p),
            NodePayload::Extension(p) => serde_json::to_value(p),
            NodePayload::Group(p) => serde_json::to_value(p),
            NodePayload::Ai(p) => serde_json::to_value(p),
        };
        // Plain structs of strings always serialize.
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// A call-handling action in a flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub payload: NodePayload,
    pub position: Position,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, payload: NodePayload) -> Self {
        Self {
            id: id.into(),
            payload,
            position: Position::default(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }
}
