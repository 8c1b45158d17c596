//! Node type registry: the closed set of node kinds, their payload schemas and defaults.

use crate::error::RegistryError;
use crate::flow::node::{
    AiPayload, ExtensionPayload, GroupPayload, MenuOption, MenuPayload, Node, NodeId, NodePayload,
    RingStrategy,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Reserved menu handle taken when the caller presses nothing.
pub const HANDLE_TIMEOUT: &str = "timeout";
/// Reserved menu handle taken when the caller presses an unknown key.
pub const HANDLE_INVALID: &str = "invalid";
/// Explicit name of the single outgoing branch of a non-menu node.
pub const HANDLE_DEFAULT: &str = "default";

/// The four kinds of call-handling node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Menu,
    Extension,
    Group,
    Ai,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Menu,
        NodeKind::Extension,
        NodeKind::Group,
        NodeKind::Ai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Menu => "menu",
            NodeKind::Extension => "extension",
            NodeKind::Group => "group",
            NodeKind::Ai => "ai",
        }
    }

    /// Menus branch on DTMF keys; every other kind has a single `next` branch.
    pub fn is_branching(&self) -> bool {
        matches!(self, NodeKind::Menu)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownKind(s.to_string()))
    }
}

/// Value type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    /// Ordered list of `{ key, label }` menu options.
    OptionList,
    /// One of the listed literal strings.
    Enum(&'static [&'static str]),
}

/// Describes one field of a kind's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    /// JSON text of the default value, `None` when the field defaults to absent.
    pub default: Option<&'static str>,
}

/// Field list of a node kind's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSchema {
    pub kind: NodeKind,
    pub fields: &'static [FieldSpec],
}

const fn field(
    name: &'static str,
    field_type: FieldType,
    required: bool,
    default: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        name,
        field_type,
        required,
        default,
    }
}

const DEFAULT_PROMPT: &str = "Please choose an option.";

const MENU_FIELDS: &[FieldSpec] = &[
    field(
        "promptText",
        FieldType::String,
        true,
        Some("\"Please choose an option.\""),
    ),
    field(
        "options",
        FieldType::OptionList,
        true,
        Some(r#"[{"key":"1","label":"Option 1"}]"#),
    ),
];

const EXTENSION_FIELDS: &[FieldSpec] = &[
    field("extensionNumber", FieldType::String, true, Some("\"\"")),
    field("displayName", FieldType::String, true, Some("\"\"")),
];

const GROUP_FIELDS: &[FieldSpec] = &[
    field("groupId", FieldType::String, true, Some("\"\"")),
    field("displayName", FieldType::String, true, Some("\"\"")),
    field(
        "strategy",
        FieldType::Enum(&["simultaneous", "sequential"]),
        true,
        Some("\"simultaneous\""),
    ),
];

const AI_FIELDS: &[FieldSpec] = &[
    field("projectId", FieldType::String, true, Some("\"\"")),
    field("agentId", FieldType::String, true, Some("\"\"")),
    field("sessionId", FieldType::String, false, None),
    field("webhookUrl", FieldType::String, false, None),
];

/// Returns the payload schema of a node kind.
pub fn describe(kind: NodeKind) -> PayloadSchema {
    let fields = match kind {
        NodeKind::Menu => MENU_FIELDS,
        NodeKind::Extension => EXTENSION_FIELDS,
        NodeKind::Group => GROUP_FIELDS,
        NodeKind::Ai => AI_FIELDS,
    };
    PayloadSchema { kind, fields }
}

/// Looks a kind up by its wire name and describes it.
pub fn describe_by_name(name: &str) -> Result<PayloadSchema, RegistryError> {
    name.parse().map(describe)
}

/// Default payload for a freshly created node of `kind`.
pub fn default_payload(kind: NodeKind) -> NodePayload {
    match kind {
        NodeKind::Menu => NodePayload::Menu(MenuPayload {
            prompt_text: DEFAULT_PROMPT.to_string(),
            options: vec![MenuOption {
                key: "1".to_string(),
                label: "Option 1".to_string(),
            }],
        }),
        NodeKind::Extension => NodePayload::Extension(ExtensionPayload {
            extension_number: String::new(),
            display_name: String::new(),
        }),
        NodeKind::Group => NodePayload::Group(GroupPayload {
            group_id: String::new(),
            display_name: String::new(),
            strategy: RingStrategy::default(),
        }),
        NodeKind::Ai => NodePayload::Ai(AiPayload {
            project_id: String::new(),
            agent_id: String::new(),
            session_id: None,
            webhook_url: None,
        }),
    }
}

/// Creates a node of `kind` with a fresh id and the kind's default payload.
pub fn create_default(kind: NodeKind) -> Node {
    Node::new(generate_node_id(kind), default_payload(kind))
}

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Builds an id from the kind name, the creation time and a process-wide sequence,
/// so two nodes created within the same millisecond still differ.
pub fn generate_node_id(kind: NodeKind) -> NodeId {
    generate_id(kind.as_str())
}

pub(crate) fn generate_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, millis, seq)
}

/// Whether `key` is a DTMF token a caller can dial: one or more of `0`-`9`, `*`, `#`.
pub fn is_dtmf_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_digit() || c == '*' || c == '#')
}
