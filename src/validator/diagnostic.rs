use serde::Serialize;
use std::fmt;

/// Whether a diagnostic blocks compilation and publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DiagnosticKind {
    // Errors
    NoEntryNode,
    DanglingEdge,
    InvalidOptionKey,
    InvalidHandle,
    DuplicateHandle,
    TooManyOutgoingEdges,
    // Warnings
    DeadEndOption,
    UnreachableNode,
    NoTerminalPath,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::DeadEndOption
            | DiagnosticKind::UnreachableNode
            | DiagnosticKind::NoTerminalPath => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One finding of the validator, pointing at the offending nodes and edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
    /// The option key or handle involved, when there is one.
    pub handle: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            node_ids: Vec::new(),
            edge_ids: Vec::new(),
            handle: None,
            message: message.into(),
        }
    }

    pub(crate) fn with_node(mut self, id: impl Into<String>) -> Self {
        self.node_ids.push(id.into());
        self
    }

    pub(crate) fn with_edges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub(crate) fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
