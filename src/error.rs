use crate::validator::ValidationReport;
use thiserror::Error;

/// Errors raised by the node type registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown node kind '{0}', expected one of: menu, extension, group, ai")]
    UnknownKind(String),
}

/// Errors raised by the graph model mutators. A failed mutation leaves the graph unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("A {entity} with id '{id}' already exists in this flow")]
    DuplicateId { entity: &'static str, id: String },

    #[error("Node '{0}' not found in this flow")]
    NodeNotFound(String),

    #[error("Edge '{0}' not found in this flow")]
    EdgeNotFound(String),

    #[error("Node '{node_id}' already has an outgoing edge on handle '{handle}'")]
    DuplicateHandle { node_id: String, handle: String },

    #[error("Handle '{handle}' is not valid for {kind} node '{node_id}'")]
    InvalidHandle {
        node_id: String,
        kind: &'static str,
        handle: String,
    },

    #[error("Menu node '{node_id}' has an invalid option key '{key}': {message}")]
    InvalidOptionKey {
        node_id: String,
        key: String,
        message: String,
    },

    #[error("Node '{node_id}' is a {expected} node and cannot take a {found} payload")]
    KindMismatch {
        node_id: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Option key '{key}' of menu node '{node_id}' is still used by edge '{edge_id}'")]
    HandleInUse {
        node_id: String,
        key: String,
        edge_id: String,
    },
}

/// Errors that reject an externally supplied flow document as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}': {source}")]
    UnknownKind {
        node_id: String,
        source: RegistryError,
    },

    #[error("Node '{node_id}' has a malformed {kind} payload: {message}")]
    MalformedPayload {
        node_id: String,
        kind: &'static str,
        message: String,
    },

    #[error("Duplicate {entity} id '{id}' in flow document")]
    DuplicateId { entity: &'static str, id: String },
}

/// Errors raised when a flow is handed to the compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Flow '{flow_id}' is not validated: {error_count} structural error(s) must be fixed first")]
    NotValidated { flow_id: String, error_count: usize },

    #[error("Validation report does not belong to the current state of flow '{flow_id}'")]
    StaleReport { flow_id: String },
}

/// Errors raised while encoding, decoding or storing routing plan artifacts.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Artifact error: {0}")]
    Generic(String),
}

/// Errors raised by a flow persistence backend.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Flow '{name}' not found for tenant '{tenant_id}'")]
    NotFound { tenant_id: String, name: String },

    #[error("Flow '{name}' already exists for tenant '{tenant_id}'")]
    AlreadyExists { tenant_id: String, name: String },

    #[error(
        "Version conflict on flow '{name}': caller holds version {expected}, stored version is {found}. Reload before saving again"
    )]
    Conflict {
        name: String,
        expected: u64,
        found: u64,
    },

    #[error("Stored flow '{name}' has id '{stored_id}', but the saved flow has id '{given_id}'")]
    IdMismatch {
        name: String,
        stored_id: String,
        given_id: String,
    },

    #[error("Flow '{name}' is at the highest possible version and cannot be saved again")]
    VersionExhausted { name: String },

    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors returned by the external telephony engine collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Routing plan rejected by the telephony engine: {0}")]
    Rejected(String),
}

/// Errors returned by an audit sink. They never fail the primary action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the flow service to its caller.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("Flow '{name}' has {} structural error(s)", .report.errors.len())]
    Invalid {
        name: String,
        report: ValidationReport,
    },

    #[error("Flow '{name}' has {} warning(s) and the publish policy rejects warnings", .report.warnings.len())]
    WarningsRejected {
        name: String,
        report: ValidationReport,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Errors raised while loading console configuration.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
