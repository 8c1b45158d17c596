//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build, validate, compile and store flows.
//!
//! ```rust
//! use ura::prelude::*;
//!
//! let draft = FlowDraft::new("Main line", NodeKind::Menu);
//! let flow = draft.into_flow("flow-1".to_string(), TenantId::new("acme"));
//! let report = validate(&flow);
//! assert!(report.is_valid());
//! ```

// Graph model
pub use crate::flow::{
    Edge, Flow, FlowDraft, FlowGraph, MenuOption, MenuPayload, Node, NodeKind, NodePayload,
    Position, TenantId,
};
pub use crate::flow::{AiPayload, ExtensionPayload, GroupPayload, RingStrategy};

// Validation and compilation
pub use crate::compiler::{Compiler, ValidatedFlow, compile};
pub use crate::plan::{PlanArtifact, RoutingPlan, RoutingStep, visualize_plan};
pub use crate::validator::{Diagnostic, DiagnosticKind, Severity, ValidationReport, validate};

// Persistence and publishing
pub use crate::config::{ConsoleConfig, PublishPolicy};
pub use crate::service::{DirectoryPublisher, FlowService, Publisher};
pub use crate::store::{FlowStore, InMemoryFlowStore, JsonFileStore};

// Error types
pub use crate::error::{CompileError, GraphError, ServiceError, StoreError};
