pub mod document;
pub mod edge;
pub mod graph;
pub mod model;
pub mod node;
pub mod registry;

pub use document::*;
pub use edge::*;
pub use graph::FlowGraph;
pub use model::*;
pub use node::*;
pub use registry::{
    FieldSpec, FieldType, HANDLE_DEFAULT, HANDLE_INVALID, HANDLE_TIMEOUT, NodeKind, PayloadSchema,
    create_default, describe, describe_by_name, is_dtmf_key,
};
