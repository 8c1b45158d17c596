//! # Ura - IVR Call-Flow Builder Core
//!
//! **Ura** is the core of a visual IVR ("URA") call-flow builder. Tenants draw call
//! flows as directed graphs of typed nodes: DTMF menus, extensions, ring groups and
//! AI agents. Ura models those graphs, validates them, compiles them into
//! deterministic routing plans for a telephony engine, and persists them per tenant
//! with optimistic concurrency.
//!
//! ## Core Workflow
//!
//! 1.  **Edit**: Build a [`flow::FlowGraph`] in memory. Structural mistakes that can be
//!     caught at edit time (duplicate ids, a menu key wired twice) are rejected there.
//! 2.  **Validate**: [`validator::validate`] returns every problem at once, split into
//!     errors that block saving and warnings that do not.
//! 3.  **Compile**: [`compiler::compile`] turns a flow with an error-free report into a
//!     [`plan::RoutingPlan`]. Equal flows always produce byte-identical plans.
//! 4.  **Persist and publish**: [`service::FlowService`] ties a [`store::FlowStore`], a
//!     [`service::Publisher`] and an audit sink together.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ura::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut graph = FlowGraph::new();
//!     graph.add_node(Node::new(
//!         "main",
//!         NodePayload::Menu(MenuPayload {
//!             prompt_text: "For support press 1".to_string(),
//!             options: vec![MenuOption { key: "1".to_string(), label: "Support".to_string() }],
//!         }),
//!     ))?;
//!     graph.add_node(Node::new(
//!         "support",
//!         NodePayload::Extension(ExtensionPayload {
//!             extension_number: "2001".to_string(),
//!             display_name: "Support desk".to_string(),
//!         }),
//!     ))?;
//!     graph.add_edge(Edge::new("e1", "main", Some("1"), "support"))?;
//!
//!     let flow = FlowDraft::from_graph("Main line", "main", graph)
//!         .into_flow("flow-1".to_string(), TenantId::new("acme"));
//!     let report = validate(&flow);
//!     let plan = compile(&flow, &report)?;
//!     println!("{}", visualize_plan(&plan));
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod editor;
pub mod error;
pub mod flow;
pub mod plan;
pub mod prelude;
pub mod service;
pub mod store;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod validator;
