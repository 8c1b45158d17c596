//! Common test utilities for building call flows.
use ura::prelude::*;

pub const TENANT: &str = "tenant-a";
pub const FLOW_ID: &str = "flow-test";

/// A menu node with the given `(key, label)` options.
#[allow(dead_code)]
pub fn menu(id: &str, prompt: &str, options: &[(&str, &str)]) -> Node {
    Node::new(
        id,
        NodePayload::Menu(MenuPayload {
            prompt_text: prompt.to_string(),
            options: options
                .iter()
                .map(|(key, label)| MenuOption {
                    key: key.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }),
    )
}

#[allow(dead_code)]
pub fn extension(id: &str, number: &str, name: &str) -> Node {
    Node::new(
        id,
        NodePayload::Extension(ExtensionPayload {
            extension_number: number.to_string(),
            display_name: name.to_string(),
        }),
    )
}

#[allow(dead_code)]
pub fn group(id: &str, group_id: &str, name: &str, strategy: RingStrategy) -> Node {
    Node::new(
        id,
        NodePayload::Group(GroupPayload {
            group_id: group_id.to_string(),
            display_name: name.to_string(),
            strategy,
        }),
    )
}

#[allow(dead_code)]
pub fn ai(id: &str, project_id: &str, agent_id: &str) -> Node {
    Node::new(
        id,
        NodePayload::Ai(AiPayload {
            project_id: project_id.to_string(),
            agent_id: agent_id.to_string(),
            session_id: None,
            webhook_url: None,
        }),
    )
}

#[allow(dead_code)]
pub fn edge(id: &str, source: &str, handle: Option<&str>, target: &str) -> Edge {
    Edge::new(id, source, handle, target)
}

/// Wraps a graph into a flow owned by [`TENANT`] with id [`FLOW_ID`].
#[allow(dead_code)]
pub fn flow_from(graph: FlowGraph, entry: &str) -> Flow {
    FlowDraft::from_graph("Main line", entry, graph)
        .into_flow(FLOW_ID.to_string(), TenantId::new(TENANT))
}

/// Builds a graph with edge-time checks, panicking on any rejected mutation.
#[allow(dead_code)]
pub fn build_graph(nodes: Vec<Node>, edges: Vec<Edge>) -> FlowGraph {
    let mut graph = FlowGraph::new();
    for node in nodes {
        graph.add_node(node).expect("Failed to add node");
    }
    for edge in edges {
        graph.add_edge(edge).expect("Failed to add edge");
    }
    graph
}

/// "For support press 1, for sales press 2", with key 2 left unwired.
#[allow(dead_code)]
pub fn support_sales_flow() -> Flow {
    let graph = build_graph(
        vec![
            menu(
                "main",
                "For support press 1, for sales press 2",
                &[("1", "Support"), ("2", "Sales")],
            ),
            extension("support", "2001", "Support desk"),
        ],
        vec![edge("e1", "main", Some("1"), "support")],
    );
    flow_from(graph, "main")
}

/// Every node kind, a nested menu, timeout and invalid handlers, and a loop back
/// to the main menu.
#[allow(dead_code)]
pub fn reception_nodes() -> Vec<Node> {
    vec![
        menu(
            "main",
            "Welcome. Support 1, sales 2, billing 3",
            &[("1", "Support"), ("2", "Sales"), ("3", "Billing")],
        )
        .with_position(0.0, 0.0),
        extension("support", "2001", "Support desk").with_position(-200.0, 150.0),
        group("sales", "grp-sales", "Sales team", RingStrategy::Sequential)
            .with_position(0.0, 150.0),
        menu(
            "billing",
            "Invoices 1, back to main menu 9",
            &[("1", "Invoices"), ("9", "Main menu")],
        )
        .with_position(200.0, 150.0),
        extension("invoices", "3001", "Invoices").with_position(200.0, 300.0),
        ai("assistant", "proj-1", "reception-agent").with_position(-200.0, 0.0),
        extension("operator", "1000", "Operator").with_position(0.0, 450.0),
    ]
}

#[allow(dead_code)]
pub fn reception_edges() -> Vec<Edge> {
    vec![
        edge("e-main-1", "main", Some("1"), "support"),
        edge("e-main-2", "main", Some("2"), "sales"),
        edge("e-main-3", "main", Some("3"), "billing"),
        edge("e-main-timeout", "main", Some("timeout"), "assistant"),
        edge("e-main-invalid", "main", Some("invalid"), "main"),
        edge("e-billing-1", "billing", Some("1"), "invoices"),
        edge("e-billing-9", "billing", Some("9"), "main"),
        edge("e-sales-next", "sales", None, "operator"),
        edge("e-assistant-next", "assistant", Some("default"), "operator"),
    ]
}

#[allow(dead_code)]
pub fn reception_flow() -> Flow {
    flow_from(build_graph(reception_nodes(), reception_edges()), "main")
}

/// A flow document in the JSON resource shape, with one dangling edge.
#[allow(dead_code)]
pub const DANGLING_EDGE_DOCUMENT: &str = r#"{
    "id": "flow-dangling",
    "tenantId": "tenant-a",
    "name": "Broken",
    "entryNodeId": "main",
    "version": 2,
    "nodes": [
        {
            "id": "main",
            "kind": "menu",
            "payload": {
                "promptText": "Press 1",
                "options": [{ "key": "1", "label": "Support" }]
            },
            "position": { "x": 10.0, "y": 20.0 }
        }
    ],
    "edges": [
        { "id": "e1", "sourceNodeId": "main", "sourceHandle": "1", "targetNodeId": "ghost" }
    ]
}"#;
