//! Tests for structural validation and the diagnostics it reports.
mod common;
use common::*;
use pretty_assertions::assert_eq;
use ura::prelude::*;

fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn test_clean_flow_has_no_diagnostics() {
    let report = validate(&reception_flow());

    assert!(report.is_valid());
    assert!(!report.has_warnings());
    assert_eq!(report.flow_id, FLOW_ID);
}

#[test]
fn test_empty_flow_reports_no_entry_node() {
    let flow = flow_from(FlowGraph::new(), "");
    let report = validate(&flow);

    assert_eq!(kinds(&report.errors), vec![DiagnosticKind::NoEntryNode]);
    assert!(report.errors[0].node_ids.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_missing_entry_node_is_an_error() {
    let graph = build_graph(vec![extension("a", "100", "A")], vec![]);
    let report = validate(&flow_from(graph, "removed"));

    assert_eq!(kinds(&report.errors), vec![DiagnosticKind::NoEntryNode]);
    assert_eq!(report.errors[0].node_ids, vec!["removed".to_string()]);
    // Reachability is not judged without an entry.
    assert_eq!(report.count(DiagnosticKind::UnreachableNode), 0);
}

#[test]
fn test_support_sales_dead_end_is_a_single_warning() {
    let report = validate(&support_sales_flow());

    assert!(report.is_valid());
    assert_eq!(kinds(&report.warnings), vec![DiagnosticKind::DeadEndOption]);
    let warning = &report.warnings[0];
    assert_eq!(warning.node_ids, vec!["main".to_string()]);
    assert_eq!(warning.handle.as_deref(), Some("2"));
    assert_eq!(warning.severity(), Severity::Warning);
}

#[test]
fn test_dangling_edge_is_always_an_error() {
    let flow = Flow::from_json(DANGLING_EDGE_DOCUMENT).expect("document parses");
    let report = validate(&flow);

    assert!(!report.is_valid());
    assert_eq!(kinds(&report.errors), vec![DiagnosticKind::DanglingEdge]);
    let error = &report.errors[0];
    assert_eq!(error.edge_ids, vec!["e1".to_string()]);
    assert_eq!(error.node_ids, vec!["ghost".to_string()]);
}

#[test]
fn test_document_level_handle_problems_are_reported() {
    let json = r#"{
        "id": "f", "tenantId": "t", "name": "n", "entryNodeId": "main", "version": 0,
        "nodes": [
            { "id": "main", "kind": "menu",
              "payload": { "promptText": "p", "options": [{ "key": "1", "label": "One" }] } },
            { "id": "a", "kind": "extension",
              "payload": { "extensionNumber": "100", "displayName": "A" } },
            { "id": "b", "kind": "extension",
              "payload": { "extensionNumber": "200", "displayName": "B" } }
        ],
        "edges": [
            { "id": "e1", "sourceNodeId": "main", "sourceHandle": "1", "targetNodeId": "a" },
            { "id": "e2", "sourceNodeId": "main", "sourceHandle": "1", "targetNodeId": "b" },
            { "id": "e3", "sourceNodeId": "main", "sourceHandle": "7", "targetNodeId": "b" },
            { "id": "e4", "sourceNodeId": "a", "sourceHandle": null, "targetNodeId": "b" },
            { "id": "e5", "sourceNodeId": "a", "sourceHandle": "default", "targetNodeId": "main" },
            { "id": "e6", "sourceNodeId": "b", "sourceHandle": "timeout", "targetNodeId": "main" }
        ]
    }"#;
    let report = validate(&Flow::from_json(json).expect("document parses"));

    assert_eq!(
        kinds(&report.errors),
        vec![
            DiagnosticKind::TooManyOutgoingEdges,
            DiagnosticKind::InvalidHandle,
            DiagnosticKind::InvalidHandle,
            DiagnosticKind::DuplicateHandle,
        ]
    );

    let too_many = &report.errors[0];
    assert_eq!(too_many.node_ids, vec!["a".to_string()]);
    assert_eq!(too_many.edge_ids, vec!["e4".to_string(), "e5".to_string()]);

    assert_eq!(report.errors[1].edge_ids, vec!["e6".to_string()]);
    assert_eq!(report.errors[1].handle.as_deref(), Some("timeout"));
    assert_eq!(report.errors[2].edge_ids, vec!["e3".to_string()]);
    assert_eq!(report.errors[2].handle.as_deref(), Some("7"));

    let duplicate = &report.errors[3];
    assert_eq!(duplicate.handle.as_deref(), Some("1"));
    assert_eq!(duplicate.edge_ids, vec!["e1".to_string(), "e2".to_string()]);
}

#[test]
fn test_invalid_option_keys_in_documents_are_reported() {
    let json = r#"{
        "id": "f", "tenantId": "t", "name": "n", "entryNodeId": "main", "version": 0,
        "nodes": [
            { "id": "main", "kind": "menu",
              "payload": { "promptText": "p", "options": [
                  { "key": "1", "label": "One" },
                  { "key": "x", "label": "Bad" },
                  { "key": "1", "label": "Again" }
              ] } }
        ],
        "edges": []
    }"#;
    let report = validate(&Flow::from_json(json).expect("document parses"));

    assert_eq!(report.count(DiagnosticKind::InvalidOptionKey), 2);
    let handles: Vec<_> = report
        .errors
        .iter()
        .filter_map(|d| d.handle.as_deref())
        .collect();
    assert_eq!(handles, vec!["x", "1"]);
}

#[test]
fn test_unreachable_nodes_are_warnings() {
    let mut graph = build_graph(reception_nodes(), reception_edges());
    graph
        .add_node(extension("orphan-b", "9001", "Nobody"))
        .expect("fresh id");
    graph
        .add_node(extension("orphan-a", "9002", "Nobody"))
        .expect("fresh id");
    let report = validate(&flow_from(graph, "main"));

    assert!(report.is_valid());
    let unreachable: Vec<_> = report
        .warnings
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnreachableNode)
        .flat_map(|d| d.node_ids.clone())
        .collect();
    assert_eq!(unreachable, vec!["orphan-a".to_string(), "orphan-b".to_string()]);
}

#[test]
fn test_menu_only_flow_has_no_terminal_path() {
    let graph = build_graph(
        vec![menu("main", "Press 1 to repeat", &[("1", "Repeat")])],
        vec![edge("e1", "main", Some("1"), "main")],
    );
    let report = validate(&flow_from(graph, "main"));

    assert!(report.is_valid());
    assert_eq!(kinds(&report.warnings), vec![DiagnosticKind::NoTerminalPath]);
}

#[test]
fn test_diagnostic_order_does_not_depend_on_insertion_order() {
    let mut nodes = reception_nodes();
    nodes.push(extension("zz-orphan", "1", "x"));
    nodes.push(extension("aa-orphan", "2", "y"));
    let mut edges = reception_edges();
    edges.retain(|e| e.id != "e-main-2" && e.id != "e-billing-1");

    let forward = validate(&flow_from(build_graph(nodes.clone(), edges.clone()), "main"));
    nodes.reverse();
    edges.reverse();
    let backward = validate(&flow_from(build_graph(nodes, edges), "main"));

    assert_eq!(forward, backward);
    assert_eq!(forward.warnings.len(), 6);
}

#[test]
fn test_report_is_tied_to_the_flow_state() {
    let mut flow = support_sales_flow();
    let report = validate(&flow);
    assert!(report.matches(&flow));

    flow.graph
        .update_position("main", Position { x: 5.0, y: 5.0 })
        .expect("node exists");
    flow.version += 1;
    assert!(report.matches(&flow), "positions and versions are not structural");

    flow.graph
        .add_node(extension("sales", "2002", "Sales"))
        .expect("fresh id");
    assert!(!report.matches(&flow));
}

#[test]
fn test_report_serializes_for_the_editor() {
    let report = validate(&support_sales_flow());
    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["errors"], serde_json::json!([]));
    assert_eq!(json["warnings"][0]["kind"], "DeadEndOption");
    assert_eq!(json["warnings"][0]["nodeIds"], serde_json::json!(["main"]));
    assert_eq!(json["warnings"][0]["handle"], "2");
}
