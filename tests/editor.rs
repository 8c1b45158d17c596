//! Tests for the client-side node editing state.
mod common;
use common::*;
use ura::editor::EditorState;
use ura::prelude::*;

fn graph() -> FlowGraph {
    support_sales_flow().graph
}

#[test]
fn test_open_seeds_the_draft_with_the_current_payload() {
    let graph = graph();
    let mut editor = EditorState::new();

    editor.open(&graph, "support").expect("node exists");

    assert!(editor.is_open("support"));
    assert_eq!(
        editor.draft("support"),
        graph.node("support").map(|n| &n.payload)
    );
    assert_eq!(
        editor.open(&graph, "ghost"),
        Err(GraphError::NodeNotFound("ghost".to_string()))
    );
}

#[test]
fn test_draft_does_not_touch_the_graph_until_commit() {
    let mut graph = graph();
    let mut editor = EditorState::new();
    editor.open(&graph, "support").expect("node exists");

    let updated = extension("x", "2999", "Support (new)").payload;
    editor.set_draft("support", updated.clone());
    assert_ne!(graph.node("support").map(|n| &n.payload), Some(&updated));

    editor.commit(&mut graph, "support").expect("commit applies");

    assert_eq!(graph.node("support").map(|n| &n.payload), Some(&updated));
    assert!(!editor.is_open("support"));
    assert!(editor.get("support").is_none());
}

#[test]
fn test_cancel_discards_the_draft() {
    let mut graph = graph();
    let before = graph.clone();
    let mut editor = EditorState::new();
    editor.open(&graph, "main").expect("node exists");
    editor.set_draft("main", menu("x", "changed", &[("1", "One"), ("2", "Two")]).payload);

    editor.cancel("main");
    editor.commit(&mut graph, "main").expect("nothing to commit");

    assert_eq!(graph, before);
    assert!(editor.draft("main").is_none());
}

#[test]
fn test_rejected_commit_keeps_the_draft() {
    let mut graph = graph();
    let mut editor = EditorState::new();
    // Key 1 is wired to the support extension.
    let draft = menu("x", "Sales only", &[("2", "Sales")]).payload;
    editor.set_draft("main", draft.clone());

    let result = editor.commit(&mut graph, "main");

    assert!(matches!(result, Err(GraphError::HandleInUse { .. })));
    assert_eq!(editor.draft("main"), Some(&draft));
}

#[test]
fn test_retain_existing_forgets_removed_nodes() {
    let mut graph = graph();
    let mut editor = EditorState::new();
    editor.open(&graph, "support").expect("node exists");
    editor.open(&graph, "main").expect("node exists");

    graph.remove_node("support").expect("node exists");
    editor.retain_existing(&graph);

    assert!(!editor.is_open("support"));
    assert!(editor.is_open("main"));
}
