//! Structural validation of a flow snapshot.
//!
//! [`validate`] is pure: it reads a [`Flow`] and returns every problem it finds,
//! split into errors (block compiling and publishing) and warnings (surfaced to the
//! editor, never blocking a draft save). Nothing is repaired. Output order depends
//! only on node and edge ids, never on insertion order.

mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};

use crate::flow::graph::menu_key_problems;
use crate::flow::{Branch, Edge, Flow, Node, NodeKind, NodePayload};
use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

/// Result of validating one flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub flow_id: String,
    /// [`Flow::fingerprint`] of the validated snapshot.
    pub fingerprint: u64,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// A flow with zero errors is valid and may be compiled.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether this report was computed for the current state of `flow`.
    pub fn matches(&self, flow: &Flow) -> bool {
        self.flow_id == flow.id && self.fingerprint == flow.fingerprint()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics().filter(|d| d.kind == kind).count()
    }
}

/// Checks a flow against every structural invariant.
pub fn validate(flow: &Flow) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let graph = &flow.graph;

    let entry = check_entry(flow, &mut errors);
    check_dangling_edges(flow, &mut errors);

    let nodes: Vec<&Node> = graph
        .nodes()
        .iter()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect();

    for node in &nodes {
        let outgoing: Vec<&Edge> = graph
            .outgoing_edges(&node.id)
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();
        match &node.payload {
            NodePayload::Menu(menu) => {
                for (key, problem) in menu_key_problems(menu) {
                    errors.push(
                        Diagnostic::new(
                            DiagnosticKind::InvalidOptionKey,
                            format!("Menu '{}' option key '{}' is {}", node.id, key, problem),
                        )
                        .with_node(&node.id)
                        .with_handle(key),
                    );
                }
                check_menu_edges(node, &outgoing, &mut errors, &mut warnings);
            }
            _ => check_single_exit(node, &outgoing, &mut errors),
        }
    }

    if let Some(entry) = entry {
        let reachable = graph.reachable_from(&entry.id);
        for node in nodes.iter().filter(|n| !reachable.contains(&n.id)) {
            warnings.push(
                Diagnostic::new(
                    DiagnosticKind::UnreachableNode,
                    format!("Node '{}' cannot be reached from entry '{}'", node.id, entry.id),
                )
                .with_node(&node.id),
            );
        }
        let terminates = reachable
            .iter()
            .filter_map(|id| graph.node(id))
            .any(|n| n.kind() != NodeKind::Menu);
        if !terminates {
            warnings.push(
                Diagnostic::new(
                    DiagnosticKind::NoTerminalPath,
                    format!(
                        "No path from entry '{}' leaves the menus; callers can never be transferred",
                        entry.id
                    ),
                )
                .with_node(&entry.id),
            );
        }
    }

    debug!(
        flow_id = %flow.id,
        errors = errors.len(),
        warnings = warnings.len(),
        "Validated flow"
    );

    ValidationReport {
        flow_id: flow.id.clone(),
        fingerprint: flow.fingerprint(),
        errors,
        warnings,
    }
}

fn check_entry<'a>(flow: &'a Flow, errors: &mut Vec<Diagnostic>) -> Option<&'a Node> {
    if flow.graph.is_empty() {
        errors.push(Diagnostic::new(
            DiagnosticKind::NoEntryNode,
            "Flow has no nodes, so it has no entry node",
        ));
        return None;
    }
    let entry = flow.entry_node();
    if entry.is_none() {
        errors.push(
            Diagnostic::new(
                DiagnosticKind::NoEntryNode,
                format!("Entry node '{}' does not exist in this flow", flow.entry_node_id),
            )
            .with_node(&flow.entry_node_id),
        );
    }
    entry
}

fn check_dangling_edges(flow: &Flow, errors: &mut Vec<Diagnostic>) {
    let graph = &flow.graph;
    for edge in graph.edges().iter().sorted_by(|a, b| a.id.cmp(&b.id)) {
        let missing: Vec<&str> = [&edge.source_node_id, &edge.target_node_id]
            .into_iter()
            .filter(|id| !graph.contains_node(id))
            .map(String::as_str)
            .dedup()
            .collect();
        if missing.is_empty() {
            continue;
        }
        let mut diagnostic = Diagnostic::new(
            DiagnosticKind::DanglingEdge,
            format!(
                "Edge '{}' references missing node(s): {}",
                edge.id,
                missing.iter().join(", ")
            ),
        )
        .with_edges([edge.id.as_str()]);
        for id in missing {
            diagnostic = diagnostic.with_node(id);
        }
        errors.push(diagnostic);
    }
}

fn check_menu_edges(
    node: &Node,
    outgoing: &[&Edge],
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
) {
    let Some(menu) = node.payload.as_menu() else {
        return;
    };

    let mut by_branch: Vec<(Branch, &Edge)> = Vec::new();
    for edge in outgoing {
        let branch = edge.branch(NodeKind::Menu);
        let offered = match &branch {
            Branch::Key(key) => menu.option(key).is_some(),
            Branch::Timeout | Branch::Invalid => true,
            Branch::Next | Branch::Unknown(_) => false,
        };
        if offered {
            by_branch.push((branch, *edge));
        } else {
            errors.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidHandle,
                    format!(
                        "Edge '{}' leaves menu '{}' on handle '{}', which is neither an option key nor 'timeout'/'invalid'",
                        edge.id,
                        node.id,
                        edge.source_handle.as_deref().unwrap_or("null")
                    ),
                )
                .with_node(&node.id)
                .with_edges([edge.id.as_str()])
                .with_handle(edge.source_handle.as_deref().unwrap_or("null")),
            );
        }
    }

    for (branch, edges) in &by_branch
        .iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .chunk_by(|(branch, _)| branch.clone())
    {
        let edge_ids: Vec<&str> = edges.map(|(_, e)| e.id.as_str()).collect();
        if edge_ids.len() > 1 {
            errors.push(
                Diagnostic::new(
                    DiagnosticKind::DuplicateHandle,
                    format!(
                        "Menu '{}' has {} edges on handle '{}': {}",
                        node.id,
                        edge_ids.len(),
                        branch.label(),
                        edge_ids.iter().join(", ")
                    ),
                )
                .with_node(&node.id)
                .with_edges(edge_ids)
                .with_handle(branch.label()),
            );
        }
    }

    for option in &menu.options {
        let wired = by_branch
            .iter()
            .any(|(branch, _)| matches!(branch, Branch::Key(key) if *key == option.key));
        if !wired {
            warnings.push(
                Diagnostic::new(
                    DiagnosticKind::DeadEndOption,
                    format!(
                        "Option '{}' ({}) of menu '{}' has no outgoing edge",
                        option.key, option.label, node.id
                    ),
                )
                .with_node(&node.id)
                .with_handle(&option.key),
            );
        }
    }
}

fn check_single_exit(node: &Node, outgoing: &[&Edge], errors: &mut Vec<Diagnostic>) {
    let kind = node.kind();
    for edge in outgoing {
        if let Branch::Unknown(handle) = edge.branch(kind) {
            errors.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidHandle,
                    format!(
                        "Edge '{}' leaves {} node '{}' on handle '{}'; only null or 'default' is allowed",
                        edge.id, kind, node.id, handle
                    ),
                )
                .with_node(&node.id)
                .with_edges([edge.id.as_str()])
                .with_handle(handle),
            );
        }
    }
    if outgoing.len() > 1 {
        errors.push(
            Diagnostic::new(
                DiagnosticKind::TooManyOutgoingEdges,
                format!(
                    "{} node '{}' has {} outgoing edges; at most one is allowed",
                    kind,
                    node.id,
                    outgoing.len()
                ),
            )
            .with_node(&node.id)
            .with_edges(outgoing.iter().map(|e| e.id.as_str())),
        );
    }
}
