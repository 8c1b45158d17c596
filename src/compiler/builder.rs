use crate::flow::{Branch, Flow, Node, NodePayload};
use crate::plan::{AiStep, ExtensionStep, GroupStep, KeyRoute, MenuStep, RoutingStep, StepId};
use ahash::AHashSet;

/// Walks a validated flow depth-first from its entry and emits one step per node.
pub(super) struct PlanBuilder<'a> {
    flow: &'a Flow,
}

impl<'a> PlanBuilder<'a> {
    pub(super) fn new(flow: &'a Flow) -> Self {
        Self { flow }
    }

    /// Steps in first-visit order. A node reached again is only referenced by id,
    /// which is what lets cycles compile.
    pub(super) fn build_steps(&self) -> Vec<RoutingStep> {
        let mut steps = Vec::new();
        let mut visited: AHashSet<&'a str> = AHashSet::new();
        let mut stack: Vec<&'a str> = vec![self.flow.entry_node_id.as_str()];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.flow.graph.node(id) else {
                continue;
            };
            steps.push(self.lower(node));
            // Reversed so the first successor is popped, and thus visited, first.
            for next in self.successors(node).into_iter().rev() {
                if !visited.contains(next) {
                    stack.push(next);
                }
            }
        }
        steps
    }

    /// Successors in branch declaration order: menu keys as listed, then timeout,
    /// then invalid; the single next node otherwise. Storage order never matters.
    fn successors(&self, node: &'a Node) -> Vec<&'a str> {
        match &node.payload {
            NodePayload::Menu(menu) => menu
                .options
                .iter()
                .map(|o| Branch::Key(o.key.clone()))
                .chain([Branch::Timeout, Branch::Invalid])
                .filter_map(|branch| self.target(node, &branch))
                .collect(),
            _ => self.target(node, &Branch::Next).into_iter().collect(),
        }
    }

    fn target(&self, node: &'a Node, branch: &Branch) -> Option<&'a str> {
        let kind = node.kind();
        self.flow
            .graph
            .outgoing_edges(&node.id)
            .find(|e| e.branch(kind) == *branch)
            .map(|e| e.target_node_id.as_str())
    }

    fn step_ref(&self, node: &'a Node, branch: &Branch) -> Option<StepId> {
        self.target(node, branch).map(str::to_string)
    }

    fn lower(&self, node: &'a Node) -> RoutingStep {
        let id = node.id.clone();
        match &node.payload {
            NodePayload::Menu(menu) => RoutingStep::Menu(MenuStep {
                id,
                prompt_text: menu.prompt_text.clone(),
                routes: menu
                    .options
                    .iter()
                    .map(|o| KeyRoute {
                        key: o.key.clone(),
                        label: o.label.clone(),
                        target: self.step_ref(node, &Branch::Key(o.key.clone())),
                    })
                    .collect(),
                timeout: self.step_ref(node, &Branch::Timeout),
                invalid: self.step_ref(node, &Branch::Invalid),
            }),
            NodePayload::Extension(ext) => RoutingStep::Extension(ExtensionStep {
                id,
                extension_number: ext.extension_number.clone(),
                display_name: ext.display_name.clone(),
                next: self.step_ref(node, &Branch::Next),
            }),
            NodePayload::Group(group) => RoutingStep::Group(GroupStep {
                id,
                group_id: group.group_id.clone(),
                display_name: group.display_name.clone(),
                strategy: group.strategy,
                next: self.step_ref(node, &Branch::Next),
            }),
            NodePayload::Ai(ai) => RoutingStep::Ai(AiStep {
                id,
                project_id: ai.project_id.clone(),
                agent_id: ai.agent_id.clone(),
                session_id: ai.session_id.clone(),
                webhook_url: ai.webhook_url.clone(),
                next: self.step_ref(node, &Branch::Next),
            }),
        }
    }
}
