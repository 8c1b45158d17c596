//! The routing plan: the compiler's deterministic output, consumed by the telephony engine.

mod artifact;
mod visualizer;

pub use artifact::{PLAN_FORMAT_VERSION, PlanArtifact};
pub use visualizer::visualize_plan;

use crate::flow::RingStrategy;
use serde::{Deserialize, Serialize};

/// Steps are addressed by the id of the node they were compiled from.
pub type StepId = String;

/// An ordered list of routing steps, starting at `entry_step`.
///
/// Step order is the depth-first visiting order from the entry node, so the same
/// flow always produces the same plan, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingPlan {
    pub tenant_id: String,
    pub flow_id: String,
    pub flow_name: String,
    pub entry_step: StepId,
    pub steps: Vec<RoutingStep>,
}

impl RoutingPlan {
    pub fn step(&self, id: &str) -> Option<&RoutingStep> {
        self.steps.iter().find(|s| s.id() == id)
    }

    /// Canonical JSON form of the plan.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// One compiled node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingStep {
    Menu(MenuStep),
    Extension(ExtensionStep),
    Group(GroupStep),
    Ai(AiStep),
}

impl RoutingStep {
    pub fn id(&self) -> &str {
        match self {
            RoutingStep::Menu(s) => &s.id,
            RoutingStep::Extension(s) => &s.id,
            RoutingStep::Group(s) => &s.id,
            RoutingStep::Ai(s) => &s.id,
        }
    }

    /// Every step id this step can transfer control to, in declaration order.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            RoutingStep::Menu(s) => s
                .routes
                .iter()
                .filter_map(|r| r.target.as_deref())
                .chain(s.timeout.as_deref())
                .chain(s.invalid.as_deref())
                .collect(),
            RoutingStep::Extension(s) => s.next.as_deref().into_iter().collect(),
            RoutingStep::Group(s) => s.next.as_deref().into_iter().collect(),
            RoutingStep::Ai(s) => s.next.as_deref().into_iter().collect(),
        }
    }
}

/// Plays a prompt and branches on the digit the caller dials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuStep {
    pub id: StepId,
    pub prompt_text: String,
    pub routes: Vec<KeyRoute>,
    /// Where to go when the caller dials nothing. `None` repeats this step.
    pub timeout: Option<StepId>,
    /// Where to go when the caller dials an unknown key. `None` repeats this step.
    pub invalid: Option<StepId>,
}

impl MenuStep {
    pub fn route(&self, key: &str) -> Option<&KeyRoute> {
        self.routes.iter().find(|r| r.key == key)
    }
}

/// Target of one menu key. `target` is `None` for a key that leads nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRoute {
    pub key: String,
    pub label: String,
    pub target: Option<StepId>,
}

/// Transfers the call to one extension. `next == None` ends the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionStep {
    pub id: StepId,
    pub extension_number: String,
    pub display_name: String,
    pub next: Option<StepId>,
}

/// Rings a group of extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStep {
    pub id: StepId,
    pub group_id: String,
    pub display_name: String,
    pub strategy: RingStrategy,
    pub next: Option<StepId>,
}

/// Hands the call to a dialog agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStep {
    pub id: StepId,
    pub project_id: String,
    pub agent_id: String,
    pub session_id: Option<String>,
    pub webhook_url: Option<String>,
    pub next: Option<StepId>,
}
