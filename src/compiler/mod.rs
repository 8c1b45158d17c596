use crate::error::CompileError;
use crate::flow::Flow;
use crate::plan::RoutingPlan;
use crate::validator::ValidationReport;
use tracing::debug;

mod builder;

use builder::PlanBuilder;

/// A flow paired with proof that it validated without errors in its current state.
///
/// The compiler never re-validates; this type is the only way in.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedFlow<'a> {
    flow: &'a Flow,
}

impl<'a> ValidatedFlow<'a> {
    /// Accepts `flow` if `report` was computed for exactly this flow state and holds
    /// no errors. Warnings are allowed.
    pub fn new(flow: &'a Flow, report: &ValidationReport) -> Result<Self, CompileError> {
        if !report.matches(flow) {
            return Err(CompileError::StaleReport {
                flow_id: flow.id.clone(),
            });
        }
        if !report.is_valid() {
            return Err(CompileError::NotValidated {
                flow_id: flow.id.clone(),
                error_count: report.errors.len(),
            });
        }
        Ok(Self { flow })
    }

    pub fn flow(&self) -> &'a Flow {
        self.flow
    }
}

/// Turns a validated flow into a deterministic [`RoutingPlan`].
pub struct Compiler<'a> {
    flow: &'a Flow,
}

impl<'a> Compiler<'a> {
    pub fn new(validated: ValidatedFlow<'a>) -> Self {
        Self {
            flow: validated.flow,
        }
    }

    pub fn compile(&self) -> RoutingPlan {
        let steps = PlanBuilder::new(self.flow).build_steps();
        debug!(
            flow_id = %self.flow.id,
            steps = steps.len(),
            "Compiled routing plan"
        );
        RoutingPlan {
            tenant_id: self.flow.tenant_id.as_str().to_string(),
            flow_id: self.flow.id.clone(),
            flow_name: self.flow.name.clone(),
            entry_step: self.flow.entry_node_id.clone(),
            steps,
        }
    }
}

/// Compiles `flow` given the report the caller obtained from [`crate::validator::validate`].
pub fn compile(flow: &Flow, report: &ValidationReport) -> Result<RoutingPlan, CompileError> {
    let validated = ValidatedFlow::new(flow, report)?;
    Ok(Compiler::new(validated).compile())
}
