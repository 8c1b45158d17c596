use super::{RoutingPlan, RoutingStep};
use std::fmt::{self, Write};

/// Formats a routing plan into a human-readable listing.
pub fn visualize_plan(plan: &RoutingPlan) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_plan(&mut output, plan);
    output
}

fn write_plan(output: &mut String, plan: &RoutingPlan) -> fmt::Result {
    writeln!(
        output,
        "======== ROUTING PLAN for Flow: {} (tenant {}) ========",
        plan.flow_name, plan.tenant_id
    )?;
    writeln!(output, "ENTRY -> {}", plan.entry_step)?;

    for (i, step) in plan.steps.iter().enumerate() {
        write!(output, "\n{:04}: ", i)?;
        match step {
            RoutingStep::Menu(menu) => {
                writeln!(output, "{:<10} {} \"{}\"", "MENU", menu.id, menu.prompt_text)?;
                for route in &menu.routes {
                    writeln!(
                        output,
                        "      key {:<4} {:<20} -> {}",
                        route.key,
                        route.label,
                        target(route.target.as_deref())
                    )?;
                }
                writeln!(
                    output,
                    "      {:<29} -> {}",
                    "timeout",
                    repeat_or(menu.timeout.as_deref())
                )?;
                writeln!(
                    output,
                    "      {:<29} -> {}",
                    "invalid",
                    repeat_or(menu.invalid.as_deref())
                )?;
            }
            RoutingStep::Extension(ext) => {
                writeln!(
                    output,
                    "{:<10} {} ext {} ({}) -> {}",
                    "EXTENSION",
                    ext.id,
                    ext.extension_number,
                    ext.display_name,
                    target(ext.next.as_deref())
                )?;
            }
            RoutingStep::Group(group) => {
                writeln!(
                    output,
                    "{:<10} {} group {} ({}, {:?}) -> {}",
                    "GROUP",
                    group.id,
                    group.group_id,
                    group.display_name,
                    group.strategy,
                    target(group.next.as_deref())
                )?;
            }
            RoutingStep::Ai(ai) => {
                writeln!(
                    output,
                    "{:<10} {} agent {}/{} -> {}",
                    "AI",
                    ai.id,
                    ai.project_id,
                    ai.agent_id,
                    target(ai.next.as_deref())
                )?;
            }
        }
    }

    writeln!(output, "\n================ END OF PLAN ================")
}

fn target(id: Option<&str>) -> &str {
    id.unwrap_or("HANGUP")
}

fn repeat_or(id: Option<&str>) -> &str {
    id.unwrap_or("REPEAT")
}
