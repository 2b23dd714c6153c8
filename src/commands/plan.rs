//! `plan` - show what `apply` would change

use anyhow::Result;
use colored::Colorize;
use declarative::{ExecutionPlan, Resource, compute_diffs};
use std::collections::HashMap;

use super::Session;
use crate::Context;
use crate::resource::drift::Change;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>, jobs: usize) -> Result<()> {
    let session = Session::open(ctx)?;
    let report = session.refresh(jobs)?;
    for key in &report.vanished {
        ui::warn(&format!("{key} was deleted outside this tool"));
    }

    let resources = session.resources()?;
    let changes: HashMap<String, Vec<Change>> = resources
        .iter()
        .map(|r| (r.id(), r.changes()))
        .collect();

    let mut plan = ExecutionPlan::new();
    for resource in resources {
        plan.add(Box::new(resource));
    }
    let plan = plan.filter_by_target(target);

    ui::header("Plan");
    let diffs = compute_diffs(&plan.resources);
    ui::show_plan(&diffs);

    if ctx.verbose > 0 {
        for diff in &diffs {
            let Some(found) = changes.get(&diff.resource_id).filter(|c| !c.is_empty()) else {
                continue;
            };
            ui::section(&diff.resource_id);
            for change in found {
                println!("  {}", change.path.bold());
                ui::show_text_diff(&pretty(change.from.as_ref()), &pretty(Some(&change.to)));
            }
        }
    }

    Ok(())
}

fn pretty(value: Option<&serde_json::Value>) -> String {
    let mut text = value
        .map(|v| serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()))
        .unwrap_or_default();
    text.push('\n');
    text
}
