//! `destroy` - delete every tracked resource in reverse tier order

use anyhow::Result;
use declarative::ExecutionPlan;

use super::Session;
use super::apply::{ApplyOptions, converge};
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>, yes: bool, jobs: usize) -> Result<()> {
    let session = Session::open(ctx)?;
    session.refresh(jobs)?;
    session.save()?;

    if session.shared.with_state(|s| s.is_empty()) {
        ui::info("Nothing to destroy");
        return Ok(());
    }

    let opts = ApplyOptions {
        target,
        dry_run: false,
        jobs,
        yes,
    };
    converge(ctx, &session, teardown_plan(&session, target)?, &opts)
}

fn teardown_plan(session: &Session, target: Option<&str>) -> Result<ExecutionPlan> {
    let mut plan = ExecutionPlan::new();
    for resource in session.teardown()? {
        plan.add(Box::new(resource));
    }
    Ok(plan.filter_by_target(target))
}
