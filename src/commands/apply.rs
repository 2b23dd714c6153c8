//! `apply` - converge the appliance to the declared configuration

use anyhow::{Result, bail};
use declarative::{ExecuteOptions, ExecuteSummary, ExecutionPlan, compute_diffs, execute};

use super::Session;
use crate::Context;
use crate::progress::TierProgress;
use crate::ui::{self, PromptConfirm};

pub struct ApplyOptions<'a> {
    pub target: Option<&'a str>,
    pub dry_run: bool,
    pub jobs: usize,
    pub yes: bool,
}

pub fn run(ctx: &Context, opts: &ApplyOptions<'_>) -> Result<()> {
    let session = Session::open(ctx)?;
    let report = session.refresh(opts.jobs)?;
    for key in &report.vanished {
        ui::warn(&format!("{key} was deleted outside this tool, it will be recreated"));
    }
    session.save()?;

    let mut plan = ExecutionPlan::new();
    for resource in session.resources()? {
        plan.add(Box::new(resource));
    }
    converge(ctx, &session, plan.filter_by_target(opts.target), opts)
}

/// Show the plan, confirm, execute and persist state
pub(super) fn converge(
    ctx: &Context,
    session: &Session,
    plan: ExecutionPlan,
    opts: &ApplyOptions<'_>,
) -> Result<()> {
    let diffs = compute_diffs(&plan.resources);
    ui::header("Plan");
    ui::show_plan(&diffs);
    if diffs.is_empty() {
        return Ok(());
    }

    if opts.dry_run {
        println!();
        ui::info("Dry run - no changes made");
        return Ok(());
    }

    let mut progress = TierProgress::new(ctx.quiet);
    let mut confirm = PromptConfirm { yes: opts.yes };
    let exec = ExecuteOptions {
        dry_run: false,
        jobs: opts.jobs,
        verbose: ctx.verbose > 0,
    };
    let outcome = execute(plan, exec, &mut progress, &mut confirm);

    // Whatever happened, keep what was learned about the appliance
    session.save()?;
    let summary = outcome?;

    if summary.total_changes() == 0 && summary.skipped > 0 && summary.failed == 0 {
        println!();
        ui::error("Aborted");
        return Ok(());
    }

    print_summary(&summary);
    for (id, error) in progress.failures() {
        ui::error(&format!("{id}: {error}"));
    }
    if !summary.is_success() {
        bail!("{} resources failed", summary.failed);
    }
    Ok(())
}

fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        ui::success("Apply complete");
    } else {
        ui::warn("Apply finished with errors");
    }

    for (count, what) in [
        (summary.created, "created"),
        (summary.modified, "modified"),
        (summary.removed, "deleted"),
        (summary.skipped, "skipped"),
        (summary.failed, "failed"),
    ] {
        if count > 0 {
            ui::kv(what, &count.to_string());
        }
    }
}
