//! Execution engine - applies resources tier by tier with parallelism inside a tier

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

/// Run a plan
///
/// Nothing happens when the plan has no diffs or `opts.dry_run` is set. A
/// declined confirmation counts every pending change as skipped. Batches
/// run one after another; resources within a batch run on up to `opts.jobs`
/// threads. A failed resource is recorded in the summary and does not stop
/// later batches.
pub fn execute<P, C>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let total_changes = compute_diffs(&plan.resources).len();

    if total_changes == 0 {
        return Ok(ExecuteSummary::default());
    }

    if opts.dry_run {
        return Ok(ExecuteSummary::default());
    }

    if !confirm.confirm("Apply changes?")? {
        return Ok(ExecuteSummary {
            skipped: total_changes,
            ..Default::default()
        });
    }

    let mut summary = ExecuteSummary::default();

    for batch in plan.into_batches() {
        progress.on_batch_start(batch.resources.len(), batch.tier);
        let jobs = if batch.resources.iter().all(|r| r.can_parallelize()) {
            opts.jobs.max(1)
        } else {
            1
        };
        let results = execute_batch(&batch.resources, jobs, opts.verbose, progress)?;
        for result in &results {
            summary.add_result(result);
        }
        progress.on_batch_complete();
    }

    Ok(summary)
}

/// One batch, sequential when `jobs` is 1
fn execute_batch<P: ProgressCallback>(
    resources: &[Box<dyn Resource>],
    jobs: usize,
    verbose: bool,
    progress: &mut P,
) -> Result<Vec<ApplyResult>> {
    if jobs == 1 || resources.len() == 1 {
        let mut results = Vec::with_capacity(resources.len());
        for resource in resources {
            progress.on_resource_start(&resource.id(), &resource.description());
            let result = apply_resource(resource.as_ref(), verbose);
            progress.on_resource_complete(&resource.id(), &result);
            results.push(result);
        }
        Ok(results)
    } else {
        execute_parallel(resources, jobs, verbose, progress)
    }
}

fn execute_parallel<P: ProgressCallback>(
    resources: &[Box<dyn Resource>],
    jobs: usize,
    verbose: bool,
    progress: &mut P,
) -> Result<Vec<ApplyResult>> {
    // The progress callback is not thread-safe; report after the batch.
    let results: Mutex<Vec<(String, ApplyResult)>> = Mutex::new(Vec::new());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))?;

    pool.install(|| {
        resources.par_iter().for_each(|resource| {
            let result = apply_resource(resource.as_ref(), verbose);
            results
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((resource.id(), result));
        });
    });

    let results = results.into_inner().unwrap_or_else(PoisonError::into_inner);

    for (id, result) in &results {
        progress.on_resource_complete(id, result);
    }

    Ok(results.into_iter().map(|(_, r)| r).collect())
}

/// Apply one resource, turning an error into `Failed`
fn apply_resource(resource: &dyn Resource, verbose: bool) -> ApplyResult {
    let mut ctx = ApplyContext::new(false, verbose);

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => {
            log::error!("{}: {e:#}", resource.id());
            ApplyResult::Failed {
                error: format!("{e:#}"),
            }
        }
    }
}

/// Run a plan without progress output or confirmation
pub fn execute_simple(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}
