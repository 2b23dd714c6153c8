//! # declarative
//!
//! Converge a set of resources to their desired state in dependency order.
//!
//! - [`Resource`]: one managed thing, with a current and a desired
//!   [`ResourceState`] and an `apply` that moves between them.
//! - [`ExecutionPlan`]: resources split into tier batches. Creates and
//!   updates run lowest tier first; removals run afterwards, highest tier
//!   first, so nothing is deleted while something above still references it.
//! - [`execute`]: asks a [`ConfirmCallback`] once, then runs each batch on a
//!   rayon pool and reports through a [`ProgressCallback`].
//!
//! ```ignore
//! let mut plan = ExecutionPlan::new();
//! for resource in resources {
//!     plan.add(Box::new(resource));
//! }
//! let summary = execute(plan.filter_by_target(Some("pool")), opts, &mut progress, &mut confirm)?;
//! ```

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_simple};
pub use planner::{Batch, ExecutionPlan};
pub use resource::{BoxedResource, Resource, ResourceExt};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState};
