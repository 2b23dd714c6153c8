//! The unit of convergence
//!
//! A resource knows where it stands, where it should stand and how to get
//! there. Ordering between resources is expressed only through [`Resource::tier`].

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Something the executor can converge.
///
/// ```ignore
/// use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
///
/// #[derive(Debug)]
/// struct Pool {
///     label: String,
///     exists: bool,
/// }
///
/// impl Resource for Pool {
///     fn id(&self) -> String {
///         format!("bigip_ltm_pool.{}", self.label)
///     }
///
///     fn description(&self) -> String {
///         format!("pool {}", self.label)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "bigip_ltm_pool"
///     }
///
///     // Pools reference nodes and monitors
///     fn tier(&self) -> u8 {
///         1
///     }
///
///     fn current_state(&self) -> Result<ResourceState> {
///         Ok(if self.exists {
///             ResourceState::Present { details: None }
///         } else {
///             ResourceState::Absent
///         })
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::Present { details: None }
///     }
///
///     fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "Dry run".into() });
///         }
///         Ok(ApplyResult::Created)
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Stable key across runs, e.g. `bigip_ltm_pool.web`.
    fn id(&self) -> String;

    /// Display text shown next to the id while applying.
    fn description(&self) -> String;

    /// Type name, used for grouping output and `--target` filters.
    fn resource_type(&self) -> &'static str;

    /// Lower tiers are created first and removed last.
    fn tier(&self) -> u8 {
        0
    }

    fn current_state(&self) -> Result<ResourceState>;

    /// `Absent` marks the resource for removal.
    fn desired_state(&self) -> ResourceState;

    fn needs_apply(&self) -> Result<bool> {
        Ok(self.current_state()? != self.desired_state())
    }

    /// Converge. Must return `Skipped` under `ctx.dry_run` and `NoChange`
    /// when nothing differs; an `Err` is recorded as a failure of this
    /// resource only.
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;

    /// `false` forces the whole tier onto one thread.
    fn can_parallelize(&self) -> bool {
        true
    }
}

pub type BoxedResource = Box<dyn Resource>;

pub trait ResourceExt {
    /// Planned for deletion rather than create or update
    fn is_removal(&self) -> bool;
}

impl<R: Resource + ?Sized> ResourceExt for R {
    fn is_removal(&self) -> bool {
        self.desired_state().is_absent()
    }
}
