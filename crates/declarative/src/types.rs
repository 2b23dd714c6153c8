//! States, outcomes and run settings shared by the planner and executor

use serde::{Deserialize, Serialize};

/// Where a resource stands, or should stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Exists and matches; `details` carries an identity or note for display.
    Present { details: Option<String> },
    Absent,
    /// Exists with drift. `from`/`to` are one-line renderings of the
    /// differing attributes.
    Modified { from: String, to: String },
}

impl ResourceState {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Outcome of converging one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    NoChange,
    Created,
    Modified,
    Removed,
    Failed { error: String },
    Skipped { reason: String },
}

/// Per-outcome counts for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Resources the run actually changed
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Every resource the run looked at
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Count one outcome
    pub fn add_result(&mut self, result: &ApplyResult) {
        let slot = match result {
            ApplyResult::NoChange => &mut self.no_change,
            ApplyResult::Created => &mut self.created,
            ApplyResult::Modified => &mut self.modified,
            ApplyResult::Removed => &mut self.removed,
            ApplyResult::Failed { .. } => &mut self.failed,
            ApplyResult::Skipped { .. } => &mut self.skipped,
        };
        *slot += 1;
    }
}

/// Run settings for [`crate::execute`].
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Plan only; nothing is applied
    pub dry_run: bool,
    /// Threads per tier
    pub jobs: usize,
    /// Passed through to each resource's [`crate::ApplyContext`]
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::Removed);
        summary.add_result(&ApplyResult::Failed {
            error: "409".into(),
        });
        summary.add_result(&ApplyResult::NoChange);
        summary.add_result(&ApplyResult::Skipped {
            reason: "declined".into(),
        });

        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_absent() {
        assert!(ResourceState::Absent.is_absent());
        assert!(
            !ResourceState::Modified {
                from: "a=1".into(),
                to: "a=2".into()
            }
            .is_absent()
        );
    }
}
