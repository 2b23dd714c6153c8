//! What a plan would change

use crate::resource::Resource;
use crate::types::ResourceState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One resource whose current state differs from its desired state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    pub resource_id: String,
    pub resource_type: String,
    pub description: String,
    pub tier: u8,
    pub current: ResourceState,
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// `None` when the resource is already converged
    pub fn from_resource(resource: &dyn Resource) -> Result<Option<Self>> {
        let current = resource.current_state()?;
        let desired = resource.desired_state();
        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            tier: resource.tier(),
            current,
            desired,
        }))
    }

    pub fn is_addition(&self) -> bool {
        self.current.is_absent() && !self.desired.is_absent()
    }

    pub fn is_removal(&self) -> bool {
        !self.current.is_absent() && self.desired.is_absent()
    }
}

/// Diffs for every resource that needs work
///
/// A resource whose state cannot be determined is logged and left out.
pub fn compute_diffs(resources: &[Box<dyn Resource>]) -> Vec<ResourceDiff> {
    resources
        .iter()
        .filter_map(|r| match ResourceDiff::from_resource(r.as_ref()) {
            Ok(diff) => diff,
            Err(e) => {
                log::warn!("Could not determine state of {}: {e}", r.id());
                None
            }
        })
        .collect()
}

/// Counts for the plan footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub additions: usize,
    pub removals: usize,
    /// Updates and replacements
    pub modifications: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        diffs.iter().fold(Self::default(), |mut summary, diff| {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else {
                summary.modifications += 1;
            }
            summary
        })
    }
}

/// Diffs keyed by resource type, types in name order
pub fn group_by_type(diffs: &[ResourceDiff]) -> BTreeMap<String, Vec<&ResourceDiff>> {
    let mut groups: BTreeMap<String, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(current: ResourceState, desired: ResourceState) -> ResourceDiff {
        ResourceDiff {
            resource_id: "bigip_ltm_pool.web".into(),
            resource_type: "bigip_ltm_pool".into(),
            description: "Pool /Common/web".into(),
            tier: 1,
            current,
            desired,
        }
    }

    #[test]
    fn test_classification() {
        let present = ResourceState::Present { details: None };
        let add = diff(ResourceState::Absent, present.clone());
        let remove = diff(present, ResourceState::Absent);
        let modify = diff(
            ResourceState::Modified {
                from: "round-robin".into(),
                to: "ratio-member".into(),
            },
            ResourceState::Present { details: None },
        );

        assert!(add.is_addition());
        assert!(remove.is_removal());
        assert!(!modify.is_addition() && !modify.is_removal());

        assert_eq!(
            DiffSummary::from_diffs(&[add, remove, modify]),
            DiffSummary {
                additions: 1,
                removals: 1,
                modifications: 1,
            }
        );
    }

    #[test]
    fn test_group_by_type() {
        let mut other = diff(ResourceState::Absent, ResourceState::Present { details: None });
        other.resource_type = "bigip_ltm_node".into();
        let diffs = vec![
            diff(ResourceState::Absent, ResourceState::Present { details: None }),
            other,
        ];
        let groups = group_by_type(&diffs);
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["bigip_ltm_node", "bigip_ltm_pool"]);
    }
}
