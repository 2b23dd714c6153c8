//! Execution planner - orders resources into dependency tiers

use crate::resource::{BoxedResource, Resource, ResourceExt};

/// Resources sharing a tier and direction, applied together
pub struct Batch {
    /// Dependency tier shared by every resource in the batch
    pub tier: u8,
    /// Whether the batch removes resources
    pub removal: bool,
    pub resources: Vec<BoxedResource>,
}

/// An execution plan over a set of resources
///
/// Converging resources run in ascending tier order, so a pool exists before
/// the virtual server that references it. Removals run afterwards in
/// descending tier order, so references are dropped before their targets.
#[derive(Default)]
pub struct ExecutionPlan {
    pub resources: Vec<BoxedResource>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the plan
    pub fn add(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type" or "type.label"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, label) = parse_target(t);
                self.filter(|r| matches_filter(r, resource_type.as_deref(), label.as_deref()))
            }
        }
    }

    /// Split the plan into ordered batches
    pub fn into_batches(self) -> Vec<Batch> {
        let (mut removals, mut upserts): (Vec<_>, Vec<_>) =
            self.resources.into_iter().partition(|r| r.is_removal());

        upserts.sort_by_key(|r| r.tier());
        removals.sort_by_key(|r| std::cmp::Reverse(r.tier()));

        let mut batches = group(upserts, false);
        batches.extend(group(removals, true));
        batches
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Check if plan removes anything
    pub fn has_removals(&self) -> bool {
        self.resources.iter().any(|r| r.is_removal())
    }
}

/// Group pre-sorted resources into runs of equal tier
fn group(sorted: Vec<BoxedResource>, removal: bool) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for resource in sorted {
        let tier = resource.tier();
        match batches.last_mut() {
            Some(batch) if batch.tier == tier => batch.resources.push(resource),
            _ => batches.push(Batch {
                tier,
                removal,
                resources: vec![resource],
            }),
        }
    }
    batches
}

/// Parse a target string like "type.label" into (type, label)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        None => (Some(target.to_string()), None),
        Some((t, label)) if !t.is_empty() && !label.is_empty() => {
            (Some(t.to_string()), Some(label.to_string()))
        }
        Some(_) => (None, Some(target.to_string())),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(resource: &dyn Resource, resource_type: Option<&str>, label: Option<&str>) -> bool {
    if let Some(rt) = resource_type {
        let ty = resource.resource_type();
        // Allow the short forms "ltm", "pool", "ltm_pool"
        let matches_type = ty == rt
            || ty.starts_with(rt)
            || ty.strip_prefix("bigip_").is_some_and(|short| {
                short == rt || short.starts_with(rt) || short.ends_with(&format!("_{rt}"))
            });
        if !matches_type {
            return false;
        }
    }

    if let Some(l) = label
        && !resource.id().ends_with(&format!(".{l}"))
    {
        return false;
    }

    true
}
