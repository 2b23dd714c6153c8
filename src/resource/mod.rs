//! Declared appliance objects as convergence resources
//!
//! A [`ManagedResource`] pairs what the config declares for one `type.label`
//! with what the state file last observed, and converges the appliance
//! through the provider's lifecycle handlers.

pub mod drift;

use anyhow::Result;
use bigip::Client;
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::provider::{Instance, Provider, ResourceHandler};
use crate::state::{self, ProviderState};

/// Handles shared by every resource of one run.
pub struct Shared {
    pub provider: Provider,
    pub client: Client,
    pub state: Mutex<ProviderState>,
}

impl Shared {
    pub fn new(provider: Provider, client: Client, state: ProviderState) -> Arc<Self> {
        Arc::new(Self {
            provider,
            client,
            state: Mutex::new(state),
        })
    }

    /// Run `f` with the state locked
    pub fn with_state<T>(&self, f: impl FnOnce(&mut ProviderState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// One `type.label` under management.
pub struct ManagedResource {
    type_name: &'static str,
    label: String,
    tier: u8,
    /// Normalized declared attributes; `None` when the config no longer
    /// declares the resource.
    desired: Option<Value>,
    /// Last observed instance, `None` when nothing exists on the appliance.
    observed: Option<Instance>,
    shared: Arc<Shared>,
}

impl ManagedResource {
    /// A declared resource, with its observed counterpart if one is tracked.
    pub fn declared(
        shared: &Arc<Shared>,
        type_name: &str,
        label: &str,
        attributes: &Value,
        observed: Option<Instance>,
    ) -> Result<Self> {
        let handler = shared.provider.handler(type_name)?;
        handler.validate(attributes)?;
        let desired = handler.normalize(attributes)?;
        Ok(Self::build(shared, handler, label, Some(desired), observed))
    }

    /// A tracked resource that should no longer exist.
    pub fn orphan(
        shared: &Arc<Shared>,
        type_name: &str,
        label: &str,
        observed: Instance,
    ) -> Result<Self> {
        let handler = shared.provider.handler(type_name)?;
        Ok(Self::build(shared, handler, label, None, Some(observed)))
    }

    fn build(
        shared: &Arc<Shared>,
        handler: &dyn ResourceHandler,
        label: &str,
        desired: Option<Value>,
        observed: Option<Instance>,
    ) -> Self {
        Self {
            type_name: handler.type_name(),
            label: label.to_string(),
            tier: handler.tier(),
            desired,
            observed,
            shared: Arc::clone(shared),
        }
    }

    fn key(&self) -> String {
        state::key(self.type_name, &self.label)
    }

    /// Declared attributes that differ from the observed ones.
    pub fn changes(&self) -> Vec<drift::Change> {
        match (&self.desired, &self.observed) {
            (Some(desired), Some(observed)) => drift::changes(desired, &observed.attributes),
            _ => Vec::new(),
        }
    }

    /// Whether the change can only be made by deleting and recreating.
    fn needs_replacement(changes: &[drift::Change]) -> bool {
        changes
            .iter()
            .any(|c| c.path == "name" || c.path == "partition")
    }

    fn record(&self, instance: &Instance) {
        let key = self.key();
        self.shared.with_state(|s| s.record(&key, instance));
    }

    fn handler(&self) -> Result<&dyn ResourceHandler> {
        self.shared.provider.handler(self.type_name)
    }

    fn create(&self, desired: &Value) -> Result<()> {
        let mut instance = Instance::declared(desired.clone());
        let outcome = self.handler()?.create(&self.shared.client, &mut instance);
        self.record(&instance);
        outcome
    }
}

impl fmt::Debug for ManagedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedResource")
            .field("type_name", &self.type_name)
            .field("label", &self.label)
            .field("tier", &self.tier)
            .field("desired", &self.desired)
            .field("observed", &self.observed)
            .finish_non_exhaustive()
    }
}

impl Resource for ManagedResource {
    fn id(&self) -> String {
        self.key()
    }

    fn description(&self) -> String {
        let name = self
            .observed
            .as_ref()
            .and_then(|o| o.id.as_ref())
            .map(ToString::to_string)
            .or_else(|| {
                self.desired
                    .as_ref()
                    .and_then(|d| d.get("name"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| self.label.clone());
        format!("{} {name}", self.type_name)
    }

    fn resource_type(&self) -> &'static str {
        self.type_name
    }

    fn tier(&self) -> u8 {
        self.tier
    }

    fn current_state(&self) -> Result<ResourceState> {
        let Some(observed) = &self.observed else {
            return Ok(ResourceState::Absent);
        };
        if self.desired.is_none() {
            return Ok(ResourceState::Present {
                details: observed.id.as_ref().map(ToString::to_string),
            });
        }

        let changes = self.changes();
        if changes.is_empty() {
            Ok(ResourceState::Present { details: None })
        } else {
            Ok(ResourceState::Modified {
                from: drift::summarize(&changes, true),
                to: drift::summarize(&changes, false),
            })
        }
    }

    fn desired_state(&self) -> ResourceState {
        match self.desired {
            Some(_) => ResourceState::Present { details: None },
            None => ResourceState::Absent,
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".into(),
            });
        }

        let client = &self.shared.client;
        match (&self.observed, &self.desired) {
            (None, None) => Ok(ApplyResult::NoChange),
            (None, Some(desired)) => {
                self.create(desired)?;
                Ok(ApplyResult::Created)
            }
            (Some(observed), None) => {
                let mut instance = observed.clone();
                self.handler()?.delete(client, &mut instance)?;
                self.record(&instance);
                Ok(ApplyResult::Removed)
            }
            (Some(observed), Some(desired)) => {
                let changes = self.changes();
                if changes.is_empty() {
                    return Ok(ApplyResult::NoChange);
                }
                if ctx.verbose {
                    log::info!("{}: {}", self.key(), drift::summarize(&changes, false));
                }

                if Self::needs_replacement(&changes) {
                    log::info!("{} changes identity, replacing", self.key());
                    let mut old = observed.clone();
                    self.handler()?.delete(client, &mut old)?;
                    self.record(&old);
                    self.create(desired)?;
                    return Ok(ApplyResult::Modified);
                }

                let mut instance = Instance {
                    id: observed.id.clone(),
                    attributes: desired.clone(),
                };
                self.handler()?.update(client, &mut instance)?;
                self.record(&instance);
                Ok(ApplyResult::Modified)
            }
        }
    }
}
