//! Resource type registry
//!
//! Maps host-facing type names (`bigip_ltm_pool`, ...) to handlers that run
//! the typed lifecycle over JSON attribute objects, so commands can treat
//! every type the same way.

use anyhow::{Context, Result, bail};
use bigip::cm::DeviceGroup;
use bigip::lifecycle;
use bigip::ltm::{
    DataGroup, FastHttpProfile, FastL4Profile, HttpCompressProfile, IRule, Monitor, Node,
    OneConnectProfile, Policy, Pool, TcpProfile, VirtualAddress, VirtualServer,
};
use bigip::{Client, FieldKind, Resource, ResourceData, ResourceId, Schema};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::resource::drift;

/// One resource as commands see it: an optional binding plus attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: Option<ResourceId>,
    pub attributes: Value,
}

impl Instance {
    /// A declared resource that does not exist yet.
    pub fn declared(attributes: Value) -> Self {
        Self {
            id: None,
            attributes,
        }
    }
}

/// Type-erased lifecycle for one resource type.
pub trait ResourceHandler: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Dependency tier.
    fn tier(&self) -> u8;

    fn schema(&self) -> &'static Schema;

    /// Reject attributes the type does not have.
    fn validate(&self, attributes: &Value) -> Result<()>;

    /// Declared attributes as they will be written: the record's write-time
    /// normalization applied, restricted to the keys that were declared.
    fn normalize(&self, attributes: &Value) -> Result<Value>;

    /// Create the object. `instance.id` is bound as soon as the appliance
    /// accepts it, even when the follow-up read fails.
    fn create(&self, client: &Client, instance: &mut Instance) -> Result<()>;

    /// Refresh observed attributes. Unbinds when the object is gone.
    fn read(&self, client: &Client, instance: &mut Instance) -> Result<()>;

    fn update(&self, client: &Client, instance: &mut Instance) -> Result<()>;

    fn delete(&self, client: &Client, instance: &mut Instance) -> Result<()>;

    fn exists(&self, client: &Client, instance: &mut Instance) -> Result<bool>;

    fn import(&self, client: &Client, identity: &str) -> Result<Instance>;
}

/// Handler for a concrete record type.
struct Handler<R>(PhantomData<fn() -> R>);

impl<R: Resource> Handler<R> {
    fn boxed() -> Box<dyn ResourceHandler> {
        Box::new(Self(PhantomData))
    }

    fn load(&self, instance: &Instance) -> Result<ResourceData<R>> {
        let state: R = serde_json::from_value(instance.attributes.clone())
            .with_context(|| format!("Invalid attributes for {}", R::TYPE_NAME))?;
        Ok(ResourceData {
            id: instance.id.clone(),
            state,
        })
    }

    fn store(&self, data: ResourceData<R>, instance: &mut Instance) -> Result<()> {
        instance.attributes = serde_json::to_value(&data.state)
            .with_context(|| format!("Failed to serialize {}", R::TYPE_NAME))?;
        instance.id = data.id;
        Ok(())
    }

    /// Run a lifecycle step and write the outcome back, even on failure.
    fn run(
        &self,
        client: &Client,
        instance: &mut Instance,
        step: fn(&Client, &mut ResourceData<R>) -> bigip::Result<()>,
    ) -> Result<()> {
        let mut data = self.load(instance)?;
        let outcome = step(client, &mut data);
        if outcome.is_err() {
            instance.id = data.id;
        } else {
            self.store(data, instance)?;
        }
        outcome.map_err(Into::into)
    }
}

impl<R: Resource> ResourceHandler for Handler<R> {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn tier(&self) -> u8 {
        R::TIER
    }

    fn schema(&self) -> &'static Schema {
        R::schema()
    }

    fn validate(&self, attributes: &Value) -> Result<()> {
        let Some(map) = attributes.as_object() else {
            bail!("{} attributes must be a table", R::TYPE_NAME);
        };
        let schema = R::schema();
        for key in map.keys() {
            if schema.field(key).is_none() {
                bail!("{} has no attribute '{key}'", R::TYPE_NAME);
            }
        }
        self.load(&Instance::declared(attributes.clone()))?;
        Ok(())
    }

    fn normalize(&self, attributes: &Value) -> Result<Value> {
        let mut data = self.load(&Instance::declared(attributes.clone()))?;
        data.state.prepare();
        let full = serde_json::to_value(&data.state)
            .with_context(|| format!("Failed to serialize {}", R::TYPE_NAME))?;
        Ok(drift::project(&full, attributes))
    }

    fn create(&self, client: &Client, instance: &mut Instance) -> Result<()> {
        self.run(client, instance, lifecycle::create::<R>)
    }

    fn read(&self, client: &Client, instance: &mut Instance) -> Result<()> {
        self.run(client, instance, lifecycle::read::<R>)
    }

    fn update(&self, client: &Client, instance: &mut Instance) -> Result<()> {
        self.run(client, instance, lifecycle::update::<R>)
    }

    fn delete(&self, client: &Client, instance: &mut Instance) -> Result<()> {
        let mut data = self.load(instance)?;
        lifecycle::delete(client, &mut data)?;
        instance.id = data.id;
        Ok(())
    }

    fn exists(&self, client: &Client, instance: &mut Instance) -> Result<bool> {
        let mut data = self.load(instance)?;
        let found = lifecycle::exists(client, &mut data)?;
        instance.id = data.id;
        Ok(found)
    }

    fn import(&self, client: &Client, identity: &str) -> Result<Instance> {
        let data = lifecycle::import::<R>(client, identity)?;
        let mut instance = Instance::declared(Value::Null);
        self.store(data, &mut instance)?;
        Ok(instance)
    }
}

/// Registry of every supported resource type.
pub struct Provider {
    handlers: BTreeMap<&'static str, Box<dyn ResourceHandler>>,
}

impl Provider {
    pub fn new() -> Self {
        let handlers = [
            Handler::<Node>::boxed(),
            Handler::<Pool>::boxed(),
            Handler::<VirtualServer>::boxed(),
            Handler::<VirtualAddress>::boxed(),
            Handler::<Monitor>::boxed(),
            Handler::<IRule>::boxed(),
            Handler::<Policy>::boxed(),
            Handler::<TcpProfile>::boxed(),
            Handler::<FastHttpProfile>::boxed(),
            Handler::<FastL4Profile>::boxed(),
            Handler::<OneConnectProfile>::boxed(),
            Handler::<HttpCompressProfile>::boxed(),
            Handler::<DataGroup>::boxed(),
            Handler::<DeviceGroup>::boxed(),
        ];

        Self {
            handlers: handlers.into_iter().map(|h| (h.type_name(), h)).collect(),
        }
    }

    /// Look up the handler for a type name.
    pub fn handler(&self, type_name: &str) -> Result<&dyn ResourceHandler> {
        self.handlers
            .get(type_name)
            .map(|h| h.as_ref())
            .ok_or_else(|| bigip::Error::UnknownResourceType(type_name.to_string()).into())
    }

    /// All handlers, ordered by tier then name.
    pub fn handlers(&self) -> Vec<&dyn ResourceHandler> {
        let mut all: Vec<_> = self.handlers.values().map(|h| h.as_ref()).collect();
        all.sort_by_key(|h| (h.tier(), h.type_name()));
        all
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

/// Field rows for display: (name, wire key, kind).
pub fn describe(schema: &Schema) -> Vec<(String, String, String)> {
    let mut rows = Vec::new();
    describe_into(schema, "", &mut rows);
    rows
}

fn describe_into(schema: &Schema, prefix: &str, rows: &mut Vec<(String, String, String)>) {
    for field in schema.fields {
        let name = format!("{prefix}{}", field.name);
        let mut kind = field.kind.label();
        if field.always {
            kind.push_str(", always sent");
        }
        rows.push((name.clone(), field.wire.to_string(), kind));
        if let FieldKind::Collection(item) | FieldKind::Records(item) = field.kind {
            describe_into(item, &format!("{name}[]."), rows);
        }
    }
}
