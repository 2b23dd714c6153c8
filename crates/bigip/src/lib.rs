//! # bigip
//!
//! Typed access to a BIG-IP style appliance's REST management API.
//!
//! This crate provides:
//! - A table-driven adapter between flat domain records and the appliance's
//!   wire format ([`codec`])
//! - Domain records for LTM objects ([`ltm`]) and device management ([`cm`])
//! - A [`Client`] over a pluggable [`Transport`]
//! - Generic Create/Read/Update/Delete/Exists/Import handlers ([`lifecycle`])
//!
//! ## Example
//!
//! ```
//! use bigip::{Client, MockTransport, ResourceData, lifecycle};
//! use bigip::ltm::Pool;
//!
//! let client = Client::with_transport(MockTransport::new());
//!
//! let mut pool = ResourceData::new(Pool {
//!     name: "/Common/web".to_string(),
//!     load_balancing_mode: "round-robin".to_string(),
//!     allow_snat: true,
//!     ..Pool::default()
//! });
//! lifecycle::create(&client, &mut pool).unwrap();
//! assert!(lifecycle::exists(&client, &mut pool).unwrap());
//!
//! lifecycle::delete(&client, &mut pool).unwrap();
//! assert!(pool.id.is_none());
//! ```

#![warn(clippy::all)]

pub mod cm;
pub mod codec;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod ltm;
pub mod transport;

pub use codec::{BoolTokens, Field, FieldKind, Record, Schema};
pub use error::{Error, ErrorCategory, Result};
pub use id::{DEFAULT_PARTITION, ResourceId};
pub use lifecycle::ResourceData;
pub use ltm::policy::normalize_policy;
pub use transport::{ConnectionConfig, MockTransport, RestTransport, Transport};

use serde_json::Value;

// ============================================================================
// Resource
// ============================================================================

/// A record that lives at a REST collection on the appliance.
pub trait Resource: Record {
    /// Host-facing type name, e.g. `bigip_ltm_pool`.
    const TYPE_NAME: &'static str;

    /// Dependency rank. Lower tiers are created first and deleted last.
    const TIER: u8;

    /// Collection path relative to `/mgmt/`, e.g. `tm/ltm/pool`.
    fn collection_path(&self) -> String;

    /// Item path for an identity.
    fn item_path(&self, id: &ResourceId) -> String {
        format!("{}/{}", self.collection_path(), id.url_segment())
    }

    /// Paths tried, in order, when reading an identity.
    ///
    /// Only types whose collection depends on state the caller may not know
    /// yet (monitors on import) need more than one.
    fn candidate_paths(&self, id: &ResourceId) -> Vec<String> {
        vec![self.item_path(id)]
    }

    /// Identity derived from the record's `name` and `partition` fields.
    fn identity(&self) -> Result<ResourceId> {
        let domain = serde_json::to_value(self).map_err(|source| Error::Encode {
            context: Self::TYPE_NAME.to_string(),
            source,
        })?;
        let field = |key: &str| {
            domain
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        ResourceId::from_parts(&field("name"), &field("partition"))
    }

    /// Normalize the record before it is written.
    fn prepare(&mut self) {}

    /// Fill in sub-collections that the main GET does not return.
    fn read_children(&mut self, _client: &Client, _item_path: &str) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Client
// ============================================================================

/// Typed client for the management API.
///
/// The client holds no state besides its transport; pass it explicitly to
/// every lifecycle call.
pub struct Client {
    transport: Box<dyn Transport>,
}

impl Client {
    /// Connect to a management endpoint over HTTPS.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::with_transport(RestTransport::new(config)?))
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// GET a path and parse the body as JSON.
    pub fn get_json(&self, path: &str) -> Result<Value> {
        let body = self.transport.get(path)?;
        serde_json::from_str(&body).map_err(|e| Error::decode(path, e))
    }

    /// GET a sub-collection and return its `items`.
    ///
    /// A missing `items` key is an empty collection.
    pub fn get_items(&self, path: &str) -> Result<Vec<Value>> {
        let mut body = self.get_json(path)?;
        match body.get_mut("items").map(Value::take) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(Error::decode(
                path,
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected an items array, got {other}"
                )),
            )),
        }
    }

    /// Read an object. `Ok(None)` when it does not exist.
    ///
    /// `template` supplies the collection path and the form of the returned
    /// `name`: a template declared with a full path gets one back.
    pub fn fetch<R: Resource>(&self, template: &R, id: &ResourceId) -> Result<Option<R>> {
        for path in template.candidate_paths(id) {
            let mut wire = match self.get_json(&path) {
                Ok(wire) => wire,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };

            if let Some(object) = wire.as_object_mut() {
                object.insert("name".to_string(), Value::from(observed_name(template, id)));
                object.insert("partition".to_string(), Value::from(id.partition.clone()));
            }
            let mut record: R = codec::decode(&wire)?;
            record.read_children(self, &path)?;
            return Ok(Some(record));
        }
        Ok(None)
    }

    /// Whether an object exists, without reading its sub-collections.
    pub fn exists<R: Resource>(&self, template: &R, id: &ResourceId) -> Result<bool> {
        for path in template.candidate_paths(id) {
            match self.transport.get(&path) {
                Ok(_) => return Ok(true),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// POST a record to its collection and return its identity.
    pub fn create<R: Resource>(&self, record: &R) -> Result<ResourceId> {
        let id = record.identity()?;
        let body = write_body(record, &id)?;
        self.transport.post(&record.collection_path(), &body)?;
        Ok(id)
    }

    /// PUT a record over an existing object (full replacement).
    pub fn replace<R: Resource>(&self, record: &R, id: &ResourceId) -> Result<()> {
        let body = write_body(record, id)?;
        self.transport.put(&record.item_path(id), &body)?;
        Ok(())
    }

    /// DELETE an object. Returns `false` when it was already absent.
    pub fn remove<R: Resource>(&self, template: &R, id: &ResourceId) -> Result<bool> {
        match self.transport.delete(&template.item_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn write_body<R: Resource>(record: &R, id: &ResourceId) -> Result<String> {
    let mut wire = codec::encode(record)?;
    if let Some(object) = wire.as_object_mut() {
        object.insert("name".to_string(), Value::from(id.name.clone()));
        if R::schema().field("partition").is_some() {
            object.insert("partition".to_string(), Value::from(id.partition.clone()));
        }
    }
    Ok(wire.to_string())
}

fn observed_name<R: Resource>(template: &R, id: &ResourceId) -> String {
    let declared = serde_json::to_value(template)
        .ok()
        .and_then(|v| v.get("name").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();
    if declared.is_empty() || declared.starts_with('/') {
        id.full_path()
    } else {
        id.name.clone()
    }
}
