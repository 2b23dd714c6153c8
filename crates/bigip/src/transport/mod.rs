//! Transport seam between the typed client and the appliance.
//!
//! [`Transport`] moves raw JSON text to and from REST paths relative to
//! `/mgmt/`. [`RestTransport`] talks HTTPS; [`MockTransport`] is an in-memory
//! appliance for tests.
//!
//! # Testing
//!
//! ```
//! use bigip::transport::{MockTransport, Transport};
//!
//! let mock = MockTransport::new();
//! mock.post("tm/ltm/rule", r#"{"name":"r1","partition":"Common"}"#).unwrap();
//! assert!(mock.get("tm/ltm/rule/~Common~r1").is_ok());
//! assert!(mock.get("tm/ltm/rule/~Common~r2").unwrap_err().is_not_found());
//! ```

pub mod rest;

pub use rest::{ConnectionConfig, RestTransport};

use crate::error::{Error, Result};
use crate::id::DEFAULT_PARTITION;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Raw REST access to the management API.
///
/// Paths are relative to `/mgmt/`, e.g. `tm/ltm/pool/~Common~web`. Non-success
/// responses come back as errors, with 404 as [`Error::NotFound`].
pub trait Transport: Send + Sync {
    /// GET a path and return the response body.
    fn get(&self, path: &str) -> Result<String>;

    /// POST a JSON body to a collection path.
    fn post(&self, path: &str, body: &str) -> Result<String>;

    /// PUT a JSON body to an item path, replacing the object.
    fn put(&self, path: &str, body: &str) -> Result<String>;

    /// DELETE an item path.
    fn delete(&self, path: &str) -> Result<()>;
}

// ============================================================================
// Mock appliance
// ============================================================================

/// A request recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    objects: BTreeMap<String, Value>,
    defaults: HashMap<String, Map<String, Value>>,
    failures: HashMap<(&'static str, String), (u16, String)>,
    raw: HashMap<String, String>,
    requests: Vec<Request>,
}

/// In-memory appliance for testing without network access.
///
/// Objects are stored by item path. POST and PUT store the body on top of
/// per-collection defaults, so a PUT behaves as a full replacement. GET also
/// serves sub-collections: `<item>/rules` is answered from the stored
/// `rulesReference` envelope (or a plain `rules` array), and items inside it
/// are addressable by name. A sub-collection the object never set reads as
/// empty.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an empty appliance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the server-side defaults applied to objects in a collection.
    #[must_use]
    pub fn with_defaults(self, collection: &str, defaults: Value) -> Self {
        if let Value::Object(map) = defaults {
            self.state().defaults.insert(collection.to_string(), map);
        }
        self
    }

    /// Store an object directly, bypassing POST semantics.
    pub fn insert(&self, path: &str, object: Value) {
        self.state().objects.insert(path.to_string(), object);
    }

    /// Remove an object directly, as if deleted out of band.
    pub fn forget(&self, path: &str) -> Option<Value> {
        self.state().objects.remove(path)
    }

    /// Make `method` on `path` fail with the given status and message.
    pub fn fail(&self, method: &'static str, path: &str, status: u16, message: &str) {
        let body = json!({ "code": status, "message": message }).to_string();
        self.state()
            .failures
            .insert((method, path.to_string()), (status, body));
    }

    /// Answer GET on `path` with a raw body, well-formed or not.
    pub fn respond_raw(&self, path: &str, body: &str) {
        self.state().raw.insert(path.to_string(), body.to_string());
    }

    /// The stored object at an item path.
    pub fn object(&self, path: &str) -> Option<Value> {
        self.state().objects.get(path).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.state().objects.len()
    }

    /// Whether no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    /// Requests with the given method.
    pub fn requests_with(&self, method: &str) -> Vec<Request> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }
}

impl MockState {
    fn record(&mut self, method: &'static str, path: &str, body: Option<&str>) -> Result<()> {
        let parsed = body.and_then(|b| serde_json::from_str(b).ok());
        self.requests.push(Request {
            method,
            path: path.to_string(),
            body: parsed,
        });
        match self.failures.get(&(method, path.to_string())) {
            Some((status, body)) => Err(Error::from_status(*status, path, body)),
            None => Ok(()),
        }
    }

    fn materialize(&self, collection: &str, body: &Map<String, Value>, id: (&str, &str)) -> Value {
        let (partition, name) = id;
        let mut stored = self.defaults.get(collection).cloned().unwrap_or_default();
        stored.extend(body.clone());
        stored.insert("name".to_string(), Value::from(name));
        stored.insert("partition".to_string(), Value::from(partition));
        stored.insert("fullPath".to_string(), Value::from(format!("/{partition}/{name}")));
        stored.insert(
            "selfLink".to_string(),
            Value::from(format!(
                "https://localhost/mgmt/{collection}/~{partition}~{name}"
            )),
        );
        Value::Object(stored)
    }

    fn resolve(&self, path: &str) -> Option<Value> {
        if let Some(object) = self.objects.get(path) {
            return Some(object.clone());
        }
        let (parent, last) = path.rsplit_once('/')?;
        let parent = self.resolve(parent)?;

        if let Some(items) = parent
            .get(format!("{last}Reference"))
            .and_then(|r| r.get("items"))
        {
            return Some(json!({ "items": items }));
        }
        if let Some(items) = parent.get(last).filter(|v| v.is_array()) {
            return Some(json!({ "items": items }));
        }
        if let Some(items) = parent.get("items").and_then(Value::as_array) {
            return items
                .iter()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(last))
                .cloned();
        }
        // An existing object answers any sub-collection, empty if never set
        Some(json!({ "items": [] }))
    }
}

fn parse_body(path: &str, body: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(Error::from_status(
            400,
            path,
            &json!({ "code": 400, "message": "Found invalid JSON body" }).to_string(),
        )),
    }
}

fn identity_of(body: &Map<String, Value>) -> (String, String) {
    let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
    let partition = body
        .get("partition")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PARTITION);

    match name.strip_prefix('/').and_then(|rest| rest.split_once('/')) {
        Some((partition, name)) => (partition.to_string(), name.to_string()),
        None => (partition.to_string(), name.to_string()),
    }
}

fn not_found(path: &str) -> Error {
    Error::NotFound {
        path: path.to_string(),
    }
}

impl Transport for MockTransport {
    fn get(&self, path: &str) -> Result<String> {
        let mut state = self.state();
        state.record("GET", path, None)?;
        if let Some(raw) = state.raw.get(path) {
            return Ok(raw.clone());
        }
        state
            .resolve(path)
            .map(|v| v.to_string())
            .ok_or_else(|| not_found(path))
    }

    fn post(&self, path: &str, body: &str) -> Result<String> {
        let mut state = self.state();
        state.record("POST", path, Some(body))?;
        let body = parse_body(path, body)?;
        let (partition, name) = identity_of(&body);
        if name.is_empty() {
            return Err(Error::from_status(
                400,
                path,
                r#"{"code":400,"message":"name is required"}"#,
            ));
        }

        let key = format!("{path}/~{partition}~{name}");
        if state.objects.contains_key(&key) {
            let message = format!("The requested object (/{partition}/{name}) already exists");
            return Err(Error::Conflict { message });
        }

        let stored = state.materialize(path, &body, (&partition, &name));
        let response = stored.to_string();
        state.objects.insert(key, stored);
        Ok(response)
    }

    fn put(&self, path: &str, body: &str) -> Result<String> {
        let mut state = self.state();
        state.record("PUT", path, Some(body))?;
        let body = parse_body(path, body)?;
        let Some(existing) = state.objects.get(path) else {
            return Err(not_found(path));
        };

        let partition = existing
            .get("partition")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PARTITION)
            .to_string();
        let name = existing
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let collection = path.rsplit_once('/').map_or(path, |(c, _)| c);

        let stored = state.materialize(collection, &body, (&partition, &name));
        let response = stored.to_string();
        state.objects.insert(path.to_string(), stored);
        Ok(response)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let mut state = self.state();
        state.record("DELETE", path, None)?;
        state
            .objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_get() {
        let mock = MockTransport::new();
        mock.post("tm/ltm/pool", r#"{"name":"web","partition":"Common"}"#)
            .unwrap();

        let body: Value = serde_json::from_str(&mock.get("tm/ltm/pool/~Common~web").unwrap()).unwrap();
        assert_eq!(body["name"], "web");
        assert_eq!(body["fullPath"], "/Common/web");
        assert_eq!(mock.len(), 1);
    }

    #[test]
    fn test_post_full_path_name() {
        let mock = MockTransport::new();
        mock.post("tm/ltm/rule", r#"{"name":"/Prod/r1"}"#).unwrap();
        assert!(mock.object("tm/ltm/rule/~Prod~r1").is_some());
    }

    #[test]
    fn test_post_conflict() {
        let mock = MockTransport::new();
        mock.post("tm/ltm/pool", r#"{"name":"web"}"#).unwrap();
        let err = mock.post("tm/ltm/pool", r#"{"name":"web"}"#).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[test]
    fn test_put_replaces_over_defaults() {
        let mock = MockTransport::new().with_defaults(
            "tm/ltm/profile/tcp",
            json!({ "idleTimeout": 300, "closeWaitTimeout": 5 }),
        );
        mock.post(
            "tm/ltm/profile/tcp",
            r#"{"name":"tcp1","idleTimeout":200,"closeWaitTimeout":10}"#,
        )
        .unwrap();
        mock.put("tm/ltm/profile/tcp/~Common~tcp1", r#"{"name":"tcp1","idleTimeout":100}"#)
            .unwrap();

        let stored = mock.object("tm/ltm/profile/tcp/~Common~tcp1").unwrap();
        assert_eq!(stored["idleTimeout"], 100);
        assert_eq!(stored["closeWaitTimeout"], 5);
    }

    #[test]
    fn test_put_and_delete_missing() {
        let mock = MockTransport::new();
        assert!(mock.put("tm/ltm/pool/~Common~x", "{}").unwrap_err().is_not_found());
        assert!(mock.delete("tm/ltm/pool/~Common~x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_sub_collections() {
        let mock = MockTransport::new();
        mock.insert(
            "tm/ltm/policy/~Common~p",
            json!({
                "name": "p",
                "rulesReference": { "items": [
                    { "name": "r1", "actionsReference": { "items": [{ "name": "0", "forward": true }] } }
                ]}
            }),
        );

        let rules: Value = serde_json::from_str(&mock.get("tm/ltm/policy/~Common~p/rules").unwrap()).unwrap();
        assert_eq!(rules["items"][0]["name"], "r1");

        let actions: Value =
            serde_json::from_str(&mock.get("tm/ltm/policy/~Common~p/rules/r1/actions").unwrap()).unwrap();
        assert_eq!(actions["items"][0]["forward"], true);

        let missing = mock.get("tm/ltm/policy/~Common~p/rules/r9/actions");
        assert!(missing.unwrap_err().is_not_found());

        let empty: Value =
            serde_json::from_str(&mock.get("tm/ltm/policy/~Common~p/rules/r1/conditions").unwrap()).unwrap();
        assert_eq!(empty["items"], json!([]));
    }

    #[test]
    fn test_plain_array_sub_collection() {
        let mock = MockTransport::new();
        mock.insert(
            "tm/ltm/virtual/~Common~vs",
            json!({ "name": "vs", "profiles": [{ "name": "tcp" }] }),
        );
        let profiles: Value =
            serde_json::from_str(&mock.get("tm/ltm/virtual/~Common~vs/profiles").unwrap()).unwrap();
        assert_eq!(profiles["items"][0]["name"], "tcp");
    }

    #[test]
    fn test_failure_injection_and_raw() {
        let mock = MockTransport::new();
        mock.fail("POST", "tm/ltm/pool", 400, "invalid property");
        let err = mock.post("tm/ltm/pool", r#"{"name":"web"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid property"));

        mock.respond_raw("tm/ltm/pool/~Common~web", "{not json");
        assert_eq!(mock.get("tm/ltm/pool/~Common~web").unwrap(), "{not json");
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.requests_with("GET").len(), 1);
    }
}
