//! Create/Read/Update/Delete/Exists/Import handlers.
//!
//! One generic implementation serves every [`Resource`] type. Each call takes
//! the client explicitly and owns the [`ResourceData`] it is given for the
//! duration of the call; nothing is cached between calls.
//!
//! Absence is not an error: a read that finds nothing unbinds the record, and
//! deleting something already gone succeeds. Every other transport error
//! is returned as-is, without retries. A create whose follow-up read fails
//! leaves the object on the appliance; the next read reconciles it.

use crate::error::{Error, Result};
use crate::id::ResourceId;
use crate::{Client, Resource};

/// A resource as the host tracks it: an optional binding to an appliance
/// object plus the record's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData<R> {
    /// Set once the object exists on the appliance.
    pub id: Option<ResourceId>,
    /// Declared state before a write, observed state after a read.
    pub state: R,
}

impl<R: Resource> ResourceData<R> {
    /// An unbound resource with declared state.
    pub fn new(state: R) -> Self {
        Self { id: None, state }
    }

    /// A resource bound to an existing object.
    pub fn bound(id: ResourceId, state: R) -> Self {
        Self { id: Some(id), state }
    }

    pub fn is_bound(&self) -> bool {
        self.id.is_some()
    }

    fn require_id(&self) -> Result<ResourceId> {
        self.id
            .clone()
            .ok_or_else(|| Error::Unbound(R::TYPE_NAME.to_string()))
    }
}

/// Create the object, bind the identity, then read it back.
pub fn create<R: Resource>(client: &Client, d: &mut ResourceData<R>) -> Result<()> {
    d.state.prepare();
    let id = client.create(&d.state)?;
    log::info!("Created {} {id}", R::TYPE_NAME);
    d.id = Some(id);
    read(client, d)
}

/// Refresh observed state. An object that vanished unbinds the resource.
pub fn read<R: Resource>(client: &Client, d: &mut ResourceData<R>) -> Result<()> {
    let Some(id) = d.id.clone() else {
        return Ok(());
    };

    match client.fetch(&d.state, &id)? {
        Some(observed) => d.state = observed,
        None => {
            log::warn!("{} {id} not found, removing from state", R::TYPE_NAME);
            d.id = None;
            d.state = R::default();
        }
    }
    Ok(())
}

/// Replace the object with the declared state, then read it back.
pub fn update<R: Resource>(client: &Client, d: &mut ResourceData<R>) -> Result<()> {
    let id = d.require_id()?;
    d.state.prepare();
    client.replace(&d.state, &id)?;
    log::info!("Updated {} {id}", R::TYPE_NAME);
    read(client, d)
}

/// Delete the object and unbind. Deleting an absent object succeeds.
pub fn delete<R: Resource>(client: &Client, d: &mut ResourceData<R>) -> Result<()> {
    let Some(id) = d.id.clone() else {
        return Ok(());
    };

    if client.remove(&d.state, &id)? {
        log::info!("Deleted {} {id}", R::TYPE_NAME);
    } else {
        log::debug!("{} {id} already absent", R::TYPE_NAME);
    }
    d.id = None;
    Ok(())
}

/// Whether the bound object still exists. Unbinds when it does not.
pub fn exists<R: Resource>(client: &Client, d: &mut ResourceData<R>) -> Result<bool> {
    let Some(id) = d.id.clone() else {
        return Ok(false);
    };

    let found = client.exists(&d.state, &id)?;
    if !found {
        log::warn!("{} {id} not found, removing from state", R::TYPE_NAME);
        d.id = None;
    }
    Ok(found)
}

/// Bind to an existing object by identity string and read it.
///
/// Unlike [`read`], a missing object is an error here.
pub fn import<R: Resource>(client: &Client, identity: &str) -> Result<ResourceData<R>> {
    let id: ResourceId = identity.parse()?;
    let mut d = ResourceData::bound(id.clone(), R::default());
    read(client, &mut d)?;
    if !d.is_bound() {
        return Err(Error::NotFound {
            path: id.full_path(),
        });
    }
    log::info!("Imported {} {id}", R::TYPE_NAME);
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ltm::{IRule, Pool, Policy, PolicyRule, RuleAction};
    use crate::{ErrorCategory, MockTransport};
    use serde_json::json;

    fn setup() -> (MockTransport, Client) {
        let mock = MockTransport::new();
        let client = Client::with_transport(mock.clone());
        (mock, client)
    }

    fn irule(name: &str) -> IRule {
        IRule {
            name: name.to_string(),
            rule: "when HTTP_REQUEST { }".to_string(),
            ..IRule::default()
        }
    }

    #[test]
    fn test_create_binds_and_reads() {
        let (mock, client) = setup();
        let mut d = ResourceData::new(irule("/Common/r1"));
        create(&client, &mut d).unwrap();

        assert_eq!(d.id, Some(ResourceId::new("Common", "r1")));
        assert_eq!(d.state.name, "/Common/r1");
        assert_eq!(d.state.partition, "Common");
        assert_eq!(mock.requests_with("POST").len(), 1);
        assert_eq!(mock.requests_with("GET").len(), 1);
    }

    #[test]
    fn test_create_conflict_is_returned() {
        let (mock, client) = setup();
        mock.insert("tm/ltm/rule/~Common~r1", json!({"name": "r1"}));

        let mut d = ResourceData::new(irule("r1"));
        let err = create(&client, &mut d).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert!(!d.is_bound());
    }

    #[test]
    fn test_create_validation_error_is_verbatim() {
        let (mock, client) = setup();
        mock.fail("POST", "tm/ltm/rule", 400, "01070151:3: Rule [/Common/r1] error");
        let mut d = ResourceData::new(irule("r1"));
        let err = create(&client, &mut d).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("01070151:3"));
    }

    #[test]
    fn test_create_normalizes_policy() {
        let (mock, client) = setup();
        let mut d = ResourceData::new(Policy {
            name: "p".to_string(),
            rules: vec![
                PolicyRule {
                    name: "b".to_string(),
                    ordinal: 5,
                    actions: vec![RuleAction {
                        name: "whatever".to_string(),
                        forward: true,
                        ..RuleAction::default()
                    }],
                    ..PolicyRule::default()
                },
                PolicyRule {
                    name: "a".to_string(),
                    ordinal: 9,
                    ..PolicyRule::default()
                },
            ],
            ..Policy::default()
        });
        create(&client, &mut d).unwrap();

        let body = mock.requests_with("POST")[0].body.clone().unwrap();
        assert_eq!(body["rulesReference"]["items"][0]["ordinal"], json!(0));
        assert_eq!(body["rulesReference"]["items"][1]["ordinal"], json!(1));
        assert_eq!(
            body["rulesReference"]["items"][0]["actionsReference"]["items"][0]["name"],
            json!("0")
        );
        assert_eq!(d.state.rules[0].name, "b");
    }

    #[test]
    fn test_read_not_found_unbinds() {
        let (_mock, client) = setup();
        let mut d = ResourceData::bound(ResourceId::new("Common", "gone"), irule("gone"));
        read(&client, &mut d).unwrap();
        assert!(!d.is_bound());
        assert_eq!(d.state, IRule::default());
    }

    #[test]
    fn test_read_vanished_out_of_band() {
        let (mock, client) = setup();
        let mut d = ResourceData::new(irule("r1"));
        create(&client, &mut d).unwrap();
        mock.forget("tm/ltm/rule/~Common~r1");

        read(&client, &mut d).unwrap();
        assert!(!d.is_bound());
    }

    #[test]
    fn test_read_transport_error_is_fatal() {
        let (mock, client) = setup();
        mock.fail("GET", "tm/ltm/rule/~Common~r1", 500, "internal error");
        let mut d = ResourceData::bound(ResourceId::new("Common", "r1"), irule("r1"));
        assert!(read(&client, &mut d).is_err());
        assert!(d.is_bound());
    }

    #[test]
    fn test_update_requires_binding() {
        let (_mock, client) = setup();
        let mut d = ResourceData::new(irule("r1"));
        assert!(matches!(update(&client, &mut d), Err(Error::Unbound(_))));
    }

    #[test]
    fn test_update_replaces() {
        let (mock, client) = setup();
        let mut d = ResourceData::new(Pool {
            name: "web".to_string(),
            load_balancing_mode: "round-robin".to_string(),
            allow_nat: true,
            ..Pool::default()
        });
        create(&client, &mut d).unwrap();

        d.state.load_balancing_mode = "least-connections-member".to_string();
        update(&client, &mut d).unwrap();

        let put = &mock.requests_with("PUT")[0];
        assert_eq!(put.path, "tm/ltm/pool/~Common~web");
        assert_eq!(d.state.load_balancing_mode, "least-connections-member");
        assert!(d.state.allow_nat);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_mock, client) = setup();
        let mut d = ResourceData::new(irule("r1"));
        create(&client, &mut d).unwrap();

        let id = d.id.clone().unwrap();
        delete(&client, &mut d).unwrap();
        assert!(!d.is_bound());

        let mut again = ResourceData::bound(id, irule("r1"));
        delete(&client, &mut again).unwrap();
        assert!(!again.is_bound());
    }

    #[test]
    fn test_exists() {
        let (_mock, client) = setup();
        let mut d = ResourceData::new(irule("r1"));
        assert!(!exists(&client, &mut d).unwrap());

        create(&client, &mut d).unwrap();
        assert!(exists(&client, &mut d).unwrap());

        let mut gone = ResourceData::bound(ResourceId::new("Common", "gone"), irule("gone"));
        assert!(!exists(&client, &mut gone).unwrap());
        assert!(!gone.is_bound());
    }

    #[test]
    fn test_import() {
        let (mock, client) = setup();
        mock.insert(
            "tm/ltm/rule/~Prod~r1",
            json!({"name": "r1", "partition": "Prod", "apiAnonymous": "when HTTP_REQUEST { }"}),
        );

        let d: ResourceData<IRule> = import(&client, "/Prod/r1").unwrap();
        assert_eq!(d.id, Some(ResourceId::new("Prod", "r1")));
        assert_eq!(d.state.name, "/Prod/r1");
        assert_eq!(d.state.rule, "when HTTP_REQUEST { }");
    }

    #[test]
    fn test_import_missing_is_error() {
        let (_mock, client) = setup();
        let err = import::<IRule>(&client, "/Common/nope").unwrap_err();
        assert!(err.is_not_found());

        let err = import::<IRule>(&client, "not a name").unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)));
    }
}
