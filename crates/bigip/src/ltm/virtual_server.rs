//! Virtual servers.
//!
//! Profiles and policies attached to a virtual server are not part of its
//! main GET response; they are read from the `profiles` and `policies`
//! sub-collections after the record itself.

use crate::codec::{self, ENABLED_DISABLED, Field, Record, Schema};
use crate::error::Result;
use crate::{Client, Resource, ltm};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A profile attached to a virtual server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualServerProfile {
    pub name: String,
    pub partition: String,
    /// `all`, `clientside` or `serverside`.
    pub context: String,
}

static VIRTUAL_SERVER_PROFILE: Schema = Schema {
    name: "virtual server profile",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("context", "context"),
    ],
};

impl Record for VirtualServerProfile {
    fn schema() -> &'static Schema {
        &VIRTUAL_SERVER_PROFILE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualServer {
    pub name: String,
    pub partition: String,
    pub description: String,
    /// `/Partition/address:port`.
    pub destination: String,
    pub source: String,
    pub mask: String,
    pub pool: String,
    pub ip_protocol: String,
    pub source_port: String,
    pub auto_lasthop: String,
    pub connection_limit: i64,
    pub rate_limit: String,
    pub mirror: bool,
    pub translate_address: bool,
    pub translate_port: bool,
    pub enabled: bool,
    pub disabled: bool,
    pub vlans: Vec<String>,
    pub vlans_enabled: bool,
    pub rules: Vec<String>,
    pub persist: String,
    pub fallback_persistence: String,
    pub profiles: Vec<VirtualServerProfile>,
    pub policies: Vec<String>,
}

static VIRTUAL_SERVER: Schema = Schema {
    name: "virtual server",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("description", "description"),
        Field::str("destination", "destination"),
        Field::str("source", "source"),
        Field::str("mask", "mask"),
        Field::str("pool", "pool"),
        Field::str("ip_protocol", "ipProtocol"),
        Field::str("source_port", "sourcePort"),
        Field::str("auto_lasthop", "autoLasthop"),
        Field::int("connection_limit", "connectionLimit"),
        Field::str("rate_limit", "rateLimit"),
        Field::toggle("mirror", "mirror", ENABLED_DISABLED),
        Field::toggle("translate_address", "translateAddress", ENABLED_DISABLED),
        Field::toggle("translate_port", "translatePort", ENABLED_DISABLED),
        Field::flag("enabled", "enabled"),
        Field::flag("disabled", "disabled"),
        Field::str_list("vlans", "vlans"),
        Field::flag("vlans_enabled", "vlansEnabled"),
        Field::str_list("rules", "rules"),
        Field::str("persist", "persist"),
        Field::str("fallback_persistence", "fallbackPersistence"),
        Field::records("profiles", "profiles", &VIRTUAL_SERVER_PROFILE),
        Field::str_list("policies", "policies"),
    ],
};

impl Record for VirtualServer {
    fn schema() -> &'static Schema {
        &VIRTUAL_SERVER
    }
}

impl Resource for VirtualServer {
    const TYPE_NAME: &'static str = "bigip_ltm_virtual_server";
    const TIER: u8 = ltm::TIER_VIRTUAL;

    fn collection_path(&self) -> String {
        ltm::collection("virtual")
    }

    fn read_children(&mut self, client: &Client, item_path: &str) -> Result<()> {
        self.profiles = client
            .get_items(&format!("{item_path}/profiles"))?
            .iter()
            .map(codec::decode::<VirtualServerProfile>)
            .collect::<Result<_>>()?;

        self.policies = client
            .get_items(&format!("{item_path}/policies"))?
            .iter()
            .filter_map(policy_path)
            .collect();
        Ok(())
    }
}

/// Full path of an attached policy, from either an object or a bare string.
fn policy_path(item: &Value) -> Option<String> {
    if let Some(path) = item.as_str() {
        return Some(path.to_string());
    }
    if let Some(path) = item.get("fullPath").and_then(Value::as_str) {
        return Some(path.to_string());
    }
    let name = item.get("name").and_then(Value::as_str)?;
    let partition = item
        .get("partition")
        .and_then(Value::as_str)
        .unwrap_or(crate::DEFAULT_PARTITION);
    Some(format!("/{partition}/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::{MockTransport, ResourceId};
    use serde_json::json;

    fn sample() -> VirtualServer {
        VirtualServer {
            name: "/Common/vs-web".to_string(),
            destination: "/Common/10.0.1.10:443".to_string(),
            mask: "255.255.255.255".to_string(),
            pool: "/Common/web".to_string(),
            ip_protocol: "tcp".to_string(),
            source_port: "preserve".to_string(),
            translate_address: true,
            translate_port: true,
            enabled: true,
            vlans: vec!["/Common/external".to_string()],
            vlans_enabled: true,
            rules: vec!["/Common/redirect".to_string()],
            persist: String::new(),
            profiles: vec![
                VirtualServerProfile {
                    name: "tcp".to_string(),
                    partition: "Common".to_string(),
                    context: "all".to_string(),
                },
                VirtualServerProfile {
                    name: "http".to_string(),
                    ..VirtualServerProfile::default()
                },
            ],
            policies: vec!["/Common/forward".to_string()],
            ..VirtualServer::default()
        }
    }

    #[test]
    fn test_round_trip() {
        for vs in [VirtualServer::default(), sample()] {
            assert_eq!(decode::<VirtualServer>(&encode(&vs).unwrap()).unwrap(), vs);
        }
    }

    #[test]
    fn test_wire_shape() {
        let wire = encode(&sample()).unwrap();
        assert_eq!(wire["translateAddress"], json!("enabled"));
        assert_eq!(wire["mirror"], json!("disabled"));
        assert_eq!(wire["enabled"], json!(true));
        assert!(wire.get("disabled").is_none());
        assert_eq!(wire["profiles"][1], json!({"name": "http"}));
    }

    #[test]
    fn test_read_children() {
        let mock = MockTransport::new();
        mock.insert(
            "tm/ltm/virtual/~Common~vs",
            json!({"name": "vs", "partition": "Common", "destination": "/Common/10.0.1.10:80"}),
        );
        mock.insert(
            "tm/ltm/virtual/~Common~vs/profiles",
            json!({"items": [{"name": "tcp", "partition": "Common", "context": "all", "fullPath": "/Common/tcp"}]}),
        );
        mock.insert(
            "tm/ltm/virtual/~Common~vs/policies",
            json!({"items": [{"name": "forward", "partition": "Common", "fullPath": "/Common/forward"}]}),
        );
        let client = Client::with_transport(mock);

        let vs = client
            .fetch(&VirtualServer::default(), &ResourceId::new("Common", "vs"))
            .unwrap()
            .unwrap();
        assert_eq!(vs.profiles.len(), 1);
        assert_eq!(vs.profiles[0].context, "all");
        assert_eq!(vs.policies, vec!["/Common/forward".to_string()]);
    }

    #[test]
    fn test_policy_path_forms() {
        assert_eq!(policy_path(&json!("/Common/p")).unwrap(), "/Common/p");
        assert_eq!(policy_path(&json!({"name": "p"})).unwrap(), "/Common/p");
        assert_eq!(
            policy_path(&json!({"name": "p", "partition": "Prod"})).unwrap(),
            "/Prod/p"
        );
        assert!(policy_path(&json!(42)).is_none());
    }
}
