//! Pools and their members.

use crate::codec::{self, ENABLED_DISABLED, Field, Record, Schema, YES_NO};
use crate::error::Result;
use crate::{Client, Resource, ltm};
use serde::{Deserialize, Serialize};

/// A pool member, named `<node>:<port>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolMember {
    pub name: String,
    pub partition: String,
    pub address: String,
    pub connection_limit: i64,
    pub priority_group: i64,
    pub ratio: i64,
    pub monitor: String,
}

static POOL_MEMBER: Schema = Schema {
    name: "pool member",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("address", "address"),
        Field::int("connection_limit", "connectionLimit"),
        Field::int("priority_group", "priorityGroup"),
        Field::int("ratio", "ratio"),
        Field::str("monitor", "monitor"),
    ],
};

impl Record for PoolMember {
    fn schema() -> &'static Schema {
        &POOL_MEMBER
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pool {
    pub name: String,
    pub partition: String,
    pub description: String,
    pub allow_nat: bool,
    pub allow_snat: bool,
    pub ignore_persisted_weight: bool,
    pub ip_tos_to_client: String,
    pub ip_tos_to_server: String,
    pub link_qos_to_client: String,
    pub link_qos_to_server: String,
    pub load_balancing_mode: String,
    pub min_active_members: i64,
    pub min_up_members: i64,
    pub min_up_members_action: String,
    pub min_up_members_checking: String,
    pub monitor: String,
    pub queue_depth_limit: i64,
    pub queue_on_connection_limit: bool,
    pub queue_time_limit: i64,
    pub reselect_tries: i64,
    pub slow_ramp_time: i64,
    pub members: Vec<PoolMember>,
}

static POOL: Schema = Schema {
    name: "pool",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("description", "description"),
        Field::toggle("allow_nat", "allowNat", YES_NO),
        Field::toggle("allow_snat", "allowSnat", YES_NO),
        Field::toggle("ignore_persisted_weight", "ignorePersistedWeight", ENABLED_DISABLED),
        Field::str("ip_tos_to_client", "ipTosToClient"),
        Field::str("ip_tos_to_server", "ipTosToServer"),
        Field::str("link_qos_to_client", "linkQosToClient"),
        Field::str("link_qos_to_server", "linkQosToServer"),
        Field::str("load_balancing_mode", "loadBalancingMode"),
        Field::int("min_active_members", "minActiveMembers"),
        Field::int("min_up_members", "minUpMembers"),
        Field::str("min_up_members_action", "minUpMembersAction"),
        Field::str("min_up_members_checking", "minUpMembersChecking"),
        // An empty monitor string clears the pool's monitor on replace.
        Field::str("monitor", "monitor").always(),
        Field::int("queue_depth_limit", "queueDepthLimit"),
        Field::toggle("queue_on_connection_limit", "queueOnConnectionLimit", ENABLED_DISABLED),
        Field::int("queue_time_limit", "queueTimeLimit"),
        Field::int("reselect_tries", "reselectTries"),
        Field::int("slow_ramp_time", "slowRampTime"),
        Field::collection("members", "membersReference", &POOL_MEMBER),
    ],
};

impl Record for Pool {
    fn schema() -> &'static Schema {
        &POOL
    }
}

impl Resource for Pool {
    const TYPE_NAME: &'static str = "bigip_ltm_pool";
    const TIER: u8 = ltm::TIER_POOL;

    fn collection_path(&self) -> String {
        ltm::collection("pool")
    }

    fn read_children(&mut self, client: &Client, item_path: &str) -> Result<()> {
        self.members = client
            .get_items(&format!("{item_path}/members"))?
            .iter()
            .map(codec::decode::<PoolMember>)
            .collect::<Result<_>>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::{MockTransport, ResourceId};
    use serde_json::json;

    fn sample() -> Pool {
        Pool {
            name: "/Common/web".to_string(),
            partition: "Common".to_string(),
            description: "web tier".to_string(),
            allow_nat: true,
            allow_snat: false,
            ignore_persisted_weight: true,
            load_balancing_mode: "least-connections-member".to_string(),
            min_active_members: 1,
            monitor: "/Common/http".to_string(),
            queue_on_connection_limit: true,
            slow_ramp_time: 10,
            members: vec![
                PoolMember {
                    name: "/Common/app1:80".to_string(),
                    ratio: 2,
                    ..PoolMember::default()
                },
                PoolMember {
                    name: "/Common/app2:80".to_string(),
                    priority_group: 1,
                    ..PoolMember::default()
                },
            ],
            ..Pool::default()
        }
    }

    #[test]
    fn test_round_trip() {
        for pool in [Pool::default(), sample()] {
            assert_eq!(decode::<Pool>(&encode(&pool).unwrap()).unwrap(), pool);
        }
    }

    #[test]
    fn test_tokens_and_envelope() {
        let wire = encode(&sample()).unwrap();
        assert_eq!(wire["allowNat"], json!("yes"));
        assert_eq!(wire["allowSnat"], json!("no"));
        assert_eq!(wire["ignorePersistedWeight"], json!("enabled"));
        assert_eq!(wire["membersReference"]["items"][0]["name"], json!("/Common/app1:80"));

        let wire = encode(&Pool::default()).unwrap();
        assert_eq!(wire["monitor"], json!(""));
        assert_eq!(wire["membersReference"], json!({"items": []}));
    }

    #[test]
    fn test_read_children_fetches_members() {
        let mock = MockTransport::new();
        mock.insert(
            "tm/ltm/pool/~Common~web",
            json!({
                "name": "web",
                "partition": "Common",
                "allowSnat": "yes",
                "membersReference": {"link": "https://localhost/mgmt/tm/ltm/pool/~Common~web/members"},
            }),
        );
        mock.insert(
            "tm/ltm/pool/~Common~web/members",
            json!({"items": [{"name": "app1:80", "partition": "Common", "address": "10.0.0.10", "state": "up"}]}),
        );
        let client = Client::with_transport(mock);

        let pool = client
            .fetch(&Pool::default(), &ResourceId::new("Common", "web"))
            .unwrap()
            .unwrap();
        assert!(pool.allow_snat);
        assert_eq!(pool.members.len(), 1);
        assert_eq!(pool.members[0].address, "10.0.0.10");
    }
}
