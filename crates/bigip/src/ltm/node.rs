//! Nodes: back-end server addresses.

use crate::codec::{ENABLED_DISABLED, Field, Record, Schema};
use crate::{Resource, ltm};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub name: String,
    pub partition: String,
    pub description: String,
    pub address: String,
    pub connection_limit: i64,
    pub dynamic_ratio: i64,
    pub logging: bool,
    pub monitor: String,
    pub rate_limit: String,
    pub ratio: i64,
    pub session: String,
    pub state: String,
}

static NODE: Schema = Schema {
    name: "node",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("description", "description"),
        Field::str("address", "address"),
        Field::int("connection_limit", "connectionLimit"),
        Field::int("dynamic_ratio", "dynamicRatio"),
        Field::toggle("logging", "logging", ENABLED_DISABLED),
        Field::str("monitor", "monitor"),
        Field::str("rate_limit", "rateLimit"),
        Field::int("ratio", "ratio"),
        Field::str("session", "session"),
        Field::str("state", "state"),
    ],
};

impl Record for Node {
    fn schema() -> &'static Schema {
        &NODE
    }
}

impl Resource for Node {
    const TYPE_NAME: &'static str = "bigip_ltm_node";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        ltm::collection("node")
    }
}
