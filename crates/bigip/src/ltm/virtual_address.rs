//! Virtual addresses.

use crate::codec::{ENABLED_DISABLED, Field, Record, Schema, TRUE_FALSE, YES_NO};
use crate::{Resource, ltm};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualAddress {
    pub name: String,
    pub partition: String,
    pub description: String,
    pub address: String,
    pub mask: String,
    pub arp: bool,
    pub auto_delete: bool,
    pub connection_limit: i64,
    pub enabled: bool,
    pub floating: bool,
    pub icmp_echo: bool,
    pub inherited_traffic_group: bool,
    pub route_advertisement: bool,
    pub server_scope: String,
    pub traffic_group: String,
    pub unit: i64,
}

static VIRTUAL_ADDRESS: Schema = Schema {
    name: "virtual address",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("description", "description"),
        Field::str("address", "address"),
        Field::str("mask", "mask"),
        Field::toggle("arp", "arp", ENABLED_DISABLED),
        Field::toggle("auto_delete", "autoDelete", TRUE_FALSE),
        Field::int("connection_limit", "connectionLimit"),
        Field::toggle("enabled", "enabled", YES_NO),
        Field::toggle("floating", "floating", ENABLED_DISABLED),
        Field::toggle("icmp_echo", "icmpEcho", ENABLED_DISABLED),
        Field::toggle("inherited_traffic_group", "inheritedTrafficGroup", YES_NO),
        Field::toggle("route_advertisement", "routeAdvertisement", ENABLED_DISABLED),
        Field::str("server_scope", "serverScope"),
        Field::str("traffic_group", "trafficGroup"),
        Field::int("unit", "unit"),
    ],
};

impl Record for VirtualAddress {
    fn schema() -> &'static Schema {
        &VIRTUAL_ADDRESS
    }
}

impl Resource for VirtualAddress {
    const TYPE_NAME: &'static str = "bigip_ltm_virtual_address";
    const TIER: u8 = ltm::TIER_ADDRESS;

    fn collection_path(&self) -> String {
        ltm::collection("virtual-address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let populated = VirtualAddress {
            name: "/Common/10.0.1.10".to_string(),
            address: "10.0.1.10".to_string(),
            mask: "255.255.255.255".to_string(),
            arp: true,
            auto_delete: true,
            enabled: true,
            icmp_echo: true,
            route_advertisement: true,
            traffic_group: "/Common/traffic-group-1".to_string(),
            ..VirtualAddress::default()
        };
        for va in [VirtualAddress::default(), populated] {
            assert_eq!(decode::<VirtualAddress>(&encode(&va).unwrap()).unwrap(), va);
        }
    }

    #[test]
    fn test_mixed_token_pairs() {
        let va = VirtualAddress {
            name: "10.0.1.10".to_string(),
            auto_delete: true,
            enabled: true,
            ..VirtualAddress::default()
        };
        let wire = encode(&va).unwrap();
        assert_eq!(wire["autoDelete"], json!("true"));
        assert_eq!(wire["enabled"], json!("yes"));
        assert_eq!(wire["arp"], json!("disabled"));
        assert_eq!(wire["inheritedTrafficGroup"], json!("no"));
    }
}
