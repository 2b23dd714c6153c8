//! Device groups and their membership.

use crate::codec::{ENABLED_DISABLED, Field, Record, Schema, TRUE_FALSE};
use crate::{Resource, cm};
use serde::{Deserialize, Serialize};

/// A device in a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGroupMember {
    /// Device name, e.g. `bigip1.example.com`.
    pub name: String,
    pub set_sync_leader: bool,
}

static DEVICE_GROUP_MEMBER: Schema = Schema {
    name: "device group member",
    fields: &[
        Field::str("name", "name").always(),
        Field::flag("set_sync_leader", "setSyncLeader").always(),
    ],
};

impl Record for DeviceGroupMember {
    fn schema() -> &'static Schema {
        &DEVICE_GROUP_MEMBER
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGroup {
    pub name: String,
    pub partition: String,
    pub description: String,
    /// `sync-only` or `sync-failover`.
    #[serde(rename = "type")]
    pub kind: String,
    pub auto_sync: bool,
    pub full_load_on_sync: bool,
    pub save_on_auto_sync: bool,
    pub network_failover: bool,
    pub incremental_config_sync_size_max: i64,
    pub devices: Vec<DeviceGroupMember>,
}

static DEVICE_GROUP: Schema = Schema {
    name: "device group",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("description", "description"),
        Field::str("type", "type"),
        Field::toggle("auto_sync", "autoSync", ENABLED_DISABLED),
        Field::toggle("full_load_on_sync", "fullLoadOnSync", TRUE_FALSE),
        Field::toggle("save_on_auto_sync", "saveOnAutoSync", TRUE_FALSE),
        Field::toggle("network_failover", "networkFailover", ENABLED_DISABLED),
        Field::int("incremental_config_sync_size_max", "incrementalConfigSyncSizeMax"),
        Field::collection("devices", "deviceReference", &DEVICE_GROUP_MEMBER),
    ],
};

impl Record for DeviceGroup {
    fn schema() -> &'static Schema {
        &DEVICE_GROUP
    }
}

impl Resource for DeviceGroup {
    const TYPE_NAME: &'static str = "bigip_cm_devicegroup";
    const TIER: u8 = cm::TIER_DEVICE_GROUP;

    fn collection_path(&self) -> String {
        format!("{}/device-group", cm::CM)
    }
}
