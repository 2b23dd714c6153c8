//! Internal data groups.

use crate::codec::{Field, Record, Schema};
use crate::{Resource, ltm};
use serde::{Deserialize, Serialize};

/// One key/value entry of a data group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataGroupRecord {
    pub name: String,
    pub data: String,
}

static DATA_GROUP_RECORD: Schema = Schema {
    name: "data group record",
    fields: &[Field::str("name", "name").always(), Field::str("data", "data")],
};

impl Record for DataGroupRecord {
    fn schema() -> &'static Schema {
        &DATA_GROUP_RECORD
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataGroup {
    pub name: String,
    pub partition: String,
    /// `string`, `ip` or `integer`.
    #[serde(rename = "type")]
    pub kind: String,
    pub records: Vec<DataGroupRecord>,
}

static DATA_GROUP: Schema = Schema {
    name: "data group",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("type", "type"),
        Field::records("records", "records", &DATA_GROUP_RECORD),
    ],
};

impl Record for DataGroup {
    fn schema() -> &'static Schema {
        &DATA_GROUP
    }
}

impl Resource for DataGroup {
    const TYPE_NAME: &'static str = "bigip_ltm_datagroup";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        ltm::collection("data-group/internal")
    }
}
