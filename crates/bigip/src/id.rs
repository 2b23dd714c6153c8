//! Partition-scoped object identity.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Partition used when an identity carries no partition.
pub const DEFAULT_PARTITION: &str = "Common";

static FULL_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([A-Za-z0-9_.\-]+)/([A-Za-z0-9_.:%\-]+)$").expect("static regex")
});

static BARE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.:%\-]+$").expect("static regex"));

/// Identity of an object on the appliance: `(partition, name)`.
///
/// Parsed from `/Partition/name` or a bare `name`, rendered as
/// `/Partition/name` and as the URL segment `~Partition~name`.
///
/// ```
/// use bigip::ResourceId;
///
/// let id: ResourceId = "/Common/web-pool".parse().unwrap();
/// assert_eq!(id.partition, "Common");
/// assert_eq!(id.name, "web-pool");
/// assert_eq!(id.url_segment(), "~Common~web-pool");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub partition: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(partition: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            name: name.into(),
        }
    }

    /// Build an identity from a record's `name` and `partition` fields.
    ///
    /// A `name` that is already a full path wins over `partition`.
    pub fn from_parts(name: &str, partition: &str) -> Result<Self> {
        if name.starts_with('/') {
            return name.parse();
        }
        let partition = if partition.is_empty() {
            DEFAULT_PARTITION
        } else {
            partition
        };
        format!("/{partition}/{name}").parse()
    }

    /// `~Partition~name`, the form used in REST item paths.
    pub fn url_segment(&self) -> String {
        format!("~{}~{}", self.partition, self.name)
    }

    /// `/Partition/name`, the form the appliance reports as `fullPath`.
    pub fn full_path(&self) -> String {
        format!("/{}/{}", self.partition, self.name)
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(caps) = FULL_PATH.captures(s) {
            return Ok(Self::new(&caps[1], &caps[2]));
        }
        if BARE_NAME.is_match(s) {
            return Ok(Self::new(DEFAULT_PARTITION, s));
        }
        Err(Error::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.partition, self.name)
    }
}
