//! Local traffic manager objects.
//!
//! Each submodule defines one domain record, its field table and where it
//! lives under `/mgmt/tm/ltm`.

pub mod datagroup;
pub mod irule;
pub mod monitor;
pub mod node;
pub mod policy;
pub mod pool;
pub mod profile;
pub mod virtual_address;
pub mod virtual_server;

pub use datagroup::{DataGroup, DataGroupRecord};
pub use irule::IRule;
pub use monitor::Monitor;
pub use node::Node;
pub use policy::{Policy, PolicyRule, RuleAction, RuleCondition};
pub use pool::{Pool, PoolMember};
pub use profile::{FastHttpProfile, FastL4Profile, HttpCompressProfile, OneConnectProfile, TcpProfile};
pub use virtual_address::VirtualAddress;
pub use virtual_server::{VirtualServer, VirtualServerProfile};

/// Root of the LTM collections.
pub const LTM: &str = "tm/ltm";

/// Tier of objects nothing else depends on being created first.
pub(crate) const TIER_BASE: u8 = 0;
/// Pools reference nodes and monitors.
pub(crate) const TIER_POOL: u8 = 1;
/// Virtual addresses precede the virtual servers that use them.
pub(crate) const TIER_ADDRESS: u8 = 2;
/// Virtual servers reference pools, profiles, iRules and policies.
pub(crate) const TIER_VIRTUAL: u8 = 3;

pub(crate) fn collection(kind: &str) -> String {
    format!("{LTM}/{kind}")
}
