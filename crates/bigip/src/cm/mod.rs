//! Device management objects under `/mgmt/tm/cm`.

pub mod device_group;

pub use device_group::{DeviceGroup, DeviceGroupMember};

/// Root of the device management collections.
pub const CM: &str = "tm/cm";

/// Device groups are configured after the objects they synchronize.
pub(crate) const TIER_DEVICE_GROUP: u8 = 4;
