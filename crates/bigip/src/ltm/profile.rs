//! Protocol profiles: TCP, FastHTTP, FastL4, OneConnect, HTTP compression.
//!
//! All of them derive from a parent via `defaults_from`; settings left unset
//! are inherited from it, including after a replace.

use crate::codec::{ENABLED_ONLY, Field, Record, Schema};
use crate::{Resource, ltm};
use serde::{Deserialize, Serialize};

fn profile_collection(kind: &str) -> String {
    ltm::collection(&format!("profile/{kind}"))
}

// ============================================================================
// TCP
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpProfile {
    pub name: String,
    pub partition: String,
    pub defaults_from: String,
    pub idle_timeout: i64,
    pub close_wait_timeout: i64,
    pub finwait_2timeout: i64,
    pub finwait_timeout: i64,
    pub keepalive_interval: i64,
    pub deferred_accept: bool,
    pub fast_open: bool,
}

static TCP_PROFILE: Schema = Schema {
    name: "tcp profile",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("defaults_from", "defaultsFrom"),
        Field::int("idle_timeout", "idleTimeout"),
        Field::int("close_wait_timeout", "closeWaitTimeout"),
        Field::int("finwait_2timeout", "finWait_2Timeout"),
        Field::int("finwait_timeout", "finWaitTimeout"),
        Field::int("keepalive_interval", "keepAliveInterval"),
        Field::toggle("deferred_accept", "deferredAccept", ENABLED_ONLY),
        Field::toggle("fast_open", "fastOpen", ENABLED_ONLY),
    ],
};

impl Record for TcpProfile {
    fn schema() -> &'static Schema {
        &TCP_PROFILE
    }
}

impl Resource for TcpProfile {
    const TYPE_NAME: &'static str = "bigip_ltm_profile_tcp";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        profile_collection("tcp")
    }
}

// ============================================================================
// FastHTTP
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastHttpProfile {
    pub name: String,
    pub partition: String,
    pub defaults_from: String,
    pub idle_timeout: i64,
    pub connpool_idle_timeout_override: i64,
    pub connpool_max_reuse: i64,
    pub connpool_max_size: i64,
    pub connpool_min_size: i64,
    pub connpool_replenish: bool,
    pub connpool_step: i64,
    pub force_http_10_response: bool,
    pub max_header_size: i64,
}

static FASTHTTP_PROFILE: Schema = Schema {
    name: "fasthttp profile",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("defaults_from", "defaultsFrom"),
        Field::int("idle_timeout", "idleTimeout"),
        Field::int("connpool_idle_timeout_override", "connpoolIdleTimeoutOverride"),
        Field::int("connpool_max_reuse", "connpoolMaxReuse"),
        Field::int("connpool_max_size", "connpoolMaxSize"),
        Field::int("connpool_min_size", "connpoolMinSize"),
        Field::toggle("connpool_replenish", "connpoolReplenish", ENABLED_ONLY),
        Field::int("connpool_step", "connpoolStep"),
        Field::toggle("force_http_10_response", "forceHttp_10Response", ENABLED_ONLY),
        Field::int("max_header_size", "maxHeaderSize"),
    ],
};

impl Record for FastHttpProfile {
    fn schema() -> &'static Schema {
        &FASTHTTP_PROFILE
    }
}

impl Resource for FastHttpProfile {
    const TYPE_NAME: &'static str = "bigip_ltm_profile_fasthttp";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        profile_collection("fasthttp")
    }
}

// ============================================================================
// FastL4
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastL4Profile {
    pub name: String,
    pub partition: String,
    pub defaults_from: String,
    pub client_timeout: i64,
    pub explicit_flow_migration: bool,
    pub hardware_syn_cookie: bool,
    /// Seconds, or `indefinite`.
    pub idle_timeout: String,
    pub ip_tos_to_client: String,
    pub ip_tos_to_server: String,
    pub keepalive_interval: String,
}

static FASTL4_PROFILE: Schema = Schema {
    name: "fastl4 profile",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("defaults_from", "defaultsFrom"),
        Field::int("client_timeout", "clientTimeout"),
        Field::toggle("explicit_flow_migration", "explicitFlowMigration", ENABLED_ONLY),
        Field::toggle("hardware_syn_cookie", "hardwareSynCookie", ENABLED_ONLY),
        Field::str("idle_timeout", "idleTimeout"),
        Field::str("ip_tos_to_client", "ipTosToClient"),
        Field::str("ip_tos_to_server", "ipTosToServer"),
        Field::str("keepalive_interval", "keepAliveInterval"),
    ],
};

impl Record for FastL4Profile {
    fn schema() -> &'static Schema {
        &FASTL4_PROFILE
    }
}

impl Resource for FastL4Profile {
    const TYPE_NAME: &'static str = "bigip_ltm_profile_fastl4";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        profile_collection("fastl4")
    }
}

// ============================================================================
// OneConnect
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneConnectProfile {
    pub name: String,
    pub partition: String,
    pub defaults_from: String,
    pub idle_timeout_override: String,
    pub max_age: i64,
    pub max_reuse: i64,
    pub max_size: i64,
    pub source_mask: String,
    pub share_pools: bool,
}

static ONECONNECT_PROFILE: Schema = Schema {
    name: "oneconnect profile",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("defaults_from", "defaultsFrom"),
        Field::str("idle_timeout_override", "idleTimeoutOverride"),
        Field::int("max_age", "maxAge"),
        Field::int("max_reuse", "maxReuse"),
        Field::int("max_size", "maxSize"),
        Field::str("source_mask", "sourceMask"),
        Field::toggle("share_pools", "sharePools", ENABLED_ONLY),
    ],
};

impl Record for OneConnectProfile {
    fn schema() -> &'static Schema {
        &ONECONNECT_PROFILE
    }
}

impl Resource for OneConnectProfile {
    const TYPE_NAME: &'static str = "bigip_ltm_profile_oneconnect";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        profile_collection("one-connect")
    }
}

// ============================================================================
// HTTP compression
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpCompressProfile {
    pub name: String,
    pub partition: String,
    pub defaults_from: String,
    pub uri_exclude: Vec<String>,
    pub uri_include: Vec<String>,
    pub content_type_include: Vec<String>,
    pub content_type_exclude: Vec<String>,
}

static HTTPCOMPRESS_PROFILE: Schema = Schema {
    name: "http compression profile",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("defaults_from", "defaultsFrom"),
        Field::str_list("uri_exclude", "uriExclude"),
        Field::str_list("uri_include", "uriInclude"),
        Field::str_list("content_type_include", "contentTypeInclude"),
        Field::str_list("content_type_exclude", "contentTypeExclude"),
    ],
};

impl Record for HttpCompressProfile {
    fn schema() -> &'static Schema {
        &HTTPCOMPRESS_PROFILE
    }
}

impl Resource for HttpCompressProfile {
    const TYPE_NAME: &'static str = "bigip_ltm_profile_httpcompress";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        profile_collection("http-compression")
    }
}
