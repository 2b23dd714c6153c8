//! Health monitors.
//!
//! Monitors live in a collection per parent type (`ltm/monitor/http`,
//! `ltm/monitor/gateway_icmp`, ...), derived from `defaults_from`.

use crate::codec::{self, ENABLED_DISABLED, ENABLED_ONLY, Field, Record, Schema};
use crate::id::ResourceId;
use crate::{Resource, ltm};
use serde::{Deserialize, Serialize};

/// Parent types tried in turn when a monitor is read without knowing its parent.
pub const MONITOR_TYPES: &[&str] = &["http", "https", "icmp", "gateway_icmp", "tcp", "udp"];

const GATEWAY_ICMP: &str = "gateway_icmp";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitor {
    pub name: String,
    pub partition: String,
    /// Parent monitor, e.g. `/Common/http`.
    pub defaults_from: String,
    pub description: String,
    pub destination: String,
    pub interval: i64,
    pub ip_dscp: i64,
    pub manual_resume: bool,
    pub password: String,
    pub receive: String,
    pub receive_disable: String,
    pub reverse: bool,
    pub send: String,
    pub time_until_up: i64,
    pub timeout: i64,
    pub transparent: bool,
    pub up_interval: i64,
    pub username: String,
}

static MONITOR: Schema = Schema {
    name: "monitor",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("defaults_from", "defaultsFrom"),
        Field::str("description", "description"),
        Field::str("destination", "destination"),
        Field::int("interval", "interval"),
        Field::int("ip_dscp", "ipDscp"),
        Field::toggle("manual_resume", "manualResume", ENABLED_ONLY),
        Field::str("password", "password"),
        Field::str("receive", "recv"),
        Field::str("receive_disable", "recvDisable"),
        Field::toggle("reverse", "reverse", ENABLED_DISABLED),
        Field::text("send", "send"),
        Field::int("time_until_up", "timeUntilUp"),
        Field::int("timeout", "timeout"),
        Field::toggle("transparent", "transparent", ENABLED_DISABLED),
        Field::int("up_interval", "upInterval"),
        Field::str("username", "username"),
    ],
};

impl Record for Monitor {
    fn schema() -> &'static Schema {
        &MONITOR
    }
}

impl Monitor {
    /// Collection segment for the parent, `None` when no parent is set.
    pub fn parent_type(&self) -> Option<String> {
        let parent = self.defaults_from.rsplit('/').next().unwrap_or_default().trim();
        if parent.is_empty() {
            None
        } else if parent.contains("gateway") {
            Some(GATEWAY_ICMP.to_string())
        } else {
            Some(parent.to_string())
        }
    }
}

impl Resource for Monitor {
    const TYPE_NAME: &'static str = "bigip_ltm_monitor";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        let parent = self.parent_type().unwrap_or_else(|| MONITOR_TYPES[0].to_string());
        ltm::collection(&format!("monitor/{parent}"))
    }

    fn candidate_paths(&self, id: &ResourceId) -> Vec<String> {
        if self.parent_type().is_some() {
            return vec![self.item_path(id)];
        }
        MONITOR_TYPES
            .iter()
            .map(|kind| format!("{}/monitor/{kind}/{}", ltm::LTM, id.url_segment()))
            .collect()
    }

    fn prepare(&mut self) {
        self.send = codec::escape_crlf(&self.send);
        if self.parent_type().as_deref() == Some(GATEWAY_ICMP) {
            let prefix = self
                .defaults_from
                .rsplit_once('/')
                .map(|(prefix, _)| format!("{prefix}/"))
                .unwrap_or_default();
            self.defaults_from = format!("{prefix}{GATEWAY_ICMP}");
        }
    }
}
