//! Local traffic policies.
//!
//! A policy holds an ordered list of rules; each rule holds ordered
//! conditions and actions. Order is carried by the rule `ordinal` and by the
//! names of actions and conditions (`"0"`, `"1"`, ...), which the appliance
//! does not assign itself. [`normalize_policy`] regenerates both from
//! sequence order and runs before every write.

use crate::codec::{self, Field, Record, Schema};
use crate::error::Result;
use crate::{Client, Resource, ltm};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleCondition {
    pub name: String,
    /// Header or cookie name for header/cookie conditions.
    pub tm_name: String,
    pub index: i64,
    pub request: bool,
    pub response: bool,
    pub http_host: bool,
    pub http_uri: bool,
    pub http_header: bool,
    pub http_method: bool,
    pub tcp: bool,
    pub address: bool,
    pub host: bool,
    pub path: bool,
    pub equals: bool,
    pub starts_with: bool,
    pub ends_with: bool,
    pub contains: bool,
    pub not: bool,
    pub case_insensitive: bool,
    pub values: Vec<String>,
}

static RULE_CONDITION: Schema = Schema {
    name: "policy rule condition",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("tm_name", "tmName"),
        Field::int("index", "index"),
        Field::flag("request", "request"),
        Field::flag("response", "response"),
        Field::flag("http_host", "httpHost"),
        Field::flag("http_uri", "httpUri"),
        Field::flag("http_header", "httpHeader"),
        Field::flag("http_method", "httpMethod"),
        Field::flag("tcp", "tcp"),
        Field::flag("address", "address"),
        Field::flag("host", "host"),
        Field::flag("path", "path"),
        Field::flag("equals", "equals"),
        Field::flag("starts_with", "startsWith"),
        Field::flag("ends_with", "endsWith"),
        Field::flag("contains", "contains"),
        Field::flag("not", "not"),
        Field::flag("case_insensitive", "caseInsensitive"),
        Field::str_list("values", "values"),
    ],
};

impl Record for RuleCondition {
    fn schema() -> &'static Schema {
        &RULE_CONDITION
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleAction {
    pub name: String,
    pub request: bool,
    pub response: bool,
    pub forward: bool,
    pub reset: bool,
    pub select: bool,
    pub redirect: bool,
    pub replace: bool,
    pub http_reply: bool,
    pub http_host: bool,
    pub http_uri: bool,
    pub http_header: bool,
    pub insert: bool,
    pub remove: bool,
    pub enable: bool,
    pub disable: bool,
    pub asm: bool,
    pub log: bool,
    pub tcl: bool,
    pub code: i64,
    pub pool: String,
    pub node: String,
    pub virtual_server: String,
    pub location: String,
    pub tm_name: String,
    pub value: String,
    pub expression: String,
    pub message: String,
}

static RULE_ACTION: Schema = Schema {
    name: "policy rule action",
    fields: &[
        Field::str("name", "name").always(),
        Field::flag("request", "request"),
        Field::flag("response", "response"),
        Field::flag("forward", "forward"),
        Field::flag("reset", "reset"),
        Field::flag("select", "select"),
        Field::flag("redirect", "redirect"),
        Field::flag("replace", "replace"),
        Field::flag("http_reply", "httpReply"),
        Field::flag("http_host", "httpHost"),
        Field::flag("http_uri", "httpUri"),
        Field::flag("http_header", "httpHeader"),
        Field::flag("insert", "insert"),
        Field::flag("remove", "remove"),
        Field::flag("enable", "enable"),
        Field::flag("disable", "disable"),
        Field::flag("asm", "asm"),
        Field::flag("log", "log"),
        Field::flag("tcl", "tcl"),
        Field::int("code", "code"),
        Field::str("pool", "pool"),
        Field::str("node", "node"),
        Field::str("virtual_server", "virtual"),
        Field::str("location", "location"),
        Field::str("tm_name", "tmName"),
        Field::str("value", "value"),
        Field::str("expression", "expression"),
        Field::str("message", "message"),
    ],
};

impl Record for RuleAction {
    fn schema() -> &'static Schema {
        &RULE_ACTION
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRule {
    pub name: String,
    pub ordinal: i64,
    pub description: String,
    pub conditions: Vec<RuleCondition>,
    pub actions: Vec<RuleAction>,
}

static POLICY_RULE: Schema = Schema {
    name: "policy rule",
    fields: &[
        Field::str("name", "name").always(),
        Field::int("ordinal", "ordinal").always(),
        Field::str("description", "description"),
        Field::collection("conditions", "conditionsReference", &RULE_CONDITION),
        Field::collection("actions", "actionsReference", &RULE_ACTION),
    ],
};

impl Record for PolicyRule {
    fn schema() -> &'static Schema {
        &POLICY_RULE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub name: String,
    pub partition: String,
    pub description: String,
    /// `first-match`, `best-match` or `all-match` strategy path.
    pub strategy: String,
    pub controls: Vec<String>,
    pub requires: Vec<String>,
    pub rules: Vec<PolicyRule>,
}

static POLICY: Schema = Schema {
    name: "policy",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("description", "description"),
        Field::str("strategy", "strategy"),
        Field::str_list("controls", "controls"),
        Field::str_list("requires", "requires"),
        Field::collection("rules", "rulesReference", &POLICY_RULE),
    ],
};

impl Record for Policy {
    fn schema() -> &'static Schema {
        &POLICY
    }
}

/// Renumber rules, actions and conditions from their sequence order.
///
/// Rule `i` gets ordinal `i`; within each rule, action and condition `j` are
/// named `j`. Rule names are left alone. Idempotent.
pub fn normalize_policy(policy: &mut Policy) {
    for (i, rule) in policy.rules.iter_mut().enumerate() {
        rule.ordinal = i as i64;
        for (j, action) in rule.actions.iter_mut().enumerate() {
            action.name = j.to_string();
        }
        for (j, condition) in rule.conditions.iter_mut().enumerate() {
            condition.name = j.to_string();
        }
    }
}

impl Resource for Policy {
    const TYPE_NAME: &'static str = "bigip_ltm_policy";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        ltm::collection("policy")
    }

    fn prepare(&mut self) {
        normalize_policy(self);
    }

    fn read_children(&mut self, client: &Client, item_path: &str) -> Result<()> {
        let rules_path = format!("{item_path}/rules");
        let mut rules = client
            .get_items(&rules_path)?
            .iter()
            .map(codec::decode::<PolicyRule>)
            .collect::<Result<Vec<_>>>()?;

        for rule in &mut rules {
            let rule_path = format!("{rules_path}/{}", rule.name);
            rule.actions = client
                .get_items(&format!("{rule_path}/actions"))?
                .iter()
                .map(codec::decode::<RuleAction>)
                .collect::<Result<_>>()?;
            rule.conditions = client
                .get_items(&format!("{rule_path}/conditions"))?
                .iter()
                .map(codec::decode::<RuleCondition>)
                .collect::<Result<_>>()?;
        }
        rules.sort_by_key(|r| r.ordinal);

        self.rules = rules;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::{MockTransport, ResourceId};
    use serde_json::json;

    fn rule(name: &str, actions: usize, conditions: usize) -> PolicyRule {
        PolicyRule {
            name: name.to_string(),
            actions: (0..actions)
                .map(|_| RuleAction {
                    name: "x".to_string(),
                    forward: true,
                    request: true,
                    pool: "/Common/web".to_string(),
                    ..RuleAction::default()
                })
                .collect(),
            conditions: (0..conditions)
                .map(|_| RuleCondition {
                    name: "y".to_string(),
                    http_uri: true,
                    starts_with: true,
                    request: true,
                    values: vec!["/api".to_string()],
                    ..RuleCondition::default()
                })
                .collect(),
            ..PolicyRule::default()
        }
    }

    fn sample() -> Policy {
        Policy {
            name: "/Common/forward".to_string(),
            strategy: "/Common/first-match".to_string(),
            controls: vec!["forwarding".to_string()],
            requires: vec!["http".to_string()],
            rules: vec![rule("r1", 2, 1), rule("r2", 1, 0)],
            ..Policy::default()
        }
    }

    #[test]
    fn test_normalize_assigns_positions() {
        let mut policy = sample();
        policy.rules[0].ordinal = 7;
        policy.rules[1].ordinal = 3;
        normalize_policy(&mut policy);

        assert_eq!(policy.rules[0].ordinal, 0);
        assert_eq!(policy.rules[1].ordinal, 1);
        assert_eq!(policy.rules[0].name, "r1");
        let names: Vec<_> = policy.rules[0].actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1"]);
        assert_eq!(policy.rules[0].conditions[0].name, "0");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut once = sample();
        normalize_policy(&mut once);
        let mut twice = once.clone();
        normalize_policy(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rules_envelope() {
        let mut policy = Policy {
            name: "p".to_string(),
            rules: vec![rule("r1", 1, 0), rule("r2", 1, 0)],
            ..Policy::default()
        };
        policy.prepare();
        let wire = encode(&policy).unwrap();

        let items = wire["rulesReference"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], json!("r1"));
        assert_eq!(items[0]["ordinal"], json!(0));
        assert_eq!(items[1]["ordinal"], json!(1));
        assert_eq!(items[0]["actionsReference"]["items"][0]["name"], json!("0"));
        assert_eq!(items[1]["actionsReference"]["items"][0]["name"], json!("0"));
        assert_eq!(items[0]["conditionsReference"], json!({"items": []}));
    }

    #[test]
    fn test_round_trip() {
        let mut populated = sample();
        normalize_policy(&mut populated);
        for policy in [Policy::default(), populated] {
            assert_eq!(decode::<Policy>(&encode(&policy).unwrap()).unwrap(), policy);
        }
    }

    #[test]
    fn test_read_children_walks_rules() {
        let mut policy = sample();
        normalize_policy(&mut policy);
        let mock = MockTransport::new();
        let client = Client::with_transport(mock.clone());
        client.create(&policy).unwrap();

        let observed = client
            .fetch(&policy, &ResourceId::new("Common", "forward"))
            .unwrap()
            .unwrap();
        assert_eq!(observed.rules, policy.rules);

        let gets: Vec<_> = mock.requests_with("GET").into_iter().map(|r| r.path).collect();
        assert!(gets.contains(&"tm/ltm/policy/~Common~forward/rules/r1/actions".to_string()));
        assert!(gets.contains(&"tm/ltm/policy/~Common~forward/rules/r2/conditions".to_string()));
    }
}
