//! iRules.

use crate::codec::{Field, Record, Schema};
use crate::{Resource, ltm};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IRule {
    pub name: String,
    pub partition: String,
    /// TCL source.
    pub rule: String,
}

static IRULE: Schema = Schema {
    name: "irule",
    fields: &[
        Field::str("name", "name").always(),
        Field::str("partition", "partition"),
        Field::str("rule", "apiAnonymous"),
    ],
};

impl Record for IRule {
    fn schema() -> &'static Schema {
        &IRULE
    }
}

impl Resource for IRule {
    const TYPE_NAME: &'static str = "bigip_ltm_irule";
    const TIER: u8 = ltm::TIER_BASE;

    fn collection_path(&self) -> String {
        ltm::collection("rule")
    }

    // The appliance stores the body without surrounding whitespace.
    fn prepare(&mut self) {
        let trimmed = self.rule.trim();
        if trimmed.len() != self.rule.len() {
            self.rule = trimmed.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let rule = IRule {
            name: "/Common/redirect".to_string(),
            partition: "Common".to_string(),
            rule: "when HTTP_REQUEST {\n  HTTP::redirect https://[HTTP::host][HTTP::uri]\n}".to_string(),
        };
        for r in [IRule::default(), rule] {
            assert_eq!(decode::<IRule>(&encode(&r).unwrap()).unwrap(), r);
        }
    }

    #[test]
    fn test_body_key_and_trim() {
        let mut rule = IRule {
            name: "r1".to_string(),
            rule: "\n when CLIENT_ACCEPTED { }\n\n".to_string(),
            ..IRule::default()
        };
        rule.prepare();
        let wire = encode(&rule).unwrap();
        assert_eq!(wire["apiAnonymous"], json!("when CLIENT_ACCEPTED { }"));
    }
}
