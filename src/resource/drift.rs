//! Drift between declared and observed attributes
//!
//! Only what the user declared is compared. After a full replace every
//! undeclared attribute holds the appliance default, which is not drift.

use serde_json::{Map, Value};

/// One declared attribute whose observed value differs.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Dotted path, with `[i]` for list positions.
    pub path: String,
    /// Observed value, `None` when the appliance does not report it.
    pub from: Option<Value>,
    pub to: Value,
}

/// Declared attributes that differ from observed ones.
pub fn changes(declared: &Value, observed: &Value) -> Vec<Change> {
    let mut out = Vec::new();
    walk("", declared, observed, &mut out);
    out
}

fn walk(path: &str, declared: &Value, observed: &Value, out: &mut Vec<Change>) {
    match (declared, observed) {
        (Value::Object(d), Value::Object(o)) => {
            for (key, value) in d {
                let child = join(path, key);
                match o.get(key) {
                    Some(seen) => walk(&child, value, seen, out),
                    None => out.push(Change {
                        path: child,
                        from: None,
                        to: value.clone(),
                    }),
                }
            }
        }
        (Value::Array(d), Value::Array(o)) if d.len() == o.len() => {
            for (i, (value, seen)) in d.iter().zip(o).enumerate() {
                walk(&format!("{path}[{i}]"), value, seen, out);
            }
        }
        _ if equivalent(declared, observed) => {}
        _ => out.push(Change {
            path: path.to_string(),
            from: Some(observed.clone()),
            to: declared.clone(),
        }),
    }
}

/// Scalar comparison that ignores surrounding whitespace in text
fn equivalent(declared: &Value, observed: &Value) -> bool {
    match (declared, observed) {
        (Value::String(a), Value::String(b)) => a.trim() == b.trim(),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => declared == observed,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Keep only the parts of `full` that `shape` declares.
///
/// Used to compare a normalized record (policy ordinals renumbered, monitor
/// parents rewritten) without pulling in every default field.
pub fn project(full: &Value, shape: &Value) -> Value {
    match (full, shape) {
        (Value::Object(f), Value::Object(s)) => {
            let kept: Map<String, Value> = s
                .iter()
                .map(|(key, sub)| {
                    let value = f.get(key).map_or_else(|| sub.clone(), |v| project(v, sub));
                    (key.clone(), value)
                })
                .collect();
            Value::Object(kept)
        }
        (Value::Array(f), Value::Array(s)) if f.len() == s.len() => {
            Value::Array(f.iter().zip(s).map(|(v, sub)| project(v, sub)).collect())
        }
        _ => full.clone(),
    }
}

/// One-line summary of changes: `a=1, b="x"`
pub fn summarize(changes: &[Change], observed: bool) -> String {
    changes
        .iter()
        .map(|c| {
            let value = if observed {
                c.from.as_ref().map_or_else(|| "(unset)".to_string(), Value::to_string)
            } else {
                c.to.to_string()
            };
            format!("{}={value}", c.path)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_undeclared_attributes_are_not_drift() {
        let declared = json!({"name": "web", "allow_snat": true});
        let observed = json!({
            "name": "web",
            "partition": "Common",
            "allow_snat": true,
            "load_balancing_mode": "round-robin"
        });
        assert!(changes(&declared, &observed).is_empty());
    }

    #[test]
    fn test_scalar_and_nested_drift() {
        let declared = json!({
            "load_balancing_mode": "ratio-member",
            "members": [{"name": "/Common/n1:80", "ratio": 2}]
        });
        let observed = json!({
            "load_balancing_mode": "round-robin",
            "members": [{"name": "/Common/n1:80", "ratio": 1, "state": "up"}]
        });
        let found = changes(&declared, &observed);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path, "load_balancing_mode");
        assert_eq!(found[1].path, "members[0].ratio");
        assert_eq!(found[1].from, Some(json!(1)));
        assert_eq!(summarize(&found, false), r#"load_balancing_mode="ratio-member", members[0].ratio=2"#);
    }

    #[test]
    fn test_list_length_change_is_one_change() {
        let declared = json!({"members": [{"name": "a"}, {"name": "b"}]});
        let observed = json!({"members": [{"name": "a"}]});
        let found = changes(&declared, &observed);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "members");
    }

    #[test]
    fn test_text_ignores_trailing_newline() {
        let declared = json!({"rule": "when HTTP_REQUEST { }\n"});
        let observed = json!({"rule": "when HTTP_REQUEST { }"});
        assert!(changes(&declared, &observed).is_empty());
    }

    #[test]
    fn test_project() {
        let full = json!({
            "name": "p",
            "strategy": "",
            "rules": [{"name": "r", "ordinal": 0, "description": ""}]
        });
        let shape = json!({"name": "p", "rules": [{"name": "r", "ordinal": 7}]});
        assert_eq!(
            project(&full, &shape),
            json!({"name": "p", "rules": [{"name": "r", "ordinal": 0}]})
        );
    }
}
