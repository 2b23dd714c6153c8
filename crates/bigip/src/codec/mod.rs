//! Domain/wire adapter.
//!
//! Every record type is a flat serde struct plus one static [`Schema`] that
//! says, field by field, how the record looks on the wire. A single generic
//! [`encode`]/[`decode`] pair walks the table:
//!
//! - booleans become per-field string tokens ([`BoolTokens`]),
//! - sub-collections are wrapped in `{"items": [...]}` envelopes,
//! - empty and zero values are omitted unless the field is marked `always`,
//! - multi-line text has its CR-LF pairs escaped.
//!
//! Keys the schema does not list are ignored on decode, so the appliance's
//! bookkeeping fields (`kind`, `selfLink`, `generation`) never reach a record.

mod tokens;

pub use tokens::{BoolTokens, ENABLED_DISABLED, ENABLED_ONLY, TRUE_FALSE, TokenMatch, YES_NO};

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// How a single field is represented on the wire.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Plain string.
    Str,
    /// Integer.
    Int,
    /// Array of strings.
    StrList,
    /// Native JSON boolean, omitted when false.
    Flag,
    /// Boolean rendered as one of two strings.
    Toggle(BoolTokens),
    /// Multi-line string. Real CR-LF pairs are written as the four
    /// characters `\r\n`; text comes back as the appliance stores it.
    Text,
    /// Ordered sub-records inside a `{"items": [...]}` envelope.
    Collection(&'static Schema),
    /// Ordered sub-records as a plain array.
    Records(&'static Schema),
}

impl FieldKind {
    /// Short name used in schema listings.
    pub fn label(&self) -> String {
        match self {
            Self::Str => "string".to_string(),
            Self::Int => "int".to_string(),
            Self::StrList => "list(string)".to_string(),
            Self::Flag => "bool".to_string(),
            Self::Toggle(tokens) => format!("bool ({}/{})", tokens.on, tokens.off),
            Self::Text => "text".to_string(),
            Self::Collection(item) => format!("collection({})", item.name),
            Self::Records(item) => format!("list({})", item.name),
        }
    }
}

/// One row of a field table.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Domain (serde) field name.
    pub name: &'static str,
    /// Wire key.
    pub wire: &'static str,
    pub kind: FieldKind,
    /// Emit even when empty or zero.
    pub always: bool,
}

impl Field {
    const fn new(name: &'static str, wire: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire,
            kind,
            always: false,
        }
    }

    pub const fn str(name: &'static str, wire: &'static str) -> Self {
        Self::new(name, wire, FieldKind::Str)
    }

    pub const fn int(name: &'static str, wire: &'static str) -> Self {
        Self::new(name, wire, FieldKind::Int)
    }

    pub const fn str_list(name: &'static str, wire: &'static str) -> Self {
        Self::new(name, wire, FieldKind::StrList)
    }

    pub const fn flag(name: &'static str, wire: &'static str) -> Self {
        Self::new(name, wire, FieldKind::Flag)
    }

    pub const fn toggle(name: &'static str, wire: &'static str, tokens: BoolTokens) -> Self {
        Self::new(name, wire, FieldKind::Toggle(tokens))
    }

    pub const fn text(name: &'static str, wire: &'static str) -> Self {
        Self::new(name, wire, FieldKind::Text)
    }

    pub const fn collection(name: &'static str, wire: &'static str, item: &'static Schema) -> Self {
        Self::new(name, wire, FieldKind::Collection(item))
    }

    pub const fn records(name: &'static str, wire: &'static str, item: &'static Schema) -> Self {
        Self::new(name, wire, FieldKind::Records(item))
    }

    /// Mark the field as always emitted.
    #[must_use]
    pub const fn always(self) -> Self {
        Self {
            always: true,
            ..self
        }
    }
}

/// Field table for one record type.
#[derive(Debug)]
pub struct Schema {
    /// Record name, used in error context and listings.
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    /// Look up a field by domain name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A record the adapter can encode and decode.
pub trait Record:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// The record's field table.
    fn schema() -> &'static Schema;
}

// ============================================================================
// Encode
// ============================================================================

/// Encode a record into its wire representation.
pub fn encode<R: Record>(record: &R) -> Result<Value> {
    let schema = R::schema();
    let domain = serde_json::to_value(record).map_err(|source| Error::Encode {
        context: schema.name.to_string(),
        source,
    })?;
    Ok(encode_object(schema, &domain))
}

fn encode_object(schema: &Schema, domain: &Value) -> Value {
    let mut wire = Map::new();
    for field in schema.fields {
        let value = domain.get(field.name).unwrap_or(&Value::Null);
        if let Some(encoded) = encode_field(field, value) {
            wire.insert(field.wire.to_string(), encoded);
        }
    }
    Value::Object(wire)
}

fn encode_field(field: &Field, value: &Value) -> Option<Value> {
    let keep = |empty: bool| !empty || field.always;

    match field.kind {
        FieldKind::Str => {
            let s = value.as_str().unwrap_or_default();
            keep(s.is_empty()).then(|| Value::String(s.to_string()))
        }
        FieldKind::Text => {
            let s = value.as_str().unwrap_or_default();
            keep(s.is_empty()).then(|| Value::String(escape_crlf(s)))
        }
        FieldKind::Int => {
            let zero = value.is_null() || value.as_i64() == Some(0);
            keep(zero).then(|| if value.is_null() { Value::from(0) } else { value.clone() })
        }
        FieldKind::StrList => {
            let items = value.as_array().cloned().unwrap_or_default();
            keep(items.is_empty()).then(|| Value::Array(items))
        }
        FieldKind::Flag => {
            let on = value.as_bool().unwrap_or(false);
            keep(!on).then_some(Value::Bool(on))
        }
        FieldKind::Toggle(tokens) => {
            let on = value.as_bool().unwrap_or(false);
            tokens.encode(on).map(|t| Value::String(t.to_string()))
        }
        FieldKind::Collection(item) => {
            let items = encode_items(item, value);
            let mut envelope = Map::new();
            envelope.insert("items".to_string(), Value::Array(items));
            Some(Value::Object(envelope))
        }
        FieldKind::Records(item) => {
            let items = encode_items(item, value);
            keep(items.is_empty()).then(|| Value::Array(items))
        }
    }
}

fn encode_items(item: &Schema, value: &Value) -> Vec<Value> {
    value
        .as_array()
        .map(|items| items.iter().map(|v| encode_object(item, v)).collect())
        .unwrap_or_default()
}

/// Write CR-LF pairs as the literal escape the appliance expects. Text that
/// is already escaped is left as is.
pub(crate) fn escape_crlf(s: &str) -> String {
    s.replace("\r\n", "\\r\\n")
}

// ============================================================================
// Decode
// ============================================================================

/// Decode a wire value into a record.
pub fn decode<R: Record>(wire: &Value) -> Result<R> {
    let schema = R::schema();
    let domain = decode_object(schema, wire)?;
    serde_json::from_value(domain).map_err(|e| Error::decode(schema.name, e))
}

/// Parse raw JSON text and decode it into a record.
pub fn decode_str<R: Record>(body: &str) -> Result<R> {
    let wire: Value = serde_json::from_str(body).map_err(|e| Error::decode(R::schema().name, e))?;
    decode(&wire)
}

fn decode_object(schema: &Schema, wire: &Value) -> Result<Value> {
    let Some(object) = wire.as_object() else {
        return Err(structural(schema.name, "an object", wire));
    };

    let mut domain = Map::new();
    for field in schema.fields {
        match object.get(field.wire) {
            None | Some(Value::Null) => {
                if let FieldKind::Collection(_) | FieldKind::Records(_) = field.kind {
                    domain.insert(field.name.to_string(), Value::Array(Vec::new()));
                }
            }
            Some(value) => {
                let decoded = decode_field(schema, field, value)?;
                domain.insert(field.name.to_string(), decoded);
            }
        }
    }
    Ok(Value::Object(domain))
}

fn decode_field(schema: &Schema, field: &Field, value: &Value) -> Result<Value> {
    match field.kind {
        FieldKind::Str
        | FieldKind::Int
        | FieldKind::StrList
        | FieldKind::Flag
        | FieldKind::Text => Ok(value.clone()),
        FieldKind::Toggle(tokens) => Ok(Value::Bool(decode_toggle(schema, field, tokens, value))),
        FieldKind::Collection(item) => {
            if !value.is_object() {
                return Err(structural(field.wire, "a reference object", value));
            }
            match value.get("items") {
                None | Some(Value::Null) => Ok(Value::Array(Vec::new())),
                Some(items) => decode_items(item, field, items),
            }
        }
        FieldKind::Records(item) => decode_items(item, field, value),
    }
}

fn decode_items(item: &Schema, field: &Field, items: &Value) -> Result<Value> {
    let Some(items) = items.as_array() else {
        return Err(structural(field.wire, "an array", items));
    };
    items
        .iter()
        .map(|v| decode_object(item, v))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn decode_toggle(schema: &Schema, field: &Field, tokens: BoolTokens, value: &Value) -> bool {
    let token = match value {
        Value::Bool(b) => return *b,
        Value::String(s) => s.as_str(),
        other => {
            log::warn!(
                "{}.{}: expected a boolean token, got {other}; treating as false",
                schema.name,
                field.wire
            );
            return false;
        }
    };
    match tokens.classify(token) {
        TokenMatch::On => true,
        TokenMatch::Off => false,
        TokenMatch::Unrecognized => {
            log::warn!(
                "{}.{}: unrecognized token '{token}' (expected '{}' or '{}'); treating as false",
                schema.name,
                field.wire,
                tokens.on,
                tokens.off
            );
            false
        }
    }
}

fn structural(context: &str, expected: &str, got: &Value) -> Error {
    let source = <serde_json::Error as serde::de::Error>::custom(format!(
        "expected {expected}, got {got}"
    ));
    Error::decode(context, source)
}
