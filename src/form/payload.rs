//! Normalizes a value snapshot into the wire payload shape.
//!
//! The conversion is deterministic: fields are emitted in schema order,
//! stringified structured values are parsed into real JSON, and empty
//! numeric fields become `null`, never an empty string. The same snapshot
//! always produces the same payload bytes.

use super::validate::ParseCheck;
use crate::error::PayloadError;
use crate::resolve::EditorPlan;
use crate::schema::field::{DeclaredType, FieldDescriptor};
use crate::value::FormValue;
use ahash::AHashMap;
use serde_json::{Map, Value};

/// Normalizes the value of one scalar field.
///
/// `key` is the payload key and may differ from the descriptor's own key for
/// fields nested inside a relation section. An unset field contributes its
/// kind's normalized empty value so the payload shape stays stable across
/// sessions.
pub fn scalar_value(
    key: &str,
    descriptor: &FieldDescriptor,
    check: ParseCheck,
    value: Option<&FormValue>,
) -> Result<Value, PayloadError> {
    let Some(value) = value else {
        return Ok(empty_value(&descriptor.declared));
    };

    let normalized = match value {
        FormValue::Text(s) => match check {
            ParseCheck::Json => {
                if s.trim().is_empty() {
                    Value::Null
                } else {
                    serde_json::from_str(s).map_err(|e| PayloadError::InvalidJson {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?
                }
            }
            ParseCheck::Yaml => {
                if s.trim().is_empty() {
                    Value::Null
                } else {
                    serde_yaml::from_str(s).map_err(|e| PayloadError::InvalidYaml {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?
                }
            }
            ParseCheck::None => Value::String(s.clone()),
        },
        FormValue::Expression(s) => Value::String(s.clone()),
        FormValue::Integer(Some(n)) => Value::Number((*n).into()),
        FormValue::Integer(None) | FormValue::Float(None) => Value::Null,
        FormValue::Float(Some(n)) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| PayloadError::NonFiniteNumber {
                key: key.to_string(),
            })?,
        FormValue::Bool(b) => Value::Bool(*b),
        FormValue::Tags(tags) => Value::Array(tags.iter().cloned().map(Value::String).collect()),
        FormValue::Json(v) => v.clone(),
    };

    Ok(normalized)
}

/// Builds the payload for a flat list of scalar fields, in field order.
pub fn build_payload(
    fields: &[(FieldDescriptor, EditorPlan)],
    values: &AHashMap<String, FormValue>,
) -> Result<Map<String, Value>, PayloadError> {
    let mut payload = Map::new();
    for (descriptor, plan) in fields {
        let check = ParseCheck::for_field(descriptor, plan);
        let value = scalar_value(&descriptor.key, descriptor, check, values.get(&descriptor.key))?;
        payload.insert(descriptor.key.clone(), value);
    }
    Ok(payload)
}

fn empty_value(declared: &DeclaredType) -> Value {
    match declared {
        DeclaredType::Text | DeclaredType::LongText | DeclaredType::Enum => {
            Value::String(String::new())
        }
        DeclaredType::Integer | DeclaredType::Float => Value::Null,
        DeclaredType::Bool => Value::Bool(false),
        DeclaredType::Tags => Value::Array(Vec::new()),
        DeclaredType::Json | DeclaredType::Relation(_) => Value::Null,
    }
}
