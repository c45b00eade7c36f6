use crate::schema::DeclaredType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The runtime shape of a single form value.
///
/// Every value held by a `FormContainer` is one of these variants; which
/// variant a field carries is decided by the editor component that is
/// currently active for it. `Integer(None)` / `Float(None)` represent an
/// empty or unparseable numeric input box, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormValue {
    Text(String),
    Integer(Option<i64>),
    Float(Option<f64>),
    Bool(bool),
    Tags(Vec<String>),
    Json(serde_json::Value),
    Expression(String),
}

/// Discriminant-only view of a `FormValue`, used for compatibility checks
/// when the active editor component changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Bool,
    Tags,
    Json,
    Expression,
}

impl FormValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FormValue::Text(_) => ValueKind::Text,
            FormValue::Integer(_) => ValueKind::Integer,
            FormValue::Float(_) => ValueKind::Float,
            FormValue::Bool(_) => ValueKind::Bool,
            FormValue::Tags(_) => ValueKind::Tags,
            FormValue::Json(_) => ValueKind::Json,
            FormValue::Expression(_) => ValueKind::Expression,
        }
    }

    /// The canonical empty value for a kind. Used when a type switch has to
    /// discard the previous value.
    pub fn empty_of(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => FormValue::Text(String::new()),
            ValueKind::Integer => FormValue::Integer(None),
            ValueKind::Float => FormValue::Float(None),
            ValueKind::Bool => FormValue::Bool(false),
            ValueKind::Tags => FormValue::Tags(Vec::new()),
            ValueKind::Json => FormValue::Json(serde_json::Value::Null),
            ValueKind::Expression => FormValue::Expression(String::new()),
        }
    }

    /// Whether the value carries no user input. A toggle is never considered
    /// empty: `false` is a deliberate answer, not a missing one.
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Text(s) | FormValue::Expression(s) => s.trim().is_empty(),
            FormValue::Integer(n) => n.is_none(),
            FormValue::Float(n) => n.is_none(),
            FormValue::Bool(_) => false,
            FormValue::Tags(tags) => tags.is_empty(),
            FormValue::Json(v) => v.is_null(),
        }
    }

    /// Converts a loose JSON value (an existing record being edited) into the
    /// typed value a field of the given declared type expects. Anything that
    /// does not fit degrades to the kind's empty value rather than erroring;
    /// seeding is best-effort by design.
    pub fn from_json(declared: &DeclaredType, value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match declared {
            DeclaredType::Text | DeclaredType::LongText | DeclaredType::Enum => match value {
                Value::String(s) => FormValue::Text(s.clone()),
                Value::Null => FormValue::Text(String::new()),
                other => FormValue::Text(other.to_string()),
            },
            DeclaredType::Integer => match value {
                Value::Number(n) => FormValue::Integer(n.as_i64()),
                Value::String(s) => FormValue::Integer(s.trim().parse().ok()),
                _ => FormValue::Integer(None),
            },
            DeclaredType::Float => match value {
                Value::Number(n) => FormValue::Float(n.as_f64()),
                Value::String(s) => FormValue::Float(s.trim().parse().ok()),
                _ => FormValue::Float(None),
            },
            DeclaredType::Bool => match value {
                Value::Bool(b) => FormValue::Bool(*b),
                Value::String(s) => FormValue::Bool(s.trim().eq_ignore_ascii_case("true")),
                _ => FormValue::Bool(false),
            },
            DeclaredType::Tags => match value {
                Value::Array(items) => FormValue::Tags(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ),
                Value::String(s) if !s.trim().is_empty() => FormValue::Tags(vec![s.clone()]),
                _ => FormValue::Tags(Vec::new()),
            },
            DeclaredType::Json | DeclaredType::Relation(_) => match value {
                // A string seed is treated as editor text so the code editor
                // can re-open it as typed.
                Value::String(s) => FormValue::Text(s.clone()),
                other => FormValue::Json(other.clone()),
            },
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Text(s) | FormValue::Expression(s) => write!(f, "{}", s),
            FormValue::Integer(Some(n)) => write!(f, "{}", n),
            FormValue::Integer(None) | FormValue::Float(None) => Ok(()),
            FormValue::Float(Some(n)) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            FormValue::Bool(b) => write!(f, "{}", b),
            FormValue::Tags(tags) => write!(f, "{}", tags.join(", ")),
            FormValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Tags => "tags",
            ValueKind::Json => "json",
            ValueKind::Expression => "expression",
        };
        write!(f, "{}", name)
    }
}
