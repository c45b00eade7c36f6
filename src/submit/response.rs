//! Classifies backend rejection bodies and maps them onto form fields.

use super::SessionEvent;
use crate::form::FormContainer;
use serde::Deserialize;
use serde_json::Value;

/// A rejected submission, classified into the error shapes the backend is
/// known to produce. Shapes the classifier does not recognize are kept
/// verbatim in `Other` and surface as a generic notice.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRejection {
    /// A bare human-readable message, e.g. `{"detail": "..."}` or a plain
    /// string body.
    Detail(String),
    /// A machine-readable code plus reason, e.g.
    /// `{"code": "REGISTER_INVALID_PASSWORD", "reason": "too short"}`.
    Coded { code: String, reason: String },
    /// A field-level validation error array.
    Fields(Vec<FieldErrorEntry>),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldErrorEntry {
    pub field: String,
    pub message: String,
}

#[derive(Deserialize)]
struct DetailBody {
    detail: String,
}

#[derive(Deserialize)]
struct CodedBody {
    code: String,
    reason: String,
}

#[derive(Deserialize)]
struct FieldsBody {
    errors: Vec<FieldErrorEntry>,
}

impl BackendRejection {
    /// Classifies a raw JSON error body.
    pub fn from_json(body: Value) -> Self {
        if let Value::String(s) = &body {
            return BackendRejection::Detail(s.clone());
        }
        if let Ok(coded) = CodedBody::deserialize(&body) {
            return BackendRejection::Coded {
                code: coded.code,
                reason: coded.reason,
            };
        }
        if let Ok(fields) = FieldsBody::deserialize(&body) {
            return BackendRejection::Fields(fields.errors);
        }
        if let Ok(detail) = DetailBody::deserialize(&body) {
            return BackendRejection::Detail(detail.detail);
        }
        BackendRejection::Other(body)
    }

    /// Maps the rejection onto the form: field-attributable errors attach to
    /// the offending field in the container, everything else comes back as
    /// notice events. `keys` is the set of field keys present in the form
    /// plan; a rejection can never invent form state for a key the plan does
    /// not know.
    pub(crate) fn apply(self, keys: &[&str], container: &mut FormContainer) -> Vec<SessionEvent> {
        match self {
            BackendRejection::Detail(message) => vec![SessionEvent::error(message)],
            BackendRejection::Coded { code, reason } => match field_for_code(&code, keys) {
                Some(key) => {
                    let key = key.to_string();
                    container.attach_backend_issue(&key, reason);
                    Vec::new()
                }
                None => vec![SessionEvent::error(format!("{}: {}", code, reason))],
            },
            BackendRejection::Fields(entries) => {
                let mut events = Vec::new();
                for entry in entries {
                    if keys.contains(&entry.field.as_str()) {
                        container.attach_backend_issue(&entry.field, entry.message);
                    } else {
                        events.push(SessionEvent::warning(format!(
                            "{}: {}",
                            entry.field, entry.message
                        )));
                    }
                }
                events
            }
            BackendRejection::Other(body) => {
                tracing::warn!(%body, "unrecognized backend rejection shape");
                vec![SessionEvent::error("The submission was rejected")]
            }
        }
    }
}

/// Finds the form field a rejection code refers to by matching the code's
/// suffix against known field keys, case-insensitively and on an underscore
/// boundary. `REGISTER_INVALID_PASSWORD` matches the key `password`. When
/// several keys match, the longest wins.
pub(crate) fn field_for_code<'a>(code: &str, keys: &[&'a str]) -> Option<&'a str> {
    let code = code.to_ascii_lowercase();
    keys.iter()
        .filter(|key| {
            code.ends_with(*key)
                && (code.len() == key.len()
                    || code.as_bytes()[code.len() - key.len() - 1] == b'_')
        })
        .max_by_key(|key| key.len())
        .copied()
}
