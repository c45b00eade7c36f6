//! The keyed, validated value store backing one form session.

use crate::value::{FormValue, ValueKind};
use ahash::AHashMap;
use std::fmt;

pub mod payload;
pub mod validate;

pub use payload::{build_payload, scalar_value};
pub use validate::{FormValidator, ParseCheck};

/// Where a field issue originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSource {
    /// Schema-derived local validation.
    Validation,
    /// A structured editor whose text does not parse.
    Parse,
    /// A rejection the backend attributed to this field.
    Backend,
}

/// A per-field problem surfaced at render time. Issues are data, never
/// errors; the form stays interactive while they are present.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub key: String,
    pub message: String,
    pub source: IssueSource,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Maps field keys to their current values and validation issues.
///
/// `set_value` always succeeds locally and is last-write-wins per key;
/// validation issues are attached alongside, never thrown. Each form session
/// owns its container exclusively, nothing is shared between concurrently
/// open forms.
#[derive(Debug, Default)]
pub struct FormContainer {
    values: AHashMap<String, FormValue>,
    issues: AHashMap<String, Vec<FieldIssue>>,
    validator: FormValidator,
}

impl FormContainer {
    pub fn new(validator: FormValidator) -> Self {
        Self {
            values: AHashMap::new(),
            issues: AHashMap::new(),
            validator,
        }
    }

    /// Stores a value and re-runs that key's validation. Issues sourced from
    /// a previous backend rejection stay attached until the next submission
    /// attempt.
    pub fn set_value(&mut self, key: &str, value: FormValue) {
        let mut kept: Vec<FieldIssue> = self
            .issues
            .remove(key)
            .unwrap_or_default()
            .into_iter()
            .filter(|i| i.source == IssueSource::Backend)
            .collect();
        kept.extend(self.validator.check(key, &value));
        if !kept.is_empty() {
            self.issues.insert(key.to_string(), kept);
        }
        self.values.insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<&FormValue> {
        self.values.get(key)
    }

    /// A shallow per-key copy of the current values, taken at submission
    /// time.
    pub fn snapshot(&self) -> AHashMap<String, FormValue> {
        self.values.clone()
    }

    pub fn issues(&self, key: &str) -> &[FieldIssue] {
        self.issues.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All issues, in field order.
    pub fn all_issues(&self) -> Vec<FieldIssue> {
        let mut all = Vec::new();
        for key in self.validator.keys() {
            if let Some(issues) = self.issues.get(key) {
                all.extend(issues.iter().cloned());
            }
        }
        all
    }

    pub fn is_clean(&self) -> bool {
        self.issues.values().all(Vec::is_empty)
    }

    /// Re-validates every field, including unset ones, so required-field
    /// rules fire before submission.
    pub fn validate_all(&mut self) {
        let rules: Vec<(String, ValueKind)> = self
            .validator
            .rules()
            .iter()
            .map(|r| (r.key.clone(), r.kind))
            .collect();
        for (key, kind) in rules {
            let value = self
                .values
                .get(&key)
                .cloned()
                .unwrap_or_else(|| FormValue::empty_of(kind));
            let mut kept: Vec<FieldIssue> = self
                .issues
                .remove(&key)
                .unwrap_or_default()
                .into_iter()
                .filter(|i| i.source == IssueSource::Backend)
                .collect();
            kept.extend(self.validator.check(&key, &value));
            if !kept.is_empty() {
                self.issues.insert(key, kept);
            }
        }
    }

    /// Drops issues attached by a previous backend rejection. Called when a
    /// new submission attempt begins.
    pub fn clear_backend_issues(&mut self) {
        for issues in self.issues.values_mut() {
            issues.retain(|i| i.source != IssueSource::Backend);
        }
        self.issues.retain(|_, v| !v.is_empty());
    }

    /// Attaches a backend-sourced issue to a field.
    pub fn attach_backend_issue(&mut self, key: &str, message: impl Into<String>) {
        self.issues.entry(key.to_string()).or_default().push(FieldIssue {
            key: key.to_string(),
            message: message.into(),
            source: IssueSource::Backend,
        });
    }

    /// Clears all values and issues. The validator is kept; the container is
    /// ready for a fresh session over the same schema.
    pub fn reset(&mut self) {
        self.values.clear();
        self.issues.clear();
    }

    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }
}
