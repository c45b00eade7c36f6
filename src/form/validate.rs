use super::{FieldIssue, IssueSource};
use crate::expr;
use crate::resolve::{ComponentId, EditorChoice, EditorPlan};
use crate::schema::field::{DeclaredType, FieldDescriptor};
use crate::value::{FormValue, ValueKind};

/// Which structured format a text-buffered field must parse as before it can
/// be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCheck {
    None,
    Json,
    Yaml,
}

impl ParseCheck {
    /// Derives the parse check for a field from its declared type and its
    /// resolved editor plan. The first code/yaml editor in plan order wins.
    pub fn for_field(descriptor: &FieldDescriptor, plan: &EditorPlan) -> Self {
        for choice in &plan.choices {
            match choice.id() {
                ComponentId::Code => return ParseCheck::Json,
                ComponentId::Yaml => return ParseCheck::Yaml,
                _ => {}
            }
        }
        if descriptor.declared == DeclaredType::Json {
            ParseCheck::Json
        } else {
            ParseCheck::None
        }
    }
}

/// Schema-derived validation rules for one field.
#[derive(Debug, Clone)]
pub(crate) struct FieldRule {
    pub key: String,
    pub nullable: bool,
    /// The value kind an unset field is assumed to hold during validation.
    pub kind: ValueKind,
    pub options: Vec<String>,
    pub int_min: Option<i64>,
    pub int_max: Option<i64>,
    pub float_min: Option<f64>,
    pub float_max: Option<f64>,
    pub parse: ParseCheck,
}

impl FieldRule {
    fn derive(key: &str, descriptor: &FieldDescriptor, plan: &EditorPlan) -> Self {
        let mut options = descriptor.enum_options.clone();
        let mut int_min = None;
        let mut int_max = None;
        let mut float_min = None;
        let mut float_max = None;

        for choice in &plan.choices {
            match choice {
                EditorChoice::Select { options: declared }
                | EditorChoice::ActionType { options: declared } => {
                    if options.is_empty() {
                        options = declared.clone();
                    }
                }
                EditorChoice::Integer { min, max } => {
                    int_min = *min;
                    int_max = *max;
                }
                EditorChoice::Float { min, max, .. } => {
                    float_min = *min;
                    float_max = *max;
                }
                _ => {}
            }
        }

        let kind = plan
            .first_concrete()
            .map(|c| c.id().value_kind())
            .unwrap_or(ValueKind::Expression);

        Self {
            key: key.to_string(),
            nullable: descriptor.nullable,
            kind,
            options,
            int_min,
            int_max,
            float_min,
            float_max,
            parse: ParseCheck::for_field(descriptor, plan),
        }
    }
}

/// Validates form values against their schema-derived rules.
///
/// Validation produces per-field issues, never errors: a form with issues
/// stays interactive, submission is simply blocked until they are resolved.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    rules: Vec<FieldRule>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule for a field. `key` may differ from the descriptor's
    /// own key for fields nested inside a relation section.
    pub fn add_field(&mut self, key: &str, descriptor: &FieldDescriptor, plan: &EditorPlan) {
        self.rules.push(FieldRule::derive(key, descriptor, plan));
    }

    /// The rule keys, in field order.
    pub fn keys(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.key.as_str()).collect()
    }

    pub(crate) fn rule(&self, key: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    /// Checks a single value against its field's rules. Unknown keys yield
    /// no issues.
    pub fn check(&self, key: &str, value: &FormValue) -> Vec<FieldIssue> {
        let Some(rule) = self.rule(key) else {
            return Vec::new();
        };
        let mut issues = Vec::new();

        if !rule.nullable && value.is_empty() {
            issues.push(issue(key, "A value is required", IssueSource::Validation));
        }

        match value {
            FormValue::Text(s) if !s.trim().is_empty() => {
                if !rule.options.is_empty() && !rule.options.iter().any(|o| o == s) {
                    issues.push(issue(
                        key,
                        format!("'{}' is not one of the allowed options", s),
                        IssueSource::Validation,
                    ));
                }
                match rule.parse {
                    ParseCheck::Json => {
                        if let Err(e) = serde_json::from_str::<serde_json::Value>(s) {
                            issues.push(issue(
                                key,
                                format!("Invalid JSON: {}", e),
                                IssueSource::Parse,
                            ));
                        }
                    }
                    ParseCheck::Yaml => {
                        if let Err(e) = serde_yaml::from_str::<serde_json::Value>(s) {
                            issues.push(issue(
                                key,
                                format!("Invalid YAML: {}", e),
                                IssueSource::Parse,
                            ));
                        }
                    }
                    ParseCheck::None => {}
                }
            }
            FormValue::Integer(Some(n)) => {
                if rule.int_min.is_some_and(|min| *n < min)
                    || rule.int_max.is_some_and(|max| *n > max)
                {
                    issues.push(issue(
                        key,
                        format!("{} is outside the allowed range", n),
                        IssueSource::Validation,
                    ));
                }
            }
            FormValue::Float(Some(n)) => {
                if rule.float_min.is_some_and(|min| *n < min)
                    || rule.float_max.is_some_and(|max| *n > max)
                {
                    issues.push(issue(
                        key,
                        format!("{} is outside the allowed range", n),
                        IssueSource::Validation,
                    ));
                }
            }
            FormValue::Tags(tags) => {
                if tags.iter().any(|t| t.trim().is_empty()) {
                    issues.push(issue(key, "Tags must not be empty", IssueSource::Validation));
                }
            }
            FormValue::Expression(s) if !s.trim().is_empty() => {
                if let Err(e) = expr::scan(s) {
                    issues.push(issue(key, e.to_string(), IssueSource::Parse));
                }
            }
            _ => {}
        }

        issues
    }

    pub(crate) fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

fn issue(key: &str, message: impl Into<String>, source: IssueSource) -> FieldIssue {
    FieldIssue {
        key: key.to_string(),
        message: message.into(),
        source,
    }
}
