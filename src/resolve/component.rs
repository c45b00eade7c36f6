use crate::error::SchemaError;
use crate::schema::raw::RawComponent;
use crate::value::ValueKind;
use std::fmt;
use std::str::FromStr;

/// One renderable input widget type available for a field, with its
/// component-specific constraints.
///
/// A closed sum type: dispatch over editors is an exhaustive match, never a
/// string-keyed lookup, so there is no fallback-to-default branch to get
/// wrong at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorChoice {
    Text,
    TextArea,
    Select { options: Vec<String> },
    TagInput,
    Integer { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64>, step: Option<f64> },
    Toggle,
    Code { language: String },
    Yaml,
    ActionType { options: Vec<String> },
    WorkflowAlias,
    Expression,
}

/// The unit discriminant of an `EditorChoice`, used as the state of the
/// per-field editor switcher and as the component wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Text,
    TextArea,
    Select,
    TagInput,
    Integer,
    Float,
    Toggle,
    Code,
    Yaml,
    ActionType,
    WorkflowAlias,
    Expression,
}

impl EditorChoice {
    pub fn id(&self) -> ComponentId {
        match self {
            EditorChoice::Text => ComponentId::Text,
            EditorChoice::TextArea => ComponentId::TextArea,
            EditorChoice::Select { .. } => ComponentId::Select,
            EditorChoice::TagInput => ComponentId::TagInput,
            EditorChoice::Integer { .. } => ComponentId::Integer,
            EditorChoice::Float { .. } => ComponentId::Float,
            EditorChoice::Toggle => ComponentId::Toggle,
            EditorChoice::Code { .. } => ComponentId::Code,
            EditorChoice::Yaml => ComponentId::Yaml,
            EditorChoice::ActionType { .. } => ComponentId::ActionType,
            EditorChoice::WorkflowAlias => ComponentId::WorkflowAlias,
            EditorChoice::Expression => ComponentId::Expression,
        }
    }

    /// Builds a choice from a declared raw component entry, attaching the
    /// constraints the wire format carries for that component.
    pub fn from_raw(id: ComponentId, raw: &RawComponent) -> Self {
        match id {
            ComponentId::Text => EditorChoice::Text,
            ComponentId::TextArea => EditorChoice::TextArea,
            ComponentId::Select => EditorChoice::Select {
                options: raw.options.clone(),
            },
            ComponentId::TagInput => EditorChoice::TagInput,
            ComponentId::Integer => EditorChoice::Integer {
                min: raw.min.map(|v| v as i64),
                max: raw.max.map(|v| v as i64),
            },
            ComponentId::Float => EditorChoice::Float {
                min: raw.min,
                max: raw.max,
                step: raw.step,
            },
            ComponentId::Toggle => EditorChoice::Toggle,
            ComponentId::Code => EditorChoice::Code {
                language: raw.language.clone().unwrap_or_else(|| "json".to_string()),
            },
            ComponentId::Yaml => EditorChoice::Yaml,
            ComponentId::ActionType => EditorChoice::ActionType {
                options: raw.options.clone(),
            },
            ComponentId::WorkflowAlias => EditorChoice::WorkflowAlias,
            ComponentId::Expression => EditorChoice::Expression,
        }
    }
}

impl ComponentId {
    /// The kebab-case wire name of the component.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ComponentId::Text => "text",
            ComponentId::TextArea => "text-area",
            ComponentId::Select => "select",
            ComponentId::TagInput => "tag-input",
            ComponentId::Integer => "integer",
            ComponentId::Float => "float",
            ComponentId::Toggle => "toggle",
            ComponentId::Code => "code",
            ComponentId::Yaml => "yaml",
            ComponentId::ActionType => "action-type",
            ComponentId::WorkflowAlias => "workflow-alias",
            ComponentId::Expression => "expression",
        }
    }

    /// The value representation the editor reads and writes. Code and YAML
    /// editors buffer raw text; parsing happens at validation and payload
    /// time.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            ComponentId::Text
            | ComponentId::TextArea
            | ComponentId::Select
            | ComponentId::Code
            | ComponentId::Yaml
            | ComponentId::ActionType
            | ComponentId::WorkflowAlias => ValueKind::Text,
            ComponentId::TagInput => ValueKind::Tags,
            ComponentId::Integer => ValueKind::Integer,
            ComponentId::Float => ValueKind::Float,
            ComponentId::Toggle => ValueKind::Bool,
            ComponentId::Expression => ValueKind::Expression,
        }
    }
}

impl FromStr for ComponentId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s.trim() {
            "text" => ComponentId::Text,
            "text-area" => ComponentId::TextArea,
            "select" => ComponentId::Select,
            "tag-input" => ComponentId::TagInput,
            "integer" => ComponentId::Integer,
            "float" => ComponentId::Float,
            "toggle" => ComponentId::Toggle,
            "code" => ComponentId::Code,
            "yaml" => ComponentId::Yaml,
            "action-type" => ComponentId::ActionType,
            "workflow-alias" => ComponentId::WorkflowAlias,
            "expression" => ComponentId::Expression,
            other => return Err(SchemaError::UnknownComponent(other.to_string())),
        };
        Ok(id)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}
