//! Maps a normalized field descriptor to the ordered list of editor
//! components the user may switch between.

use crate::schema::field::{DeclaredType, FieldDescriptor};
use crate::schema::raw::RawComponent;
use ahash::AHashMap;
use std::str::FromStr;

pub mod component;

pub use component::{ComponentId, EditorChoice};

/// The ordered editor choices resolved for one field.
///
/// Never empty: the final entry is always `Expression`, so every field keeps
/// an escape hatch for templated values regardless of what the schema
/// declares.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorPlan {
    pub choices: Vec<EditorChoice>,
}

impl EditorPlan {
    /// True when the field has no concrete editor and only the expression
    /// escape hatch remains.
    pub fn is_expression_only(&self) -> bool {
        self.choices.len() == 1
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.choices.iter().any(|c| c.id() == id)
    }

    pub fn choice(&self, id: ComponentId) -> Option<&EditorChoice> {
        self.choices.iter().find(|c| c.id() == id)
    }

    /// The first non-expression choice, if any.
    pub fn first_concrete(&self) -> Option<&EditorChoice> {
        self.choices
            .iter()
            .find(|c| c.id() != ComponentId::Expression)
    }
}

/// Resolves editor component choices for fields.
///
/// The built-in inference covers every declared type; a builder allows
/// overriding the default editor per type and registering extra wire-name
/// aliases for declared components.
pub struct Resolver {
    overrides: AHashMap<DeclaredType, EditorChoice>,
    aliases: AHashMap<String, ComponentId>,
}

pub struct ResolverBuilder {
    overrides: AHashMap<DeclaredType, EditorChoice>,
    aliases: AHashMap<String, ComponentId>,
}

impl ResolverBuilder {
    /// Overrides the default editor inferred for a declared type.
    pub fn with_default(mut self, declared: DeclaredType, choice: EditorChoice) -> Self {
        self.overrides.insert(declared, choice);
        self
    }

    /// Registers an extra wire name accepted for a component when parsing
    /// declared component lists.
    pub fn with_component_alias(mut self, name: &str, id: ComponentId) -> Self {
        self.aliases.insert(name.to_string(), id);
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            overrides: self.overrides,
            aliases: self.aliases,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::builder().build()
    }
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder {
            overrides: AHashMap::new(),
            aliases: AHashMap::new(),
        }
    }

    /// Parses a declared raw component entry into a typed choice, consulting
    /// registered aliases first. Returns `None` for unknown component names.
    pub fn parse_component(&self, raw: &RawComponent) -> Option<EditorChoice> {
        let id = match self.aliases.get(raw.component.trim()) {
            Some(id) => *id,
            None => ComponentId::from_str(&raw.component).ok()?,
        };
        Some(EditorChoice::from_raw(id, raw))
    }

    /// Resolves the ordered editor choices for one field.
    ///
    /// Explicitly declared components are used verbatim in declared order;
    /// otherwise a single default is inferred from the declared type. In
    /// either case exactly one `Expression` choice is appended last.
    pub fn resolve(&self, descriptor: &FieldDescriptor) -> EditorPlan {
        let mut choices: Vec<EditorChoice> = if !descriptor.declared_components.is_empty() {
            descriptor.declared_components.clone()
        } else {
            self.infer_default(descriptor).into_iter().collect()
        };

        choices.retain(|c| c.id() != ComponentId::Expression);
        choices.push(EditorChoice::Expression);

        EditorPlan { choices }
    }

    fn infer_default(&self, descriptor: &FieldDescriptor) -> Option<EditorChoice> {
        if let Some(choice) = self.overrides.get(&descriptor.declared) {
            return Some(choice.clone());
        }
        let choice = match &descriptor.declared {
            DeclaredType::Text => EditorChoice::Text,
            DeclaredType::LongText => EditorChoice::TextArea,
            DeclaredType::Integer => EditorChoice::Integer {
                min: None,
                max: None,
            },
            DeclaredType::Float => EditorChoice::Float {
                min: None,
                max: None,
                step: None,
            },
            DeclaredType::Bool => EditorChoice::Toggle,
            DeclaredType::Enum => EditorChoice::Select {
                options: descriptor.enum_options.clone(),
            },
            DeclaredType::Tags => EditorChoice::TagInput,
            DeclaredType::Json => EditorChoice::Code {
                language: "json".to_string(),
            },
            // Relations are rendered as nested sections, not scalar editors.
            DeclaredType::Relation(_) => return None,
        };
        Some(choice)
    }
}
