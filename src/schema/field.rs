use crate::resolve::EditorChoice;
use std::fmt;

/// The canonical, normalized representation of one editable schema field.
/// Immutable for the lifetime of a form session.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Unique within a schema; insertion order is significant.
    pub key: String,
    pub declared: DeclaredType,
    /// Ordered; empty unless `declared` is `Enum`.
    pub enum_options: Vec<String>,
    pub nullable: bool,
    /// Present iff `declared` is `Relation(BelongsTo)`.
    pub relation: Option<RelationDescriptor>,
    /// Editor components the schema declared explicitly, in declared order.
    pub declared_components: Vec<EditorChoice>,
}

/// The type a schema declares for a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Text,
    LongText,
    Integer,
    Float,
    Bool,
    Enum,
    Tags,
    Json,
    Relation(RelationKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// An inline-nested sub-record referencing another entity's schema.
    BelongsTo,
    /// An inverse relation; cannot be edited inline and is filtered out
    /// during normalization.
    HasMany,
}

/// Reference to the schema of a relation's target entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub target_entity: String,
}

impl DeclaredType {
    /// Parses the wire names a backend schema may use for a field type.
    /// Unknown names return `None`; the normalizer degrades those fields to
    /// `Json` with a notice.
    pub fn parse(raw: &str) -> Option<Self> {
        let parsed = match raw.trim().to_ascii_uppercase().as_str() {
            "STRING" | "TEXT" => DeclaredType::Text,
            "LONG_TEXT" | "TEXTAREA" => DeclaredType::LongText,
            "INTEGER" | "INT" => DeclaredType::Integer,
            "FLOAT" | "NUMBER" | "DOUBLE" => DeclaredType::Float,
            "BOOLEAN" | "BOOL" => DeclaredType::Bool,
            "ENUM" | "SELECT" => DeclaredType::Enum,
            "STRING_ARRAY" | "TAGS" | "LIST" => DeclaredType::Tags,
            "JSON" | "OBJECT" => DeclaredType::Json,
            "RELATION_BELONGS_TO" => DeclaredType::Relation(RelationKind::BelongsTo),
            "RELATION_HAS_MANY" => DeclaredType::Relation(RelationKind::HasMany),
            _ => return None,
        };
        Some(parsed)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclaredType::Text => "text",
            DeclaredType::LongText => "long text",
            DeclaredType::Integer => "integer",
            DeclaredType::Float => "float",
            DeclaredType::Bool => "boolean",
            DeclaredType::Enum => "enum",
            DeclaredType::Tags => "tags",
            DeclaredType::Json => "json",
            DeclaredType::Relation(RelationKind::BelongsTo) => "relation (belongs-to)",
            DeclaredType::Relation(RelationKind::HasMany) => "relation (has-many)",
        };
        write!(f, "{}", name)
    }
}
