use super::field::{DeclaredType, FieldDescriptor, RelationDescriptor, RelationKind};
use super::raw::{RawRelation, RawSchema};
use crate::resolve::Resolver;
use ahash::{AHashMap, AHashSet};

/// The result of normalizing a raw schema: the ordered editable fields plus
/// a record of everything that was dropped or softened along the way.
///
/// Normalization never fails. A schema with no usable fields yields an empty
/// field list and the caller falls back to a whole-payload structured editor.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSchema {
    pub fields: Vec<FieldDescriptor>,
    pub notices: Vec<SchemaNotice>,
}

/// A non-fatal diagnostic produced while normalizing a schema or assembling
/// a form plan.
#[derive(Debug, Clone)]
pub struct SchemaNotice {
    pub kind: NoticeKind,
    pub key: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    InvalidKey,
    DuplicateKey,
    UnknownType,
    UnknownComponent,
    InverseRelation,
    MissingRelationTarget,
    /// The relation target schema could not be fetched; the section is
    /// omitted from the form plan.
    RelationUnavailable,
    /// A relation nested inside another relation's target; sections stop at
    /// depth one.
    NestedRelation,
}

impl NormalizedSchema {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SchemaNotice {
    pub(crate) fn new(kind: NoticeKind, key: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Whether a key matches `^[a-z][a-z0-9_]*$`.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Normalizes a raw schema with the default resolver configuration.
pub fn normalize(raw: RawSchema) -> NormalizedSchema {
    normalize_with(raw, &Resolver::default())
}

/// Normalizes a raw schema into an ordered field descriptor list.
///
/// Relation entries are merged onto their source fields, inverse relations
/// are filtered out, keys are validated, duplicates are dropped (first
/// occurrence wins) and declared editor components are parsed through the
/// resolver's component registry. Every dropped or softened item appends a
/// `SchemaNotice`.
pub fn normalize_with(raw: RawSchema, resolver: &Resolver) -> NormalizedSchema {
    let mut rel_map: AHashMap<String, RawRelation> = AHashMap::new();
    for relation in raw.relations {
        rel_map.entry(relation.source_key.clone()).or_insert(relation);
    }

    let mut fields = Vec::new();
    let mut notices = Vec::new();
    let mut seen: AHashSet<String> = AHashSet::new();

    for field in raw.fields {
        if !is_valid_key(&field.key) {
            tracing::debug!(key = %field.key, "skipping field with invalid key");
            notices.push(SchemaNotice::new(
                NoticeKind::InvalidKey,
                Some(&field.key),
                format!("Field key '{}' is not a valid identifier", field.key),
            ));
            continue;
        }
        if !seen.insert(field.key.clone()) {
            tracing::debug!(key = %field.key, "skipping duplicate field key");
            notices.push(SchemaNotice::new(
                NoticeKind::DuplicateKey,
                Some(&field.key),
                format!("Field key '{}' appears more than once", field.key),
            ));
            continue;
        }

        let mut declared = match DeclaredType::parse(&field.field_type) {
            Some(declared) => declared,
            None => {
                notices.push(SchemaNotice::new(
                    NoticeKind::UnknownType,
                    Some(&field.key),
                    format!(
                        "Unknown type '{}' on field '{}', degrading to a structured editor",
                        field.field_type, field.key
                    ),
                ));
                DeclaredType::Json
            }
        };

        let mut relation = None;
        if let Some(entry) = rel_map.get(&field.key) {
            match DeclaredType::parse(&entry.relation_type) {
                Some(DeclaredType::Relation(kind)) => {
                    declared = DeclaredType::Relation(kind);
                    relation = Some(RelationDescriptor {
                        target_entity: entry.target_entity_id.clone(),
                    });
                }
                _ => {
                    notices.push(SchemaNotice::new(
                        NoticeKind::UnknownType,
                        Some(&field.key),
                        format!(
                            "Unknown relation type '{}' on field '{}', entry ignored",
                            entry.relation_type, field.key
                        ),
                    ));
                }
            }
        }

        match declared {
            DeclaredType::Relation(RelationKind::HasMany) => {
                tracing::debug!(key = %field.key, "filtering inverse relation field");
                notices.push(SchemaNotice::new(
                    NoticeKind::InverseRelation,
                    Some(&field.key),
                    format!("Field '{}' is a has-many relation and cannot be edited inline", field.key),
                ));
                continue;
            }
            DeclaredType::Relation(RelationKind::BelongsTo) if relation.is_none() => {
                notices.push(SchemaNotice::new(
                    NoticeKind::MissingRelationTarget,
                    Some(&field.key),
                    format!("Relation field '{}' names no target entity", field.key),
                ));
                continue;
            }
            _ => {}
        }

        let mut declared_components = Vec::new();
        for component in &field.components {
            match resolver.parse_component(component) {
                Some(choice) => declared_components.push(choice),
                None => {
                    notices.push(SchemaNotice::new(
                        NoticeKind::UnknownComponent,
                        Some(&field.key),
                        format!(
                            "Unknown editor component '{}' on field '{}'",
                            component.component, field.key
                        ),
                    ));
                }
            }
        }

        fields.push(FieldDescriptor {
            key: field.key,
            declared,
            enum_options: field.enum_options,
            nullable: field.nullable,
            relation,
            declared_components,
        });
    }

    NormalizedSchema { fields, notices }
}
