//! Common test utilities for building schemas and stub collaborators.
use kinyu::prelude::*;
use std::cell::RefCell;

/// Creates a nullable raw field of the given wire type.
#[allow(dead_code)]
pub fn raw_field(key: &str, field_type: &str) -> RawField {
    RawField {
        key: key.to_string(),
        field_type: field_type.to_string(),
        enum_options: vec![],
        nullable: true,
        components: vec![],
    }
}

/// Creates a required (non-nullable) raw field.
#[allow(dead_code)]
pub fn required_field(key: &str, field_type: &str) -> RawField {
    RawField {
        nullable: false,
        ..raw_field(key, field_type)
    }
}

/// A raw component entry with no constraints.
#[allow(dead_code)]
pub fn raw_component(name: &str) -> RawComponent {
    RawComponent {
        component: name.to_string(),
        options: vec![],
        min: None,
        max: None,
        step: None,
        language: None,
    }
}

/// The main fixture schema: a workflow ticket with one field per declared
/// type and a belongs-to relation to a `user` entity.
#[allow(dead_code)]
pub fn ticket_schema() -> RawSchema {
    let mut level = raw_field("level", "ENUM");
    level.enum_options = vec!["low".to_string(), "high".to_string()];

    RawSchema {
        fields: vec![
            required_field("title", "STRING"),
            raw_field("count", "INTEGER"),
            level,
            raw_field("labels", "STRING_ARRAY"),
            raw_field("active", "BOOLEAN"),
            raw_field("config", "JSON"),
            raw_field("assignee", "RELATION_BELONGS_TO"),
        ],
        relations: vec![RawRelation {
            source_key: "assignee".to_string(),
            relation_type: "RELATION_BELONGS_TO".to_string(),
            target_entity_id: "user".to_string(),
        }],
    }
}

/// The relation target schema for `ticket_schema`'s `assignee` field.
#[allow(dead_code)]
pub fn user_schema() -> RawSchema {
    RawSchema {
        fields: vec![raw_field("name", "STRING"), raw_field("age", "INTEGER")],
        relations: vec![],
    }
}

/// Builds a descriptor directly, bypassing normalization.
#[allow(dead_code)]
pub fn descriptor(key: &str, declared: DeclaredType) -> FieldDescriptor {
    FieldDescriptor {
        key: key.to_string(),
        declared,
        enum_options: vec![],
        nullable: true,
        relation: None,
        declared_components: vec![],
    }
}

/// A schema source backed by an in-memory map. Unknown entities fail the
/// fetch, which is how relation-unavailable paths are exercised.
#[allow(dead_code)]
pub struct StubSource {
    schemas: AHashMap<String, RawSchema>,
}

#[allow(dead_code)]
impl StubSource {
    pub fn new() -> Self {
        Self {
            schemas: AHashMap::new(),
        }
    }

    pub fn with(mut self, entity: &str, schema: RawSchema) -> Self {
        self.schemas.insert(entity.to_string(), schema);
        self
    }
}

impl SchemaSource for StubSource {
    fn fetch(&self, entity_id: &str) -> Result<RawSchema, FetchError> {
        self.schemas
            .get(entity_id)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable {
                entity_id: entity_id.to_string(),
                message: "entity not found".to_string(),
            })
    }
}

/// A submit backend with a canned response that records every payload it
/// receives.
#[allow(dead_code)]
pub struct StubBackend {
    pub response: Result<SubmitReceipt, BackendRejection>,
    pub payloads: RefCell<Vec<serde_json::Map<String, serde_json::Value>>>,
}

#[allow(dead_code)]
impl StubBackend {
    pub fn accepting(id: &str) -> Self {
        Self {
            response: Ok(SubmitReceipt { id: id.to_string() }),
            payloads: RefCell::new(vec![]),
        }
    }

    pub fn rejecting(rejection: BackendRejection) -> Self {
        Self {
            response: Err(rejection),
            payloads: RefCell::new(vec![]),
        }
    }
}

impl SubmitBackend for StubBackend {
    fn create(
        &self,
        _entity: &str,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<SubmitReceipt, BackendRejection> {
        self.payloads.borrow_mut().push(payload.clone());
        self.response.clone()
    }

    fn update(
        &self,
        _entity: &str,
        _id: &str,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<SubmitReceipt, BackendRejection> {
        self.payloads.borrow_mut().push(payload.clone());
        self.response.clone()
    }
}
