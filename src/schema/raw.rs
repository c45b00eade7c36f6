use crate::error::SchemaError;
use serde::Deserialize;

/// The schema shape as fetched from the backend, before normalization.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawSchema {
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub relations: Vec<RawRelation>,
}

/// One field entry of a raw schema.
#[derive(Debug, Deserialize, Clone)]
pub struct RawField {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    #[serde(alias = "enumOptions")]
    pub enum_options: Vec<String>,
    #[serde(default)]
    #[serde(alias = "isNullable")]
    pub nullable: bool,
    /// Editor components explicitly declared for this field. Usually empty;
    /// the resolver infers a default from the declared type.
    #[serde(default)]
    pub components: Vec<RawComponent>,
}

/// An explicitly declared editor component with its constraints.
#[derive(Debug, Deserialize, Clone)]
pub struct RawComponent {
    pub component: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub language: Option<String>,
}

/// A relation entry linking a source field to another entity's schema.
#[derive(Debug, Deserialize, Clone)]
pub struct RawRelation {
    #[serde(alias = "sourceKey")]
    pub source_key: String,
    #[serde(alias = "relationType")]
    pub relation_type: String,
    #[serde(alias = "targetEntityId")]
    pub target_entity_id: String,
}

impl RawSchema {
    /// Parses a raw schema from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::JsonParse(e.to_string()))
    }
}
