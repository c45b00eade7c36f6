use crate::form::FieldIssue;
use thiserror::Error;

/// Errors that can occur while parsing or converting a raw schema.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("Failed to parse schema JSON: {0}")]
    JsonParse(String),

    #[error("Unknown editor component '{0}'")]
    UnknownComponent(String),

    #[error("Invalid custom schema data: {0}")]
    Conversion(String),
}

/// Errors reported by a `SchemaSource` when a relation target schema
/// cannot be fetched.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Schema for entity '{entity_id}' is unavailable: {message}")]
    Unavailable { entity_id: String, message: String },

    #[error("No schema source is configured, cannot fetch entity '{entity_id}'")]
    NoSource { entity_id: String },
}

/// Errors found while scanning a template expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template opener '{{{{' at byte {at} is never closed")]
    Unclosed { at: usize },

    #[error("Template closer '}}}}' at byte {at} has no matching opener")]
    StrayClose { at: usize },
}

/// Errors that can occur while normalizing form values into a wire payload.
#[derive(Error, Debug, Clone)]
pub enum PayloadError {
    #[error("Field '{key}' does not contain valid JSON: {message}")]
    InvalidJson { key: String, message: String },

    #[error("Field '{key}' does not contain valid YAML: {message}")]
    InvalidYaml { key: String, message: String },

    #[error("Field '{key}' holds a non-finite number that cannot be serialized")]
    NonFiniteNumber { key: String },
}

/// Errors produced by the submission gate.
#[derive(Error, Debug, Clone)]
pub enum SubmitError {
    #[error("A submission is already pending for this form")]
    AlreadyPending,

    #[error("Validation failed with {} issue(s)", issues.len())]
    ValidationFailed { issues: Vec<FieldIssue> },

    #[error(transparent)]
    Payload(#[from] PayloadError),
}
