use super::raw::RawSchema;
use crate::error::SchemaError;

/// A trait for custom data models that can be converted into a Kinyu
/// `RawSchema`.
///
/// This is the extension point for making Kinyu format-agnostic. Backends
/// rarely agree on a schema wire shape; by implementing this trait on your
/// own structs you provide the translation layer that lets the normalizer
/// process your format.
///
/// # Example
///
/// ```rust,no_run
/// use kinyu::prelude::*;
/// use kinyu::error::SchemaError;
/// use kinyu::schema::{RawField, RawSchema};
///
/// // 1. Define structs matching your backend's schema format.
/// struct MyColumn { name: String, kind: String }
/// struct MyTable { columns: Vec<MyColumn> }
///
/// // 2. Implement `IntoSchema` for your top-level struct.
/// impl IntoSchema for MyTable {
///     fn into_schema(self) -> Result<RawSchema, SchemaError> {
///         let fields = self
///             .columns
///             .into_iter()
///             .map(|col| RawField {
///                 key: col.name,
///                 field_type: col.kind,
///                 enum_options: vec![],
///                 nullable: true,
///                 components: vec![],
///             })
///             .collect();
///
///         Ok(RawSchema { fields, relations: vec![] })
///     }
/// }
/// ```
pub trait IntoSchema {
    /// Consumes the object and converts it into a Kinyu-compatible raw schema.
    fn into_schema(self) -> Result<RawSchema, SchemaError>;
}

impl IntoSchema for RawSchema {
    fn into_schema(self) -> Result<RawSchema, SchemaError> {
        Ok(self)
    }
}
