//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kinyu crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! // Use the prelude to get easy access to all the core types.
//! use kinyu::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! // Load a schema and build a form session
//! let schema_json = std::fs::read_to_string("path/to/schema.json")?;
//! let raw = RawSchema::from_json(&schema_json)?;
//!
//! let mut session = SessionBuilder::new("ticket", raw).build();
//!
//! // Edit some fields, then produce the submission payload
//! session.apply_text("title", "Broken login page");
//! let request = session.begin_submit()?;
//!
//! println!("Payload: {:?}", request.payload);
//! # Ok(())
//! # }
//! ```

// Schema loading and normalization
pub use crate::schema::{
    normalize, normalize_with, DeclaredType, FieldDescriptor, IntoSchema, NormalizedSchema,
    NoticeKind, RawComponent, RawField, RawRelation, RawSchema, RelationKind, SchemaNotice,
};

// Editor resolution
pub use crate::resolve::{ComponentId, EditorChoice, EditorPlan, Resolver};

// The per-field editor host
pub use crate::host::{FieldHost, SwitchOutcome};

// Values and the form container
pub use crate::form::{FieldIssue, FormContainer, FormValidator, IssueSource};
pub use crate::value::{FormValue, ValueKind};

// Session assembly
pub use crate::session::{
    FieldPlan, FormPlan, FormSection, FormSession, ScalarPlan, SchemaSource, SessionBuilder,
};

// Submission pipeline
pub use crate::submit::{
    BackendRejection, SessionEvent, Severity, SubmitBackend, SubmitMode, SubmitReceipt,
    SubmitRequest,
};

// Error types
pub use crate::error::{FetchError, PayloadError, SchemaError, SubmitError, TemplateError};

// Collections commonly used with this crate
pub use ahash::AHashMap;

// Result type alias for convenience. The error parameter defaults to a
// boxed error so `Result<T>` works for application code while fully-typed
// signatures like `Result<RawSchema, SchemaError>` stay valid under a glob
// import.
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;
