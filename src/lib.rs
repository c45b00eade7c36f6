//! # Kinyu - Schema-Driven Form Engine
//!
//! **Kinyu** is a headless form compilation and editing engine. It turns a
//! runtime-supplied record or workflow-action schema into a typed editing
//! surface: resolved editor components per field, a per-field editor state
//! machine with a template-expression escape hatch, a validated value store,
//! and a deterministic submission payload.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic and sans-IO. It operates on a canonical
//! internal model of a field schema; rendering and network calls stay with
//! the caller. The primary workflow is:
//!
//! 1.  **Load Your Schema**: Parse your backend's schema format into your own Rust structs.
//! 2.  **Convert to Kinyu's Model**: Implement the `IntoSchema` trait (or use the built-in
//!     `RawSchema` wire shape) to provide a translation layer into Kinyu's schema model.
//! 3.  **Build a Session**: Use `SessionBuilder` to normalize the schema, resolve editor
//!     components per field and seed existing values. Relation target schemas are fetched
//!     through a `SchemaSource` you provide.
//! 4.  **Edit and Submit**: Drive the typed editing API from your UI event loop, then
//!     submit through a `SubmitBackend` and feed the response back into the session.
//!
//! ## Quick Start
//!
//! The following example demonstrates the end-to-end process.
//!
//! ```rust,no_run
//! use kinyu::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // 1. A schema as it arrives from the backend.
//!     let raw = RawSchema::from_json(
//!         r#"{
//!             "fields": [
//!                 {"key": "title", "type": "STRING"},
//!                 {"key": "count", "type": "INTEGER", "nullable": true},
//!                 {"key": "labels", "type": "STRING_ARRAY", "nullable": true}
//!             ]
//!         }"#,
//!     )?;
//!
//!     // 2. Build the form session. Every field resolves to its default
//!     //    editor plus the always-present expression escape hatch.
//!     let mut session = SessionBuilder::new("ticket", raw).build();
//!
//!     // 3. Edit through the typed API. Writes are synchronous and
//!     //    validated as they land.
//!     session.apply_text("title", "Broken login page");
//!     session.push_tag("labels", "bug");
//!     session.switch("count", ComponentId::Expression);
//!     session.apply_text("count", "{{ steps.scan.total }}");
//!
//!     // 4. Validate and produce the normalized payload, then hand it to
//!     //    your transport and feed the response back.
//!     let request = session.begin_submit()?;
//!     println!("{}", serde_json::to_string_pretty(&request.payload)?);
//!
//!     let events = session.complete_submit(Ok(SubmitReceipt { id: "rec_1".into() }));
//!     for event in events {
//!         println!("{:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod expr;
pub mod form;
pub mod host;
pub mod prelude;
pub mod resolve;
pub mod schema;
pub mod session;
pub mod submit;
pub mod value;
