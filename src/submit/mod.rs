//! The submission side of a form session: the request/receipt shapes, the
//! backend seam, and the event channel results are reported through.
//!
//! The engine performs no network I/O itself. A caller either drives
//! `begin_submit` / `complete_submit` around its own transport, or hands a
//! `SubmitBackend` implementation to `FormSession::submit_with`.

use serde_json::{Map, Value};
use std::fmt;

pub mod response;

pub use response::{BackendRejection, FieldErrorEntry};

/// Whether a submission creates a new record or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update { id: String },
}

/// The fully-normalized payload handed to the backend, produced by a
/// successful `begin_submit`.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub entity: String,
    pub mode: SubmitMode,
    pub payload: Map<String, Value>,
}

/// The backend's acknowledgement of a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub id: String,
}

/// The seam to the remote create/update calls. Implementations own the
/// transport; the engine only sees the typed outcome.
pub trait SubmitBackend {
    fn create(
        &self,
        entity: &str,
        payload: &Map<String, Value>,
    ) -> Result<SubmitReceipt, BackendRejection>;

    fn update(
        &self,
        entity: &str,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<SubmitReceipt, BackendRejection>;
}

/// Severity of a notice event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Events the submission pipeline reports back to the caller.
///
/// This is an explicit result channel: the caller decides how to present
/// each event, the engine never talks to an ambient notification surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The backend accepted the submission.
    Submitted { id: String },
    /// The host dialog should close. Emitted after a successful submission,
    /// never after a failure: a failed form stays open for correction.
    CloseRequested,
    /// A message that is not attributable to a single field.
    Notice { severity: Severity, message: String },
}

impl SessionEvent {
    pub(crate) fn error(message: impl Into<String>) -> Self {
        SessionEvent::Notice {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub(crate) fn warning(message: impl Into<String>) -> Self {
        SessionEvent::Notice {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", name)
    }
}
