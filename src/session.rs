//! Assembles a form session from a schema and drives its lifecycle.
//!
//! A `FormSession` owns everything one dialog needs: the resolved field
//! plan, the per-field editor hosts, the validated value container, and the
//! submission gate. Sessions are independent; nothing is shared between
//! concurrently open forms.

use crate::error::{FetchError, SubmitError};
use crate::form::payload::scalar_value;
use crate::form::validate::ParseCheck;
use crate::form::{FieldIssue, FormContainer, FormValidator, IssueSource};
use crate::host::{FieldHost, SwitchOutcome};
use crate::resolve::{ComponentId, EditorPlan, Resolver};
use crate::schema::{
    normalize_with, DeclaredType, FieldDescriptor, NoticeKind, RawSchema, RelationKind,
    SchemaNotice,
};
use crate::submit::{
    BackendRejection, SessionEvent, SubmitBackend, SubmitMode, SubmitReceipt, SubmitRequest,
};
use crate::value::FormValue;
use ahash::AHashMap;
use itertools::Itertools;
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// The seam through which relation target schemas are fetched.
///
/// Implementations own the transport. A fetch failure is non-fatal: the
/// relation section is omitted from the plan and the rest of the form stays
/// editable.
pub trait SchemaSource {
    fn fetch(&self, entity_id: &str) -> Result<RawSchema, FetchError>;
}

/// One scalar field with its resolved editor choices.
#[derive(Debug, Clone)]
pub struct ScalarPlan {
    pub descriptor: FieldDescriptor,
    pub editors: EditorPlan,
}

/// An inline sub-record for a belongs-to relation. Contains scalar fields
/// only; relations nested deeper than one level are skipped with a notice.
#[derive(Debug, Clone)]
pub struct FormSection {
    pub entity: String,
    pub fields: Vec<ScalarPlan>,
}

#[derive(Debug, Clone)]
pub enum FieldPlan {
    Scalar(ScalarPlan),
    Relation {
        descriptor: FieldDescriptor,
        section: FormSection,
    },
}

/// The fully-resolved editing surface for one form session.
#[derive(Debug, Clone)]
pub struct FormPlan {
    pub fields: Vec<FieldPlan>,
    /// True when the schema yielded no usable fields; the caller renders a
    /// single whole-payload structured editor instead of a field list.
    pub fallback: bool,
}

impl FormPlan {
    /// Container keys of every scalar in the plan, in field order. Fields in
    /// a relation section use `relation_key.field_key`.
    pub fn scalar_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for field in &self.fields {
            match field {
                FieldPlan::Scalar(scalar) => keys.push(scalar.descriptor.key.clone()),
                FieldPlan::Relation { descriptor, section } => {
                    for sub in &section.fields {
                        keys.push(format!("{}.{}", descriptor.key, sub.descriptor.key));
                    }
                }
            }
        }
        keys
    }

    /// A human-readable tree of the plan, used by the inspection CLI and the
    /// debug dumps.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if self.fallback {
            out.push_str("(fallback: whole-payload structured editor)\n");
            return out;
        }
        for field in &self.fields {
            match field {
                FieldPlan::Scalar(scalar) => {
                    let _ = writeln!(out, "{}", describe_scalar(scalar, ""));
                }
                FieldPlan::Relation { descriptor, section } => {
                    let _ = writeln!(
                        out,
                        "{}: relation -> {}",
                        descriptor.key, section.entity
                    );
                    for sub in &section.fields {
                        let _ = writeln!(out, "{}", describe_scalar(sub, "  "));
                    }
                }
            }
        }
        out
    }
}

fn describe_scalar(scalar: &ScalarPlan, indent: &str) -> String {
    let editors = scalar
        .editors
        .choices
        .iter()
        .map(|c| c.id().wire_name())
        .join(", ");
    format!(
        "{}{}: {} [{}]{}",
        indent,
        scalar.descriptor.key,
        scalar.descriptor.declared,
        editors,
        if scalar.descriptor.nullable { "" } else { " (required)" },
    )
}

/// Builds a `FormSession` from an entity name and a raw schema.
pub struct SessionBuilder<'a> {
    entity: String,
    raw: RawSchema,
    resolver: Resolver,
    source: Option<&'a dyn SchemaSource>,
    mode: SubmitMode,
    seed: Option<Value>,
}

impl<'a> SessionBuilder<'a> {
    pub fn new(entity: &str, raw: RawSchema) -> Self {
        Self {
            entity: entity.to_string(),
            raw,
            resolver: Resolver::default(),
            source: None,
            mode: SubmitMode::Create,
            seed: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Wires the source relation target schemas are fetched through. Without
    /// one, every relation section is omitted with a notice.
    pub fn with_source(mut self, source: &'a dyn SchemaSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_mode(mut self, mode: SubmitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Seeds the form with an existing record's values. The seed decides
    /// each field's initial active editor: a value that looks like a
    /// template opens in the expression editor.
    pub fn with_values(mut self, values: Value) -> Self {
        self.seed = Some(values);
        self
    }

    pub fn build(self) -> FormSession {
        let normalized = normalize_with(self.raw, &self.resolver);
        let mut notices = normalized.notices;

        let mut fields = Vec::new();
        for descriptor in normalized.fields {
            if descriptor.declared == DeclaredType::Relation(RelationKind::BelongsTo) {
                // Invariant from the normalizer: a belongs-to descriptor
                // always carries its relation target.
                let target = descriptor
                    .relation
                    .as_ref()
                    .map(|r| r.target_entity.clone())
                    .unwrap_or_default();
                if let Some(section) =
                    fetch_section(self.source, &self.resolver, &descriptor.key, &target, &mut notices)
                {
                    fields.push(FieldPlan::Relation { descriptor, section });
                }
            } else {
                let editors = self.resolver.resolve(&descriptor);
                fields.push(FieldPlan::Scalar(ScalarPlan { descriptor, editors }));
            }
        }

        let fallback = fields.is_empty();
        let plan = FormPlan { fields, fallback };

        let mut validator = FormValidator::new();
        for field in &plan.fields {
            match field {
                FieldPlan::Scalar(scalar) => {
                    validator.add_field(&scalar.descriptor.key, &scalar.descriptor, &scalar.editors);
                }
                FieldPlan::Relation { descriptor, section } => {
                    for sub in &section.fields {
                        let key = format!("{}.{}", descriptor.key, sub.descriptor.key);
                        validator.add_field(&key, &sub.descriptor, &sub.editors);
                    }
                }
            }
        }

        let mut container = FormContainer::new(validator);
        let mut fallback_text = String::new();
        if let Some(Value::Object(seed)) = &self.seed {
            if plan.fallback {
                // No fields to seed; the existing record opens in the
                // whole-payload editor instead of being dropped.
                fallback_text = serde_json::to_string_pretty(seed).unwrap_or_default();
            } else {
                seed_values(&plan, seed, &mut container);
            }
        }

        let mut hosts = AHashMap::new();
        for field in &plan.fields {
            match field {
                FieldPlan::Scalar(scalar) => {
                    let key = scalar.descriptor.key.clone();
                    let host = FieldHost::new(&key, scalar.editors.clone(), container.value(&key));
                    hosts.insert(key, host);
                }
                FieldPlan::Relation { descriptor, section } => {
                    for sub in &section.fields {
                        let key = format!("{}.{}", descriptor.key, sub.descriptor.key);
                        let host = FieldHost::new(&key, sub.editors.clone(), container.value(&key));
                        hosts.insert(key, host);
                    }
                }
            }
        }

        let session = FormSession {
            entity: self.entity,
            mode: self.mode,
            plan,
            notices,
            container,
            hosts,
            fallback_text,
            fallback_issue: None,
            pending: false,
        };

        #[cfg(feature = "debug-tools")]
        session.write_debug_file("plan", &session.plan.describe());

        session
    }
}

fn fetch_section(
    source: Option<&dyn SchemaSource>,
    resolver: &Resolver,
    field_key: &str,
    target_entity: &str,
    notices: &mut Vec<SchemaNotice>,
) -> Option<FormSection> {
    let fetched = match source {
        Some(source) => source.fetch(target_entity),
        None => Err(FetchError::NoSource {
            entity_id: target_entity.to_string(),
        }),
    };

    let raw = match fetched {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(key = %field_key, target = %target_entity,
                "omitting relation section: {}", e);
            notices.push(SchemaNotice::new(
                NoticeKind::RelationUnavailable,
                Some(field_key),
                format!("Relation '{}' is unavailable: {}", field_key, e),
            ));
            return None;
        }
    };

    let nested = normalize_with(raw, resolver);
    notices.extend(nested.notices);

    let mut section_fields = Vec::new();
    for descriptor in nested.fields {
        if matches!(descriptor.declared, DeclaredType::Relation(_)) {
            notices.push(SchemaNotice::new(
                NoticeKind::NestedRelation,
                Some(&descriptor.key),
                format!(
                    "Relation '{}' inside section '{}' is skipped; sections stop at depth one",
                    descriptor.key, field_key
                ),
            ));
            continue;
        }
        let editors = resolver.resolve(&descriptor);
        section_fields.push(ScalarPlan { descriptor, editors });
    }

    if section_fields.is_empty() {
        notices.push(SchemaNotice::new(
            NoticeKind::RelationUnavailable,
            Some(field_key),
            format!("Relation '{}' has no editable fields", field_key),
        ));
        return None;
    }

    Some(FormSection {
        entity: target_entity.to_string(),
        fields: section_fields,
    })
}

fn seed_values(plan: &FormPlan, seed: &Map<String, Value>, container: &mut FormContainer) {
    for field in &plan.fields {
        match field {
            FieldPlan::Scalar(scalar) => {
                if let Some(value) = seed.get(&scalar.descriptor.key) {
                    container.set_value(
                        &scalar.descriptor.key,
                        FormValue::from_json(&scalar.descriptor.declared, value),
                    );
                }
            }
            FieldPlan::Relation { descriptor, section } => {
                let Some(Value::Object(nested)) = seed.get(&descriptor.key) else {
                    continue;
                };
                for sub in &section.fields {
                    if let Some(value) = nested.get(&sub.descriptor.key) {
                        let key = format!("{}.{}", descriptor.key, sub.descriptor.key);
                        container.set_value(&key, FormValue::from_json(&sub.descriptor.declared, value));
                    }
                }
            }
        }
    }
}

/// One live form session: the editing surface plus the submission gate.
pub struct FormSession {
    entity: String,
    mode: SubmitMode,
    plan: FormPlan,
    notices: Vec<SchemaNotice>,
    container: FormContainer,
    hosts: AHashMap<String, FieldHost>,
    fallback_text: String,
    fallback_issue: Option<String>,
    pending: bool,
}

impl FormSession {
    pub fn builder(entity: &str, raw: RawSchema) -> SessionBuilder<'static> {
        SessionBuilder::new(entity, raw)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn mode(&self) -> &SubmitMode {
        &self.mode
    }

    pub fn plan(&self) -> &FormPlan {
        &self.plan
    }

    /// Diagnostics collected while normalizing the schema and assembling the
    /// plan. Non-blocking; intended for inline display.
    pub fn notices(&self) -> &[SchemaNotice] {
        &self.notices
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True when the schema had no usable fields and the form degrades to a
    /// single structured editor over the whole payload.
    pub fn is_fallback(&self) -> bool {
        self.plan.fallback
    }

    pub fn value(&self, key: &str) -> Option<&FormValue> {
        self.container.value(key)
    }

    pub fn issues(&self, key: &str) -> &[FieldIssue] {
        self.container.issues(key)
    }

    pub fn all_issues(&self) -> Vec<FieldIssue> {
        self.container.all_issues()
    }

    pub fn snapshot(&self) -> AHashMap<String, FormValue> {
        self.container.snapshot()
    }

    /// The active editor component for a field, if the key is known.
    pub fn active(&self, key: &str) -> Option<ComponentId> {
        self.hosts.get(key).map(FieldHost::active)
    }

    /// Switches a field's active editor. Unknown keys are rejected.
    pub fn switch(&mut self, key: &str, target: ComponentId) -> SwitchOutcome {
        match self.hosts.get_mut(key) {
            Some(host) => host.switch(target, &mut self.container),
            None => SwitchOutcome::Rejected,
        }
    }

    /// Applies raw text input to a field through its active editor. Unknown
    /// keys are ignored.
    pub fn apply_text(&mut self, key: &str, raw: &str) {
        if let Some(host) = self.hosts.get(key) {
            host.apply_text(&mut self.container, raw);
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        if let Some(host) = self.hosts.get(key) {
            host.set_bool(&mut self.container, value);
        }
    }

    pub fn set_tags(&mut self, key: &str, tags: Vec<String>) {
        if let Some(host) = self.hosts.get(key) {
            host.set_tags(&mut self.container, tags);
        }
    }

    pub fn push_tag(&mut self, key: &str, tag: &str) {
        if let Some(host) = self.hosts.get(key) {
            host.push_tag(&mut self.container, tag);
        }
    }

    pub fn remove_tag(&mut self, key: &str, tag: &str) {
        if let Some(host) = self.hosts.get(key) {
            host.remove_tag(&mut self.container, tag);
        }
    }

    pub fn set_json(&mut self, key: &str, value: Value) {
        if let Some(host) = self.hosts.get(key) {
            host.set_json(&mut self.container, value);
        }
    }

    /// The raw text of the fallback structured editor.
    pub fn fallback_json(&self) -> &str {
        &self.fallback_text
    }

    /// Replaces the fallback editor's text, checking it parses as JSON. The
    /// parse problem, if any, is surfaced through `fallback_issue`.
    pub fn set_fallback_json(&mut self, text: &str) {
        self.fallback_issue = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(text)
                .err()
                .map(|e| format!("Invalid JSON: {}", e))
        };
        self.fallback_text = text.to_string();
    }

    pub fn fallback_issue(&self) -> Option<&str> {
        self.fallback_issue.as_deref()
    }

    /// Validates the form and produces the normalized submission request.
    ///
    /// At most one submission can be in flight per session; a second call
    /// before `complete_submit` returns `AlreadyPending`. A validation
    /// failure leaves the form interactive with issues attached.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitError> {
        if self.pending {
            return Err(SubmitError::AlreadyPending);
        }
        self.container.clear_backend_issues();

        let payload = if self.plan.fallback {
            self.fallback_payload()?
        } else {
            self.container.validate_all();
            if !self.container.is_clean() {
                return Err(SubmitError::ValidationFailed {
                    issues: self.container.all_issues(),
                });
            }
            self.build_payload()?
        };

        #[cfg(feature = "debug-tools")]
        self.write_debug_file(
            "payload",
            &serde_json::to_string_pretty(&payload).unwrap_or_default(),
        );

        self.pending = true;
        Ok(SubmitRequest {
            entity: self.entity.clone(),
            mode: self.mode.clone(),
            payload,
        })
    }

    /// Feeds the backend's response back into the session.
    ///
    /// On success the container and hosts reset and the caller is asked to
    /// close the dialog. On rejection the dialog stays open and the error is
    /// mapped onto the offending fields where possible. No retry happens
    /// here; the user resubmits explicitly.
    pub fn complete_submit(
        &mut self,
        result: Result<SubmitReceipt, BackendRejection>,
    ) -> Vec<SessionEvent> {
        self.pending = false;
        match result {
            Ok(receipt) => {
                self.container.reset();
                self.reset_hosts();
                self.fallback_text.clear();
                self.fallback_issue = None;
                vec![
                    SessionEvent::Submitted { id: receipt.id },
                    SessionEvent::CloseRequested,
                ]
            }
            Err(rejection) => {
                let keys = self.plan.scalar_keys();
                let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
                rejection.apply(&key_refs, &mut self.container)
            }
        }
    }

    /// Drives a full submission round through a backend in one call.
    pub fn submit_with(
        &mut self,
        backend: &dyn SubmitBackend,
    ) -> Result<Vec<SessionEvent>, SubmitError> {
        let request = self.begin_submit()?;
        let result = match &request.mode {
            SubmitMode::Create => backend.create(&request.entity, &request.payload),
            SubmitMode::Update { id } => backend.update(&request.entity, id, &request.payload),
        };
        Ok(self.complete_submit(result))
    }

    fn build_payload(&self) -> Result<Map<String, Value>, SubmitError> {
        let values = self.container.snapshot();
        let mut payload = Map::new();
        for field in &self.plan.fields {
            match field {
                FieldPlan::Scalar(scalar) => {
                    let check = ParseCheck::for_field(&scalar.descriptor, &scalar.editors);
                    let value = scalar_value(
                        &scalar.descriptor.key,
                        &scalar.descriptor,
                        check,
                        values.get(&scalar.descriptor.key),
                    )?;
                    payload.insert(scalar.descriptor.key.clone(), value);
                }
                FieldPlan::Relation { descriptor, section } => {
                    let mut nested = Map::new();
                    for sub in &section.fields {
                        let key = format!("{}.{}", descriptor.key, sub.descriptor.key);
                        let check = ParseCheck::for_field(&sub.descriptor, &sub.editors);
                        let value =
                            scalar_value(&key, &sub.descriptor, check, values.get(&key))?;
                        nested.insert(sub.descriptor.key.clone(), value);
                    }
                    payload.insert(descriptor.key.clone(), Value::Object(nested));
                }
            }
        }
        Ok(payload)
    }

    fn fallback_payload(&self) -> Result<Map<String, Value>, SubmitError> {
        if self.fallback_text.trim().is_empty() {
            return Ok(Map::new());
        }
        let parsed: Value = serde_json::from_str(&self.fallback_text).map_err(|e| {
            SubmitError::ValidationFailed {
                issues: vec![FieldIssue {
                    key: String::new(),
                    message: format!("Invalid JSON: {}", e),
                    source: IssueSource::Parse,
                }],
            }
        })?;
        match parsed {
            Value::Object(map) => Ok(map),
            _ => Err(SubmitError::ValidationFailed {
                issues: vec![FieldIssue {
                    key: String::new(),
                    message: "The payload must be a JSON object".to_string(),
                    source: IssueSource::Parse,
                }],
            }),
        }
    }

    fn reset_hosts(&mut self) {
        for field in &self.plan.fields {
            match field {
                FieldPlan::Scalar(scalar) => {
                    let key = scalar.descriptor.key.clone();
                    self.hosts
                        .insert(key.clone(), FieldHost::new(&key, scalar.editors.clone(), None));
                }
                FieldPlan::Relation { descriptor, section } => {
                    for sub in &section.fields {
                        let key = format!("{}.{}", descriptor.key, sub.descriptor.key);
                        self.hosts
                            .insert(key.clone(), FieldHost::new(&key, sub.editors.clone(), None));
                    }
                }
            }
        }
    }

    #[cfg(feature = "debug-tools")]
    fn write_debug_file(&self, suffix: &str, content: &str) {
        let sanitized: String = self
            .entity
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        let path = format!("tmp/form_{}_{}.txt", sanitized, suffix);
        if let Some(parent) = std::path::Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&path, content) {
            tracing::debug!("could not write debug file '{}': {}", path, e);
        }
    }
}
