//! The per-field editor state machine.
//!
//! A `FieldHost` tracks which of a field's resolved editor components is
//! active and applies raw user input through that component's coercion
//! rules, writing through to the form container synchronously on every
//! change. Switching the active component preserves the value when its
//! representation survives the switch and clears it otherwise.

use crate::expr;
use crate::form::FormContainer;
use crate::resolve::{ComponentId, EditorPlan};
use crate::value::{FormValue, ValueKind};

/// What happened to the field's value when the active editor was switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Target equals the active editor; nothing changed.
    Unchanged,
    /// The value's representation survived the switch.
    Preserved,
    /// An integer was losslessly widened to a float.
    Widened,
    /// The value was reset to the new kind's empty value. Leaving the
    /// expression editor with a template still in place always clears;
    /// this data loss is deliberate, a template has no concrete-typed
    /// equivalent.
    Cleared,
    /// The target component is not part of this field's plan; no state
    /// changed.
    Rejected,
}

/// Hosts one field's switchable editor. Transient per-session state: it is
/// never persisted and is rebuilt when the session resets.
#[derive(Debug)]
pub struct FieldHost {
    key: String,
    plan: EditorPlan,
    active: ComponentId,
}

impl FieldHost {
    /// Creates a host and picks the initial active editor: `expression` if
    /// the seeded value looks like a template, otherwise the first concrete
    /// choice in the plan.
    pub fn new(key: &str, plan: EditorPlan, initial: Option<&FormValue>) -> Self {
        let active = Self::initial_component(&plan, initial);
        Self {
            key: key.to_string(),
            plan,
            active,
        }
    }

    fn initial_component(plan: &EditorPlan, initial: Option<&FormValue>) -> ComponentId {
        if let Some(value) = initial {
            if is_expression_shaped(value) {
                return ComponentId::Expression;
            }
            // A seeded value picks the first editor that reads its
            // representation, so an integer seed lands on the integer
            // editor even when text comes first in the plan.
            if let Some(choice) = plan
                .choices
                .iter()
                .find(|c| c.id() != ComponentId::Expression && c.id().value_kind() == value.kind())
            {
                return choice.id();
            }
        }
        plan.first_concrete()
            .map(|c| c.id())
            .unwrap_or(ComponentId::Expression)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn active(&self) -> ComponentId {
        self.active
    }

    pub fn plan(&self) -> &EditorPlan {
        &self.plan
    }

    /// Switches the active editor component.
    ///
    /// The current value survives the switch as long as its underlying
    /// representation is still compatible with the new component; otherwise
    /// it is cleared to the new kind's empty value. The field remains
    /// switchable for the lifetime of the form.
    pub fn switch(&mut self, target: ComponentId, container: &mut FormContainer) -> SwitchOutcome {
        if !self.plan.contains(target) {
            return SwitchOutcome::Rejected;
        }
        if target == self.active {
            return SwitchOutcome::Unchanged;
        }

        let leaving = self.active;
        self.active = target;

        let new_kind = target.value_kind();
        let current = container.value(&self.key).cloned();

        let Some(current) = current else {
            container.set_value(&self.key, FormValue::empty_of(new_kind));
            return SwitchOutcome::Preserved;
        };

        if leaving == ComponentId::Expression && is_expression_shaped(&current) {
            tracing::debug!(key = %self.key, from = %leaving, to = %target,
                "clearing templated value on editor switch");
            container.set_value(&self.key, FormValue::empty_of(new_kind));
            return SwitchOutcome::Cleared;
        }

        // An empty value has nothing to lose; re-type it silently.
        if current.is_empty() {
            container.set_value(&self.key, FormValue::empty_of(new_kind));
            return SwitchOutcome::Preserved;
        }

        match (current, new_kind) {
            (current, kind) if current.kind() == kind => SwitchOutcome::Preserved,
            // String-backed representations survive in both directions.
            (FormValue::Expression(s), ValueKind::Text) => {
                container.set_value(&self.key, FormValue::Text(s));
                SwitchOutcome::Preserved
            }
            (FormValue::Text(s), ValueKind::Expression) => {
                container.set_value(&self.key, FormValue::Expression(s));
                SwitchOutcome::Preserved
            }
            (FormValue::Integer(n), ValueKind::Float) => {
                container.set_value(&self.key, FormValue::Float(n.map(|n| n as f64)));
                SwitchOutcome::Widened
            }
            _ => {
                tracing::debug!(key = %self.key, to = %target,
                    "clearing value on incompatible editor switch");
                container.set_value(&self.key, FormValue::empty_of(new_kind));
                SwitchOutcome::Cleared
            }
        }
    }

    /// Applies raw text input through the active editor's coercion rules.
    /// An integer editor turns unparseable input into an empty value, never
    /// NaN; a tag editor splits on commas.
    pub fn apply_text(&self, container: &mut FormContainer, raw: &str) {
        let value = match self.active.value_kind() {
            ValueKind::Text => FormValue::Text(raw.to_string()),
            ValueKind::Expression => FormValue::Expression(raw.to_string()),
            ValueKind::Integer => FormValue::Integer(raw.trim().parse().ok()),
            ValueKind::Float => FormValue::Float(raw.trim().parse().ok()),
            ValueKind::Bool => FormValue::Bool(raw.trim().eq_ignore_ascii_case("true")),
            ValueKind::Tags => FormValue::Tags(
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            ValueKind::Json => FormValue::Text(raw.to_string()),
        };
        container.set_value(&self.key, value);
    }

    /// Sets a toggle value. Ignored unless the active editor is a toggle.
    pub fn set_bool(&self, container: &mut FormContainer, value: bool) {
        if self.active.value_kind() == ValueKind::Bool {
            container.set_value(&self.key, FormValue::Bool(value));
        }
    }

    /// Replaces the tag list. Ignored unless the active editor is a tag
    /// input.
    pub fn set_tags(&self, container: &mut FormContainer, tags: Vec<String>) {
        if self.active.value_kind() == ValueKind::Tags {
            container.set_value(&self.key, FormValue::Tags(tags));
        }
    }

    /// Appends a tag; empty entries are dropped.
    pub fn push_tag(&self, container: &mut FormContainer, tag: &str) {
        if self.active.value_kind() != ValueKind::Tags {
            return;
        }
        let tag = tag.trim();
        if tag.is_empty() {
            return;
        }
        let mut tags = match container.value(&self.key) {
            Some(FormValue::Tags(tags)) => tags.clone(),
            _ => Vec::new(),
        };
        tags.push(tag.to_string());
        container.set_value(&self.key, FormValue::Tags(tags));
    }

    /// Removes every occurrence of a tag.
    pub fn remove_tag(&self, container: &mut FormContainer, tag: &str) {
        if self.active.value_kind() != ValueKind::Tags {
            return;
        }
        if let Some(FormValue::Tags(tags)) = container.value(&self.key) {
            let remaining: Vec<String> = tags.iter().filter(|t| *t != tag).cloned().collect();
            container.set_value(&self.key, FormValue::Tags(remaining));
        }
    }

    /// Stores an already-structured JSON value. Only meaningful for code and
    /// yaml editors.
    pub fn set_json(&self, container: &mut FormContainer, value: serde_json::Value) {
        if matches!(self.active, ComponentId::Code | ComponentId::Yaml) {
            container.set_value(&self.key, FormValue::Json(value));
        }
    }
}

/// Whether a stored value still looks like a template expression.
fn is_expression_shaped(value: &FormValue) -> bool {
    match value {
        FormValue::Expression(s) => expr::is_expression_shaped(s),
        FormValue::Text(s) => expr::is_expression_shaped(s),
        _ => false,
    }
}
