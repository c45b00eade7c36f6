//! Tests for the per-field editor state machine.
mod common;
use common::*;
use kinyu::prelude::*;

fn bare_container() -> FormContainer {
    FormContainer::new(FormValidator::new())
}

fn plan_for(declared: DeclaredType) -> EditorPlan {
    Resolver::default().resolve(&descriptor("field", declared))
}

#[test]
fn test_initial_state_is_first_concrete_choice() {
    let host = FieldHost::new("count", plan_for(DeclaredType::Integer), None);
    assert_eq!(host.active(), ComponentId::Integer);
}

#[test]
fn test_initial_state_detects_template_seed() {
    let seed = FormValue::Text("{{ steps.scan.total }}".to_string());
    let host = FieldHost::new("count", plan_for(DeclaredType::Integer), Some(&seed));
    assert_eq!(host.active(), ComponentId::Expression);
}

#[test]
fn test_initial_state_matches_seed_representation() {
    let plan = EditorPlan {
        choices: vec![
            EditorChoice::Text,
            EditorChoice::Integer { min: None, max: None },
            EditorChoice::Expression,
        ],
    };
    let seed = FormValue::Integer(Some(3));
    let host = FieldHost::new("count", plan, Some(&seed));
    assert_eq!(host.active(), ComponentId::Integer);
}

#[test]
fn test_initial_state_for_expression_only_plan() {
    let plan = Resolver::default().resolve(&descriptor(
        "owner",
        DeclaredType::Relation(RelationKind::BelongsTo),
    ));
    let host = FieldHost::new("owner", plan, None);
    assert_eq!(host.active(), ComponentId::Expression);
}

#[test]
fn test_switch_to_unknown_component_is_rejected() {
    let mut container = bare_container();
    let mut host = FieldHost::new("count", plan_for(DeclaredType::Integer), None);
    host.apply_text(&mut container, "7");

    let outcome = host.switch(ComponentId::Toggle, &mut container);
    assert_eq!(outcome, SwitchOutcome::Rejected);
    assert_eq!(host.active(), ComponentId::Integer);
    assert_eq!(container.value("count"), Some(&FormValue::Integer(Some(7))));
}

#[test]
fn test_switch_to_active_component_is_unchanged() {
    let mut container = bare_container();
    let mut host = FieldHost::new("count", plan_for(DeclaredType::Integer), None);
    assert_eq!(
        host.switch(ComponentId::Integer, &mut container),
        SwitchOutcome::Unchanged
    );
}

#[test]
fn test_integer_editor_coerces_garbage_to_empty() {
    let mut container = bare_container();
    let host = FieldHost::new("count", plan_for(DeclaredType::Integer), None);

    host.apply_text(&mut container, "abc");
    assert_eq!(container.value("count"), Some(&FormValue::Integer(None)));

    host.apply_text(&mut container, "42");
    assert_eq!(container.value("count"), Some(&FormValue::Integer(Some(42))));
}

#[test]
fn test_leaving_expression_with_template_clears_value() {
    let mut container = bare_container();
    let mut host = FieldHost::new("title", plan_for(DeclaredType::Text), None);

    host.switch(ComponentId::Expression, &mut container);
    host.apply_text(&mut container, "{{ record.name }}");

    let outcome = host.switch(ComponentId::Text, &mut container);
    assert_eq!(outcome, SwitchOutcome::Cleared);
    assert_eq!(
        container.value("title"),
        Some(&FormValue::Text(String::new()))
    );
}

#[test]
fn test_leaving_expression_with_plain_text_preserves_value() {
    let mut container = bare_container();
    let mut host = FieldHost::new("title", plan_for(DeclaredType::Text), None);

    host.switch(ComponentId::Expression, &mut container);
    host.apply_text(&mut container, "hello");

    let outcome = host.switch(ComponentId::Text, &mut container);
    assert_eq!(outcome, SwitchOutcome::Preserved);
    assert_eq!(
        container.value("title"),
        Some(&FormValue::Text("hello".to_string()))
    );
}

#[test]
fn test_text_survives_switch_into_expression() {
    let mut container = bare_container();
    let mut host = FieldHost::new("title", plan_for(DeclaredType::Text), None);

    host.apply_text(&mut container, "hello");
    let outcome = host.switch(ComponentId::Expression, &mut container);
    assert_eq!(outcome, SwitchOutcome::Preserved);
    assert_eq!(
        container.value("title"),
        Some(&FormValue::Expression("hello".to_string()))
    );
}

#[test]
fn test_integer_widens_to_float() {
    let mut container = bare_container();
    let plan = EditorPlan {
        choices: vec![
            EditorChoice::Integer { min: None, max: None },
            EditorChoice::Float {
                min: None,
                max: None,
                step: None,
            },
            EditorChoice::Expression,
        ],
    };
    let mut host = FieldHost::new("amount", plan, None);
    host.apply_text(&mut container, "42");

    let outcome = host.switch(ComponentId::Float, &mut container);
    assert_eq!(outcome, SwitchOutcome::Widened);
    assert_eq!(
        container.value("amount"),
        Some(&FormValue::Float(Some(42.0)))
    );
}

#[test]
fn test_float_to_integer_clears() {
    let mut container = bare_container();
    let plan = EditorPlan {
        choices: vec![
            EditorChoice::Integer { min: None, max: None },
            EditorChoice::Float {
                min: None,
                max: None,
                step: None,
            },
            EditorChoice::Expression,
        ],
    };
    let mut host = FieldHost::new("amount", plan, None);
    host.switch(ComponentId::Float, &mut container);
    host.apply_text(&mut container, "2.5");

    let outcome = host.switch(ComponentId::Integer, &mut container);
    assert_eq!(outcome, SwitchOutcome::Cleared);
    assert_eq!(container.value("amount"), Some(&FormValue::Integer(None)));
}

#[test]
fn test_typed_values_clear_when_entering_expression() {
    let mut container = bare_container();
    let mut host = FieldHost::new("count", plan_for(DeclaredType::Integer), None);
    host.apply_text(&mut container, "42");

    // Only string-backed values carry over into the expression editor.
    let outcome = host.switch(ComponentId::Expression, &mut container);
    assert_eq!(outcome, SwitchOutcome::Cleared);
    assert_eq!(
        container.value("count"),
        Some(&FormValue::Expression(String::new()))
    );
}

#[test]
fn test_empty_value_switches_without_loss_reporting() {
    let mut container = bare_container();
    let plan = EditorPlan {
        choices: vec![
            EditorChoice::Text,
            EditorChoice::Toggle,
            EditorChoice::Expression,
        ],
    };
    let mut host = FieldHost::new("flag", plan, None);
    host.apply_text(&mut container, "");

    let outcome = host.switch(ComponentId::Toggle, &mut container);
    assert_eq!(outcome, SwitchOutcome::Preserved);
    assert_eq!(container.value("flag"), Some(&FormValue::Bool(false)));
}

#[test]
fn test_toggle_editor() {
    let mut container = bare_container();
    let host = FieldHost::new("active", plan_for(DeclaredType::Bool), None);

    host.set_bool(&mut container, true);
    assert_eq!(container.value("active"), Some(&FormValue::Bool(true)));

    host.apply_text(&mut container, "false");
    assert_eq!(container.value("active"), Some(&FormValue::Bool(false)));
}

#[test]
fn test_tag_operations() {
    let mut container = bare_container();
    let host = FieldHost::new("labels", plan_for(DeclaredType::Tags), None);

    host.push_tag(&mut container, "bug");
    host.push_tag(&mut container, "  ui  ");
    host.push_tag(&mut container, "   ");
    assert_eq!(
        container.value("labels"),
        Some(&FormValue::Tags(vec!["bug".to_string(), "ui".to_string()]))
    );

    host.remove_tag(&mut container, "bug");
    assert_eq!(
        container.value("labels"),
        Some(&FormValue::Tags(vec!["ui".to_string()]))
    );

    host.set_tags(&mut container, vec!["fresh".to_string()]);
    assert_eq!(
        container.value("labels"),
        Some(&FormValue::Tags(vec!["fresh".to_string()]))
    );
}

#[test]
fn test_tag_editor_splits_raw_text_on_commas() {
    let mut container = bare_container();
    let host = FieldHost::new("labels", plan_for(DeclaredType::Tags), None);

    host.apply_text(&mut container, "bug, ui, , backend");
    assert_eq!(
        container.value("labels"),
        Some(&FormValue::Tags(vec![
            "bug".to_string(),
            "ui".to_string(),
            "backend".to_string()
        ]))
    );
}
