//! End-to-end session tests: schema in, edits through the keyed facade,
//! normalized payload out.
mod common;
use common::*;
use kinyu::prelude::*;
use serde_json::json;

#[test]
fn test_full_ticket_flow_with_relation_section() {
    let source = StubSource::new().with("user", user_schema());
    let mut session = SessionBuilder::new("ticket", ticket_schema())
        .with_source(&source)
        .build();

    assert!(!session.is_fallback());
    assert_eq!(
        session.plan().scalar_keys(),
        vec![
            "title",
            "count",
            "level",
            "labels",
            "active",
            "config",
            "assignee.name",
            "assignee.age"
        ]
    );

    session.apply_text("title", "Broken login page");
    session.apply_text("count", "3");
    session.apply_text("level", "high");
    session.push_tag("labels", "bug");
    session.push_tag("labels", "auth");
    session.set_bool("active", true);
    session.apply_text("config", r#"{"retries": 2}"#);
    session.apply_text("assignee.name", "Sam");
    session.apply_text("assignee.age", "34");

    let backend = StubBackend::accepting("tk_1");
    let events = session.submit_with(&backend).unwrap();
    assert_eq!(
        events,
        vec![
            SessionEvent::Submitted {
                id: "tk_1".to_string()
            },
            SessionEvent::CloseRequested,
        ]
    );

    let payloads = backend.payloads.borrow();
    assert_eq!(
        payloads[0],
        json!({
            "title": "Broken login page",
            "count": 3,
            "level": "high",
            "labels": ["bug", "auth"],
            "active": true,
            "config": {"retries": 2},
            "assignee": {"name": "Sam", "age": 34}
        })
        .as_object()
        .cloned()
        .unwrap()
    );
    // Field order in the payload follows schema order.
    let keys: Vec<&str> = payloads[0].keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["title", "count", "level", "labels", "active", "config", "assignee"]
    );
}

#[test]
fn test_relation_fetch_failure_degrades_gracefully() {
    // The source knows nothing about the `user` entity.
    let source = StubSource::new();
    let mut session = SessionBuilder::new("ticket", ticket_schema())
        .with_source(&source)
        .build();

    assert!(session
        .notices()
        .iter()
        .any(|n| n.kind == NoticeKind::RelationUnavailable
            && n.key.as_deref() == Some("assignee")));
    assert!(!session
        .plan()
        .scalar_keys()
        .iter()
        .any(|k| k.starts_with("assignee")));

    // The rest of the form still works end to end.
    session.apply_text("title", "Still editable");
    let request = session.begin_submit().unwrap();
    assert_eq!(request.payload["title"], json!("Still editable"));
    assert!(!request.payload.contains_key("assignee"));
}

#[test]
fn test_missing_source_omits_relations() {
    let session = SessionBuilder::new("ticket", ticket_schema()).build();
    assert!(session
        .notices()
        .iter()
        .any(|n| n.kind == NoticeKind::RelationUnavailable));
}

#[test]
fn test_nested_relations_stop_at_depth_one() {
    let mut nested_user = user_schema();
    nested_user
        .fields
        .push(raw_field("team", "RELATION_BELONGS_TO"));
    nested_user.relations.push(RawRelation {
        source_key: "team".to_string(),
        relation_type: "RELATION_BELONGS_TO".to_string(),
        target_entity_id: "team".to_string(),
    });

    let source = StubSource::new().with("user", nested_user);
    let session = SessionBuilder::new("ticket", ticket_schema())
        .with_source(&source)
        .build();

    assert!(session
        .notices()
        .iter()
        .any(|n| n.kind == NoticeKind::NestedRelation && n.key.as_deref() == Some("team")));
    // The section keeps its scalar fields and drops only the nested relation.
    let keys = session.plan().scalar_keys();
    assert!(keys.contains(&"assignee.name".to_string()));
    assert!(!keys.iter().any(|k| k.contains("team")));
}

#[test]
fn test_switching_editors_through_the_session() {
    let mut session = SessionBuilder::new("ticket", ticket_schema()).build();
    assert_eq!(session.active("count"), Some(ComponentId::Integer));

    // A typed integer has no template representation; entering the
    // expression editor starts from an empty template.
    session.apply_text("count", "42");
    let outcome = session.switch("count", ComponentId::Expression);
    assert_eq!(outcome, SwitchOutcome::Cleared);
    assert_eq!(
        session.value("count"),
        Some(&FormValue::Expression(String::new()))
    );

    session.apply_text("count", "{{ steps.scan.total }}");
    let outcome = session.switch("count", ComponentId::Integer);
    assert_eq!(outcome, SwitchOutcome::Cleared);
    assert_eq!(session.value("count"), Some(&FormValue::Integer(None)));

    assert_eq!(
        session.switch("nonexistent", ComponentId::Text),
        SwitchOutcome::Rejected
    );
}

#[test]
fn test_integer_input_coercion_end_to_end() {
    let mut session = SessionBuilder::new("ticket", ticket_schema()).build();
    session.apply_text("title", "t");

    session.apply_text("count", "abc");
    assert_eq!(session.value("count"), Some(&FormValue::Integer(None)));

    session.apply_text("count", "42");
    let request = session.begin_submit().unwrap();
    assert_eq!(request.payload["count"], json!(42));
}

#[test]
fn test_seeded_session_picks_editors_from_values() {
    let source = StubSource::new().with("user", user_schema());
    let session = SessionBuilder::new("ticket", ticket_schema())
        .with_source(&source)
        .with_values(json!({
            "title": "{{ trigger.subject }}",
            "count": 7,
            "active": true,
            "assignee": {"name": "Sam"}
        }))
        .build();

    // A template-shaped seed opens in the expression editor.
    assert_eq!(session.active("title"), Some(ComponentId::Expression));
    assert_eq!(session.active("count"), Some(ComponentId::Integer));
    assert_eq!(session.value("count"), Some(&FormValue::Integer(Some(7))));
    assert_eq!(session.value("active"), Some(&FormValue::Bool(true)));
    assert_eq!(
        session.value("assignee.name"),
        Some(&FormValue::Text("Sam".to_string()))
    );
}

#[test]
fn test_tags_round_trip_through_payload_and_reseed() {
    let mut session = SessionBuilder::new("ticket", ticket_schema()).build();
    session.apply_text("title", "t");
    session.set_tags("labels", vec!["bug".to_string(), "ui".to_string()]);
    let request = session.begin_submit().unwrap();
    assert_eq!(request.payload["labels"], json!(["bug", "ui"]));

    let reseeded = SessionBuilder::new("ticket", ticket_schema())
        .with_values(serde_json::Value::Object(request.payload))
        .build();
    assert_eq!(
        reseeded.value("labels"),
        Some(&FormValue::Tags(vec!["bug".to_string(), "ui".to_string()]))
    );
}

#[test]
fn test_empty_schema_falls_back_to_structured_editor() {
    let mut session = SessionBuilder::new("blob", RawSchema::default()).build();
    assert!(session.is_fallback());

    session.set_fallback_json("{ broken");
    assert!(session.fallback_issue().is_some());
    let err = session.begin_submit().unwrap_err();
    let SubmitError::ValidationFailed { issues } = err else {
        panic!("expected a validation failure");
    };
    assert!(issues[0].key.is_empty());
    assert_eq!(issues[0].source, IssueSource::Parse);

    session.set_fallback_json(r#"{"anything": ["goes", 1]}"#);
    assert!(session.fallback_issue().is_none());
    let request = session.begin_submit().unwrap();
    assert_eq!(request.payload["anything"], json!(["goes", 1]));
}

#[test]
fn test_fallback_opens_with_seeded_record() {
    let mut session = SessionBuilder::new("blob", RawSchema::default())
        .with_values(json!({"name": "legacy", "weight": 3}))
        .build();
    assert!(session.is_fallback());
    assert!(session.fallback_json().contains("legacy"));
    assert!(session.fallback_issue().is_none());

    let request = session.begin_submit().unwrap();
    assert_eq!(request.payload["name"], json!("legacy"));
    assert_eq!(request.payload["weight"], json!(3));
}

#[test]
fn test_fallback_rejects_non_object_payloads() {
    let mut session = SessionBuilder::new("blob", RawSchema::default()).build();
    session.set_fallback_json("[1, 2, 3]");
    let err = session.begin_submit().unwrap_err();
    let SubmitError::ValidationFailed { issues } = err else {
        panic!("expected a validation failure");
    };
    assert!(issues[0].message.contains("JSON object"));
}

#[test]
fn test_fallback_clears_after_successful_submission() {
    let mut session = SessionBuilder::new("blob", RawSchema::default()).build();
    session.set_fallback_json(r#"{"a": 1}"#);
    session.begin_submit().unwrap();
    session.complete_submit(Ok(SubmitReceipt {
        id: "b_1".to_string(),
    }));
    assert!(session.fallback_json().is_empty());
}

#[test]
fn test_schema_from_wire_json_end_to_end() {
    let raw = RawSchema::from_json(
        r#"{
            "fields": [
                {"key": "name", "type": "STRING", "isNullable": false},
                {"key": "mode", "type": "ENUM", "enumOptions": ["fast", "safe"]},
                {"key": "ratio", "type": "FLOAT"}
            ]
        }"#,
    )
    .unwrap();
    let mut session = SessionBuilder::new("job", raw).build();

    session.apply_text("name", "nightly");
    session.apply_text("mode", "fast");
    session.apply_text("ratio", "0.5");

    let request = session.begin_submit().unwrap();
    assert_eq!(request.payload["name"], json!("nightly"));
    assert_eq!(request.payload["mode"], json!("fast"));
    assert_eq!(request.payload["ratio"], json!(0.5));
}

#[test]
fn test_hosts_reset_after_submission() {
    let mut session = SessionBuilder::new("ticket", ticket_schema()).build();
    session.apply_text("title", "t");
    session.switch("count", ComponentId::Expression);
    assert_eq!(session.active("count"), Some(ComponentId::Expression));

    session.begin_submit().unwrap();
    session.complete_submit(Ok(SubmitReceipt {
        id: "tk_2".to_string(),
    }));

    // A fresh session over the same plan: values gone, editors back to
    // their defaults.
    assert_eq!(session.value("title"), None);
    assert_eq!(session.active("count"), Some(ComponentId::Integer));
}
