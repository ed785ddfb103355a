//! Entity JSON and the legacy entities document.

use crate::common::{context, CountingIds};
use messageml_utils::formats::{EntityJsonFormat, LegacyEntitiesFormat};
use messageml_utils::{Format, MessageMLError, Violation};
use serde_json::{json, Value};

fn parsed(message: &str) -> messageml_utils::MessageMLContext {
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap();
    ctx
}

#[test]
fn test_entity_json_records() {
    let ctx = parsed(r#"<messageML><hash tag="rust"/> <mention uid="42"/></messageML>"#);
    assert_eq!(
        Value::Object(ctx.entity_json().unwrap()),
        json!({
            "keyword1": {
                "type": "org.symphonyoss.taxonomy",
                "version": "1.0",
                "id": [{"type": "org.symphonyoss.taxonomy.hashtag", "value": "rust"}]
            },
            "mention2": {
                "type": "com.symphony.user.mention",
                "version": "1.0",
                "id": [{"type": "com.symphony.user.userId", "value": 42}]
            }
        })
    );
}

#[test]
fn test_message_without_entities_has_empty_json() {
    let ctx = parsed("<messageML><b>plain</b></messageML>");
    assert!(ctx.entity_json().unwrap().is_empty());
    assert!(ctx.entities().unwrap().is_empty());
}

#[test]
fn test_legacy_entities_document() {
    let ctx = parsed(
        r#"<messageML><hash tag="rust"/> <cash tag="ACME"/> <mention uid="42"/> <a href="https://example.com">x</a></messageML>"#,
    );
    assert_eq!(
        Value::Object(ctx.entities().unwrap()),
        json!({
            "hashtags": [
                {"id": "#rust", "text": "#rust", "type": "KEYWORD"},
                {"id": "$ACME", "text": "$ACME", "type": "KEYWORD"}
            ],
            "userMentions": [
                {"id": 42, "screenName": "jdoe", "prettyName": "Jane Doe", "text": "@Jane Doe", "type": "USER_FOLLOW"}
            ],
            "urls": [
                {"id": "https://example.com", "text": "https://example.com", "expandedUrl": "https://example.com", "type": "URL"}
            ]
        })
    );
}

#[test]
fn test_formats_serialize_compact_or_pretty() {
    let ctx = parsed(r#"<messageML><cash tag="world"/></messageML>"#);
    let tree = ctx.tree().unwrap();

    let compact = EntityJsonFormat { pretty: false }.serialize(tree).unwrap();
    assert!(compact.starts_with(r#"{"keyword1":{"type""#));
    let pretty = EntityJsonFormat { pretty: true }.serialize(tree).unwrap();
    assert!(pretty.starts_with("{\n  \"keyword1\": {"));

    let legacy = LegacyEntitiesFormat::default().serialize(tree).unwrap();
    assert_eq!(
        legacy,
        r#"{"hashtags":[{"id":"$world","text":"$world","type":"KEYWORD"}]}"#
    );
}

#[test]
fn test_malformed_entity_json_is_rejected() {
    let mut ctx = context();
    let err = ctx
        .parse_messageml("<messageML>x</messageML>", Some("{not json"))
        .unwrap_err();
    assert!(err.to_string().starts_with("Error parsing EntityJSON"));
    assert_eq!(err.violation(), Some(Violation::Entity));
}

#[test]
fn test_blank_entity_json_is_empty() {
    let mut ctx = context();
    ctx.parse_messageml("<messageML>x</messageML>", Some("  ")).unwrap();
    assert!(ctx.entity_json().unwrap().is_empty());
}

#[test]
fn test_presentation_ids_are_kept_and_new_ids_avoid_them() {
    let json = r#"{"keyword1": {"type": "org.symphonyoss.taxonomy", "version": "1.0", "id": [{"type": "org.symphonyoss.taxonomy.hashtag", "value": "kept"}]}}"#;
    let mut ctx = messageml_utils::MessageMLContext::default().with_allocator(CountingIds::default());
    ctx.parse_messageml(
        r#"<div data-format="PresentationML" data-version="2.0"><span class="entity" data-entity-id="keyword1">#kept</span></div>"#,
        Some(json),
    )
    .unwrap();
    let keys: Vec<String> = ctx.entity_json().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["keyword1"]);
}

#[test]
fn test_extension_records_are_checked_against_their_schema() {
    let mut schemas = messageml_utils::EntitySchemas::new();
    schemas.register("com.acme.widget", json!({"type": "object", "required": ["id"]}));
    let mut ctx = messageml_utils::MessageMLContext::default().with_schemas(schemas);
    let message = r#"<messageML><span class="entity" data-entity-id="w1">Widget</span></messageML>"#;

    let err = ctx
        .parse_messageml(message, Some(r#"{"w1": {"type": "com.acme.widget", "version": "1.0"}}"#))
        .unwrap_err();
    assert!(matches!(
        err,
        MessageMLError::InvalidInput {
            violation: Violation::Entity,
            ..
        }
    ));
    assert!(err
        .to_string()
        .starts_with("Entity \"w1\" of type \"com.acme.widget\" does not match its schema"));

    ctx.parse_messageml(
        message,
        Some(r#"{"w1": {"type": "com.acme.widget", "version": "1.0", "id": []}}"#),
    )
    .unwrap();
}
