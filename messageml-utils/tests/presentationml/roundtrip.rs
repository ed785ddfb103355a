//! Rendered PresentationML re-parses, with its entity JSON, into the tree
//! the message was parsed into.

use crate::common::context;
use messageml_utils::{ElementKind, Violation};
use serde_json::{Map, Value};

fn assert_round_trip(message: &str) {
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap();
    let original = ctx.tree().unwrap().clone();
    let pml = ctx.presentationml().unwrap();
    let json = serde_json::to_string(&ctx.entity_json().unwrap()).unwrap();

    let mut reparsed = context();
    reparsed
        .parse_messageml(&pml, Some(&json))
        .unwrap_or_else(|e| panic!("re-parsing {pml} failed: {e}"));
    assert!(
        original.content_eq(reparsed.tree().unwrap()),
        "tree of {pml} differs from the tree of {message}"
    );
    assert_eq!(reparsed.presentationml().unwrap(), pml);
}

#[test]
fn test_hashtag_round_trip() {
    assert_round_trip(r#"<messageML>see <hash tag="rust"/></messageML>"#);
}

#[test]
fn test_cashtag_round_trip() {
    assert_round_trip(r#"<messageML>Hello <cash tag="world"/>!</messageML>"#);
}

#[test]
fn test_mention_round_trip() {
    assert_round_trip(r#"<messageML>ping <mention uid="42"/> and <mention email="bot@example.com"/></messageML>"#);
}

#[test]
fn test_extension_span_round_trip() {
    let json = r#"{"obj1": {"type": "com.acme.widget", "version": "1.0", "id": [{"type": "com.acme.widget.id", "value": "w-7"}]}}"#;
    let mut ctx = context();
    ctx.parse_messageml(
        r#"<messageML><span class="entity" data-entity-id="obj1">Widget</span></messageML>"#,
        Some(json),
    )
    .unwrap();
    let original = ctx.tree().unwrap().clone();
    let pml = ctx.presentationml().unwrap();
    assert_eq!(
        pml,
        r#"<div data-format="PresentationML" data-version="2.0"><span class="entity" data-entity-id="obj1">Widget</span></div>"#
    );
    let emitted = serde_json::to_string(&ctx.entity_json().unwrap()).unwrap();
    let expected: Value = serde_json::from_str(json).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&emitted).unwrap(), expected);

    let mut reparsed = context();
    reparsed.parse_messageml(&pml, Some(&emitted)).unwrap();
    assert!(original.content_eq(reparsed.tree().unwrap()));
}

#[test]
fn test_form_controls_round_trip() {
    assert_round_trip(
        r#"<messageML><form id="f"><checkbox name="c" value="yes">Yes</checkbox><radio name="r">A</radio><text-field name="n" label="Name" title="Help">hi</text-field><button name="go">Go</button></form></messageML>"#,
    );
}

#[test]
fn test_date_picker_ranges_round_trip() {
    let message = r#"<messageML><form id="f"><date-picker name="when" disabled-date='[{"from": "2024-01-01", "to": "2024-01-07"}, {"daysOfWeek": [0, 6]}]' highlighted-date='[{"day": "2024-02-14"}]'/><button name="go">Go</button></form></messageML>"#;
    assert_round_trip(message);

    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap();
    let tree = ctx.tree().unwrap();
    let picker = tree
        .find_descendants(tree.root(), |n| n.kind() == ElementKind::DatePicker)
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(
        tree.node(picker).attribute("disabled-date"),
        Some(r#"[{"type":"range","from":"2024-01-01","to":"2024-01-07"},{"type":"weekdays","daysOfWeek":[0,6]}]"#)
    );
}

#[test]
fn test_card_round_trip() {
    assert_round_trip(
        r#"<messageML><card iconSrc="icon.png" class="wide"><header>Title <hash tag="news"/></header><body>Body</body></card></messageML>"#,
    );
}

#[test]
fn test_identifiers_match_entity_json_keys() {
    let mut ctx = context();
    ctx.parse_messageml(
        r#"<messageML><hash tag="a"/><cash tag="B"/><mention uid="42"/><p><hash tag="c"/></p></messageML>"#,
        None,
    )
    .unwrap();
    let pml = ctx.presentationml().unwrap();
    let json = ctx.entity_json().unwrap();

    let document = roxmltree::Document::parse(&pml).unwrap();
    let referenced: Vec<&str> = document
        .descendants()
        .filter_map(|n| n.attribute("data-entity-id"))
        .collect();
    let keys: Vec<&str> = json.keys().map(String::as_str).collect();
    assert_eq!(referenced, keys);
    assert_eq!(keys, vec!["keyword1", "keyword2", "mention3", "keyword4"]);
}

#[test]
fn test_presentation_reference_needs_a_record() {
    let pml = r#"<div data-format="PresentationML" data-version="2.0"><span class="entity" data-entity-id="keyword1">#rust</span></div>"#;
    let mut ctx = context();
    let err = ctx.parse_messageml(pml, None).unwrap_err();
    assert_eq!(err.violation(), Some(Violation::Entity));

    let mut json = Map::new();
    json.insert(
        "keyword1".to_string(),
        messageml_utils::entity::EntityRecord::hashtag("rust").to_value(),
    );
    let raw = serde_json::to_string(&json).unwrap();
    ctx.parse_messageml(pml, Some(&raw)).unwrap();
    assert_eq!(ctx.markdown().unwrap(), "#rust");
}
