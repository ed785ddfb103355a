//! End-to-end examples of the three artifacts rendered from one message.

use crate::common::{context, parse_error, render};
use messageml_utils::{MessageMLContext, Violation};

#[test]
fn test_cash_tag_renders_all_artifacts() {
    let mut ctx = context();
    ctx.parse_messageml(r#"<messageML>Hello <cash tag="world"/>!</messageML>"#, None)
        .unwrap();

    assert_eq!(
        ctx.presentationml().unwrap(),
        r#"<div data-format="PresentationML" data-version="2.0">Hello <span class="entity" data-entity-id="keyword1">$world</span>!</div>"#
    );
    assert_eq!(ctx.markdown().unwrap(), "Hello $world!");
    assert_eq!(
        serde_json::to_string(&ctx.entity_json().unwrap()).unwrap(),
        r#"{"keyword1":{"type":"org.symphonyoss.fin.security","version":"1.0","id":[{"type":"org.symphonyoss.fin.security.id.ticker","value":"world"}]}}"#
    );
}

#[test]
fn test_title_on_line_break_is_rejected() {
    let mut ctx = context();
    let err = ctx
        .parse_messageml(r#"<messageML><br title="label"/></messageML>"#, None)
        .unwrap_err();
    assert_eq!(err.to_string(), "Attribute \"title\" is not allowed in \"br\"");
    assert_eq!(err.violation(), Some(Violation::Attribute));
}

#[test]
fn test_oversized_date_range_is_rejected() {
    let intervals: Vec<String> = (1..=60)
        .map(|_| r#"{"day": "2024-01-01"}"#.to_string())
        .collect();
    let ranges = format!("[{}]", intervals.join(", "));
    assert!(ranges.len() > 1024);

    let message = format!(
        r#"<messageML><form id="f"><date-picker name="when" disabled-date='{ranges}'/><button name="go">Go</button></form></messageML>"#
    );
    assert_eq!(
        parse_error(&message),
        "Attribute \"disabled-date\" exceed maximum allowed length (1024)"
    );
}

#[test]
fn test_keywords_number_in_document_order() {
    let (pml, json) = render(r#"<messageML><hash tag="one"/> <cash tag="TWO"/> <hash tag="three"/></messageML>"#);
    assert!(pml.contains(r#"data-entity-id="keyword1">#one</span>"#));
    assert!(pml.contains(r#"data-entity-id="keyword2">$TWO</span>"#));
    assert!(pml.contains(r#"data-entity-id="keyword3">#three</span>"#));
    let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&json)
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["keyword1", "keyword2", "keyword3"]);
}

#[test]
fn test_mention_renders_pretty_name() {
    let mut ctx = context();
    ctx.parse_messageml(r#"<messageML>ping <mention uid="42"/></messageML>"#, None)
        .unwrap();
    assert_eq!(
        ctx.presentationml().unwrap(),
        r#"<div data-format="PresentationML" data-version="2.0">ping <span class="entity" data-entity-id="mention1">@Jane Doe</span></div>"#
    );
    assert_eq!(ctx.markdown().unwrap(), "ping @Jane Doe");
}

#[test]
fn test_unknown_tag_is_rejected() {
    assert_eq!(
        parse_error("<messageML><blink>x</blink></messageML>"),
        "Invalid MessageML content at element \"blink\""
    );
}

#[test]
fn test_rejects_after_success_clear_the_tree() {
    let mut ctx = context();
    ctx.parse_messageml("<messageML>fine</messageML>", None).unwrap();
    assert!(ctx
        .parse_messageml("<messageML><b><p>x</p></b></messageML>", None)
        .is_err());
    assert!(ctx.tree().is_none());
    assert!(ctx.presentationml().is_err());
}

#[test]
fn test_reparsing_in_one_context_restarts_entity_ids() {
    let message = r#"<messageML>Hello <cash tag="world"/>!</messageML>"#;
    let mut ctx = MessageMLContext::default();
    ctx.parse_messageml(message, None).unwrap();
    let first = (ctx.presentationml().unwrap(), ctx.entity_json().unwrap());

    ctx.parse_messageml(r#"<messageML><hash tag="a"/><hash tag="b"/></messageML>"#, None)
        .unwrap();
    ctx.parse_messageml(message, None).unwrap();
    let second = (ctx.presentationml().unwrap(), ctx.entity_json().unwrap());

    assert!(first.0.contains(r#"data-entity-id="keyword1""#));
    assert_eq!(first, second);
}
