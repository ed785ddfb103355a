//! Usage telemetry collected while parsing.

use crate::common::context;
use messageml_utils::{BiContext, BiFields, BiItem, TelemetrySink};
use serde_json::{json, Map};

fn telemetry(message: &str) -> BiContext {
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap();
    ctx.telemetry().clone()
}

#[test]
fn test_counts_repeated_elements() {
    let bi = telemetry("<messageML><b>one</b> <b>two</b> <i>three</i></messageML>");
    assert_eq!(bi.item("bold").and_then(|i| i.count("count")), Some(2));
    assert_eq!(bi.item("italic").and_then(|i| i.count("count")), Some(1));
    assert!(bi.item("links").is_none());
}

#[test]
fn test_message_length_is_recorded() {
    let message = "<messageML>hello</messageML>";
    let bi = telemetry(message);
    assert_eq!(
        bi.item(BiFields::MessageLength.as_str()).and_then(|i| i.count("count")),
        Some(message.len() as i64)
    );
}

#[test]
fn test_entities_report_their_type() {
    let bi = telemetry(r#"<messageML><hash tag="a"/><cash tag="B"/></messageML>"#);
    assert_eq!(bi.item("hashtags").and_then(|i| i.count("count")), Some(1));
    assert_eq!(bi.item("cashtags").and_then(|i| i.count("count")), Some(1));
    let types: Vec<_> = bi
        .items()
        .iter()
        .filter(|item| item.name() == "entity")
        .filter_map(|item| item.attributes().get("entity_type").cloned())
        .collect();
    assert_eq!(
        types,
        vec![
            json!("org.symphonyoss.taxonomy.hashtag"),
            json!("org.symphonyoss.fin.security.id.ticker")
        ]
    );
}

#[test]
fn test_form_controls_report_their_attributes() {
    let bi = telemetry(
        r#"<messageML><form id="f"><text-field name="n" placeholder="p" required="true"/><button name="go" class="secondary">Go</button></form></messageML>"#,
    );
    let field = bi.item("text_field").unwrap();
    assert_eq!(field.count("placeholder"), Some(1));
    assert_eq!(field.count("required"), Some(1));
    let button = bi.item("button").unwrap();
    assert_eq!(button.attributes().get("style_color"), Some(&json!("secondary")));
    assert_eq!(button.attributes().get("type"), Some(&json!("action")));
}

#[test]
fn test_each_parse_starts_from_scratch() {
    let mut ctx = context();
    ctx.parse_messageml("<messageML><b>x</b></messageML>", None).unwrap();
    ctx.parse_messageml("<messageML><b>x</b></messageML>", None).unwrap();
    assert_eq!(
        ctx.telemetry().item("bold").and_then(|i| i.count("count")),
        Some(1)
    );
}

#[test]
fn test_update_count_aggregates() {
    let mut bi = BiContext::new();
    bi.update_count("cards");
    bi.update_count("cards");
    assert_eq!(bi.items().len(), 1);
    assert_eq!(bi.item("cards").and_then(|i| i.count("count")), Some(2));
}

#[test]
fn test_update_item_merges_attributes() {
    let mut bi = BiContext::new();
    let mut first = Map::new();
    first.insert("label".into(), json!(1));
    bi.update_item("select", first);

    let mut second = Map::new();
    second.insert("label".into(), json!(1));
    second.insert("title".into(), json!(1));
    bi.update_item("select", second);

    let item = bi.item("select").unwrap();
    assert_eq!(item.count("label"), Some(2));
    assert_eq!(item.count("title"), Some(1));
    assert!(bi.is_attribute_set("select", "title"));
    assert!(!bi.is_attribute_set("select", "placeholder"));
}

#[test]
fn test_update_max_keeps_largest() {
    let mut bi = BiContext::with_version("test");
    bi.update_max("table_cell_col_span", 3);
    bi.update_max("table_cell_col_span", 2);
    assert_eq!(bi.item("table_cell_col_span").and_then(|i| i.count("count")), Some(3));
    assert_eq!(bi.library_version(), "test");

    bi.add_item(BiItem::counted("dialog", "count"));
    assert_eq!(bi.items().len(), 2);
    bi.clear();
    assert!(bi.items().is_empty());
}
