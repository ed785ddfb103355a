//! Property tests over arbitrary text.

use messageml_utils::formats::presentationml::writer::{escape_attribute, escape_text, Quoting};
use messageml_utils::{BiContext, TelemetrySink};
use proptest::prelude::*;

fn xml_char() -> impl Strategy<Value = char> {
    prop_oneof![
        any::<char>().prop_filter("XML 1.0 character", |c| {
            matches!(*c, '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
        }),
        prop::sample::select(vec!['<', '>', '&', '"', '\'', '\n', '\t', ' ']),
    ]
}

fn xml_text() -> impl Strategy<Value = String> {
    prop::collection::vec(xml_char(), 0..40).prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn escaped_attribute_reparses_to_original(value in xml_text()) {
        let standard = format!("<a v=\"{}\"/>", escape_attribute(&value, Quoting::Standard));
        let doc = roxmltree::Document::parse(&standard).unwrap();
        prop_assert_eq!(doc.root_element().attribute("v"), Some(value.as_str()));

        let json = format!("<a v='{}'/>", escape_attribute(&value, Quoting::Json));
        let doc = roxmltree::Document::parse(&json).unwrap();
        prop_assert_eq!(doc.root_element().attribute("v"), Some(value.as_str()));
    }

    #[test]
    fn escaped_text_reparses_to_original(value in xml_text()) {
        // Parsers normalize CR line endings in content.
        let value = value.replace('\r', "");
        let xml = format!("<a>{}</a>", escape_text(&value));
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let text: String = doc
            .root_element()
            .children()
            .filter_map(|n| n.text())
            .collect();
        prop_assert_eq!(text, value);
    }

    #[test]
    fn text_messages_render_and_reparse(value in "[a-zA-Z0-9][a-zA-Z0-9 .,!?<>&]{0,29}") {
        let escaped = escape_text(&value);
        let message = format!("<messageML>{escaped}</messageML>");
        let mut ctx = crate::common::context();
        ctx.parse_messageml(&message, None).unwrap();
        let pml = ctx.presentationml().unwrap();

        let mut reparsed = crate::common::context();
        reparsed.parse_messageml(&pml, Some("{}")).unwrap();
        prop_assert!(ctx.tree().unwrap().content_eq(reparsed.tree().unwrap()));
        prop_assert_eq!(reparsed.markdown().unwrap(), value);
    }

    #[test]
    fn update_count_is_additive(names in prop::collection::vec(prop::sample::select(vec!["bold", "italic", "cards"]), 0..30)) {
        let mut bi = BiContext::new();
        for name in &names {
            bi.update_count(name);
        }
        for name in ["bold", "italic", "cards"] {
            let expected = names.iter().filter(|n| **n == name).count() as i64;
            let actual = bi.item(name).and_then(|item| item.count("count"));
            prop_assert_eq!(actual, (expected > 0).then_some(expected));
        }
    }
}
