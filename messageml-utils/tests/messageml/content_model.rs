//! Parent/child rules enforced while the tree is built.

use crate::common::{context, parse_error};
use messageml_utils::Violation;

fn violation(message: &str) -> Option<Violation> {
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap_err().violation()
}

#[test]
fn test_list_item_outside_list() {
    assert_eq!(
        parse_error("<messageML><li>x</li></messageML>"),
        "Element \"li\" can only be a child of the following elements: [ul, ol]"
    );
    assert_eq!(violation("<messageML><li>x</li></messageML>"), Some(Violation::Structure));
}

#[test]
fn test_button_outside_form() {
    assert_eq!(
        violation(r#"<messageML><button name="go">Go</button></messageML>"#),
        Some(Violation::Structure)
    );
}

#[test]
fn test_form_without_action_button() {
    assert_eq!(
        parse_error(r#"<messageML><form id="f1"><button type="reset">Reset</button></form></messageML>"#),
        "The form with id 'f1' should have at least one action button"
    );
}

#[test]
fn test_form_inside_dialog_needs_no_action_button() {
    let message = r#"<messageML><ui-action trigger="click" action="open-dialog" target-id="d1"><button>Open</button></ui-action><dialog id="d1"><title>T</title><body><form id="f1"><text-field name="n"/></form></body></dialog></messageML>"#;
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap();
}

#[test]
fn test_block_inside_phrasing() {
    assert_eq!(
        parse_error("<messageML><b><p>x</p></b></messageML>"),
        "Element \"p\" is not allowed in \"b\""
    );
}

#[test]
fn test_nested_forms() {
    let message = r#"<messageML><form id="a"><form id="b"><button name="go">Go</button></form><button name="go">Go</button></form></messageML>"#;
    assert_eq!(violation(message), Some(Violation::Structure));
}

#[test]
fn test_malformed_xml_is_a_processing_error() {
    let mut ctx = context();
    let err = ctx.parse_messageml("<messageML><b>x</messageML>", None).unwrap_err();
    assert_eq!(err.violation(), None);
    assert!(err.to_string().starts_with("Processing error: XML parsing error"));
}
