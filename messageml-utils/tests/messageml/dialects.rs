//! Attribute legality depends on the dialect a document is written in.

use crate::common::context;
use messageml_utils::Violation;

fn violation(message: &str) -> Option<Violation> {
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap_err().violation()
}

#[test]
fn test_presentation_name_is_illegal_in_messageml() {
    assert_eq!(
        violation(r#"<messageML><card data-icon-src="icon.png">x</card></messageML>"#),
        Some(Violation::Attribute)
    );
}

#[test]
fn test_authoring_name_is_illegal_in_presentationml() {
    assert_eq!(
        violation(
            r#"<div data-format="PresentationML" data-version="2.0"><div class="card" iconSrc="icon.png">x</div></div>"#
        ),
        Some(Violation::Attribute)
    );
}

#[test]
fn test_authoring_only_attribute_is_illegal_in_presentationml() {
    let message = r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><input type="text" name="n" label="Name"/><button type="action" name="go">Go</button></form></div>"#;
    assert_eq!(violation(message), Some(Violation::Attribute));
}

#[test]
fn test_shorthand_tags_are_illegal_in_presentationml() {
    let mut ctx = context();
    let err = ctx
        .parse_messageml(
            r#"<div data-format="PresentationML" data-version="2.0"><card>x</card></div>"#,
            None,
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Shorthand tag \"card\" is not allowed in PresentationML");
}

#[test]
fn test_renamed_attribute_is_stored_under_the_authoring_name() {
    let mut ctx = context();
    ctx.parse_messageml(
        r#"<div data-format="PresentationML" data-version="2.0"><div class="card" data-icon-src="icon.png"><div class="cardBody">x</div></div></div>"#,
        None,
    )
    .unwrap();
    let tree = ctx.tree().unwrap();
    let card = tree.children(tree.root())[0];
    assert_eq!(tree.node(card).attribute("iconSrc"), Some("icon.png"));
    assert_eq!(tree.node(card).attribute("data-icon-src"), None);
}

#[test]
fn test_control_id_is_only_structural_inside_a_generated_wrapper() {
    let wrapped = r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><div class="text-field-group" data-generated="true"><label for="text-field-x">Name</label><input type="text" id="text-field-x" name="n"/></div><button type="action" name="go">Go</button></form></div>"#;
    let mut ctx = context();
    ctx.parse_messageml(wrapped, None).unwrap();

    let bare = r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><input type="text" id="x" name="n"/><button type="action" name="go">Go</button></form></div>"#;
    let err = ctx.parse_messageml(bare, None).unwrap_err();
    assert_eq!(err.to_string(), "Attribute \"id\" is not allowed in \"text-field\"");

    let choice = r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><div class="checkbox-group"><input type="checkbox" id="c1" name="c"/><label>Yes</label></div><button type="action" name="go">Go</button></form></div>"#;
    assert_eq!(violation(choice), Some(Violation::Attribute));
}
