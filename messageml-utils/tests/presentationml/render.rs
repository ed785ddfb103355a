//! PresentationML produced for the authoring shorthands.

use crate::common::render;
use insta::assert_snapshot;

fn pml(message: &str) -> String {
    render(message).0
}

#[test]
fn test_card_becomes_marked_divs() {
    let out = pml(
        r#"<messageML><card iconSrc="icon.png" accent="tempo-bg-color--blue"><header>Title</header><body>Body</body></card></messageML>"#,
    );
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><div class="card" data-icon-src="icon.png" data-accent-color="tempo-bg-color--blue"><div class="cardHeader">Title</div><div class="cardBody">Body</div></div></div>"#);
}

#[test]
fn test_card_residual_class_follows_marker() {
    let out = pml(r#"<messageML><card class="wide"><body>Body</body></card></messageML>"#);
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><div class="card wide"><div class="cardBody">Body</div></div></div>"#);
}

#[test]
fn test_checkbox_becomes_input_and_label() {
    let out = pml(
        r#"<messageML><form id="f"><checkbox name="c" checked="true">Yes</checkbox><button name="go">Go</button></form></messageML>"#,
    );
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><div class="checkbox-group"><input type="checkbox" value="on" name="c" checked="true"/><label>Yes</label></div><button type="action" name="go">Go</button></form></div>"#);
}

#[test]
fn test_labelled_text_field_is_wrapped() {
    let out = pml(
        r#"<messageML><form id="f"><text-field name="n" label="Name" title="Help" placeholder="Type">hi</text-field><button name="go">Go</button></form></messageML>"#,
    );
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><div class="text-field-group" data-generated="true"><label for="text-field-1">Name</label><span class="info-hint" data-target-id="text-field-1" data-title="Help"></span><input type="text" id="text-field-1" name="n" placeholder="Type" value="hi"/></div><button type="action" name="go">Go</button></form></div>"#);
}

#[test]
fn test_unlabelled_text_field_is_not_wrapped() {
    let out = pml(
        r#"<messageML><form id="f"><text-field name="n"/><button name="go">Go</button></form></messageML>"#,
    );
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><input type="text" name="n"/><button type="action" name="go">Go</button></form></div>"#);
}

#[test]
fn test_date_ranges_are_single_quoted_json() {
    let out = pml(
        r#"<messageML><form id="f"><date-picker name="when" highlighted-date='[{"day": "2024-02-14"}]'/><button name="go">Go</button></form></messageML>"#,
    );
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><form id="f"><input type="date" name="when" data-highlighted-date='[{"type":"date","day":"2024-02-14"}]'/><button type="action" name="go">Go</button></form></div>"#);
}

#[test]
fn test_text_and_attributes_are_escaped() {
    let out = pml(r#"<messageML><a href="https://example.com/?a=1&amp;b=2">a &lt; b</a></messageML>"#);
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0"><a href="https://example.com/?a=1&amp;b=2">a &lt; b</a></div>"#);
}

#[test]
fn test_void_elements_self_close() {
    let out = pml("<messageML>one<br/>two<hr/></messageML>");
    assert_snapshot!(out, @r#"<div data-format="PresentationML" data-version="2.0">one<br/>two<hr/></div>"#);
}

#[test]
fn test_data_version_follows_options() {
    let options = messageml_utils::ParseOptions {
        presentationml_version: "2.1".to_string(),
        ..Default::default()
    };
    let mut ctx = crate::common::context_with(options);
    ctx.parse_messageml("<messageML>x</messageML>", None).unwrap();
    assert_eq!(
        ctx.presentationml().unwrap(),
        r#"<div data-format="PresentationML" data-version="2.1">x</div>"#
    );
}
