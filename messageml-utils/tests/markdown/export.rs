//! Markdown rendered for plain-text clients.

use crate::common::context;

fn markdown(message: &str) -> String {
    let mut ctx = context();
    ctx.parse_messageml(message, None).unwrap();
    ctx.markdown().unwrap()
}

#[test]
fn test_inline_styles() {
    assert_eq!(
        markdown("<messageML><b>bold</b>, <i>italic</i> and <code>x = 1</code></messageML>"),
        "**bold**, _italic_ and `x = 1`"
    );
}

#[test]
fn test_links_and_images() {
    assert_eq!(
        markdown(r#"<messageML><a href="https://example.com">site</a> <img src="https://example.com/a.png"/></messageML>"#),
        "[site](https://example.com) ![](https://example.com/a.png)"
    );
}

#[test]
fn test_paragraphs_and_lists() {
    assert_eq!(
        markdown("<messageML><p>intro</p><ul><li>one</li><li>two</li></ul><ol><li>first</li></ol></messageML>"),
        "intro\n- one\n- two\n1. first"
    );
}

#[test]
fn test_blocks_break_lines_around_themselves() {
    assert_eq!(markdown("<messageML>a<h1>T</h1>b</messageML>"), "a\n**T**\nb");
    assert_eq!(
        markdown("<messageML>a<p>para</p><div>box</div><h3>sub <i>title</i></h3>end</messageML>"),
        "a\npara\nbox\n**sub _title_**\nend"
    );
    assert_eq!(markdown("<messageML>x <b>y</b> <span>z</span></messageML>"), "x **y** z");
}

#[test]
fn test_table_rows() {
    assert_eq!(
        markdown("<messageML><table><tr><th>h1</th><th>h2</th></tr><tr><td>a</td><td>b</td></tr></table></messageML>"),
        "h1 | h2\na | b"
    );
}

#[test]
fn test_form_is_framed() {
    assert_eq!(
        markdown(
            r#"<messageML><form id="f"><text-field name="n" placeholder="Name"/><button name="go">Go</button></form></messageML>"#
        ),
        "\nSymphony Form (log into desktop client to answer):\n---\n(Text Field:Name)(Button:Go)\n---"
    );
}

#[test]
fn test_select_lists_its_options() {
    assert_eq!(
        markdown(
            r#"<messageML><form id="f"><select name="s" data-placeholder="Pick"><option value="1">One</option><option value="2">Two</option></select><button name="go">Go</button></form></messageML>"#
        ),
        "\nSymphony Form (log into desktop client to answer):\n---\n(Dropdown:Pick)\n- One\n- Two(Button:Go)\n---"
    );
}

#[test]
fn test_card_content_is_kept() {
    let out = markdown("<messageML><card><header>Title</header><body>Body</body></card></messageML>");
    assert_eq!(out, "Title\nBody");
}
