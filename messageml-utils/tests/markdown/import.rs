//! CommonMark imported as a message.

use crate::common::context_with;
use messageml_utils::{ElementKind, InputFormat, ParseOptions};

fn import(source: &str) -> messageml_utils::MessageMLContext {
    let options = ParseOptions {
        input_format: InputFormat::Markdown,
        ..ParseOptions::default()
    };
    let mut ctx = context_with(options);
    ctx.parse_messageml(source, None).unwrap();
    ctx
}

#[test]
fn test_emphasis_renders_as_presentationml() {
    let mut ctx = import("some *emphasis* and **strength**");
    assert_eq!(
        ctx.presentationml().unwrap(),
        r#"<div data-format="PresentationML" data-version="2.0">some <i>emphasis</i> and <b>strength</b></div>"#
    );
}

#[test]
fn test_list_items_become_list_elements() {
    let ctx = import("- one\n- two\n");
    let tree = ctx.tree().unwrap();
    let lists = tree.find_descendants(tree.root(), |n| n.kind() == ElementKind::BulletList);
    assert_eq!(lists.len(), 1);
    assert_eq!(tree.element_children(lists[0]).count(), 2);
}

#[test]
fn test_code_block_is_preformatted() {
    let ctx = import("```\nlet x = 1;\n```\n");
    let tree = ctx.tree().unwrap();
    let blocks = tree.find_descendants(tree.root(), |n| n.kind() == ElementKind::Preformatted);
    assert_eq!(blocks.len(), 1);
    assert_eq!(tree.text_content(blocks[0]), "let x = 1;");
}

#[test]
fn test_links_survive_import() {
    let ctx = import("[docs](https://example.com/docs)");
    assert_eq!(ctx.markdown().unwrap(), "[docs](https://example.com/docs)");
    assert_eq!(
        ctx.entities().unwrap()["urls"][0]["expandedUrl"],
        "https://example.com/docs"
    );
}
