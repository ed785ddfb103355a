//! Markdown import (CommonMark → authoring tree)
//!
//! Top-level paragraphs are not wrapped: their inline content goes straight
//! into the container and consecutive paragraphs are separated by a `br`, so
//! `Hello\n\nworld!` becomes `Hello<br/>world!`. The finished tree is
//! validated like any parsed document.

use crate::elements::{Dialect, ElementKind, NodeId, Tree};
use crate::error::Result;
use crate::options::ParseOptions;
use crate::parser;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use log::debug;

/// Parse Markdown into a validated MessageML tree
pub fn parse_from_markdown(source: &str, options: &ParseOptions) -> Result<Tree> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &default_comrak_options());

    let mut tree = Tree::new(Dialect::MessageMl);
    let root_id = tree.root();
    collect_blocks(&mut tree, root_id, root);
    debug!("imported {} nodes from markdown", tree.len());
    parser::validate_tree(&tree, options)?;
    Ok(tree)
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.autolink = true;
    options
}

fn append(tree: &mut Tree, parent: NodeId, kind: ElementKind) -> NodeId {
    tree.append(parent, kind, Dialect::MessageMl)
}

fn collect_blocks<'a>(tree: &mut Tree, parent: NodeId, container: &'a AstNode<'a>) {
    let mut after_paragraph = false;
    for child in container.children() {
        let data = child.data.borrow();
        let is_paragraph = matches!(data.value, NodeValue::Paragraph);
        match &data.value {
            NodeValue::Paragraph => {
                if after_paragraph {
                    append(tree, parent, ElementKind::LineBreak);
                }
                collect_inlines(tree, parent, child);
            }
            NodeValue::Heading(heading) => {
                let id = append(tree, parent, ElementKind::Heading(heading.level.clamp(1, 6)));
                collect_inlines(tree, id, child);
            }
            NodeValue::List(list) => {
                let kind = match list.list_type {
                    ListType::Ordered => ElementKind::OrderedList,
                    ListType::Bullet => ElementKind::BulletList,
                };
                let id = append(tree, parent, kind);
                for item in child.children() {
                    let item_id = append(tree, id, ElementKind::ListItem);
                    collect_blocks(tree, item_id, item);
                }
            }
            NodeValue::CodeBlock(code) => {
                let id = append(tree, parent, ElementKind::Preformatted);
                let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
                tree.append_text(id, literal);
            }
            NodeValue::ThematicBreak => {
                append(tree, parent, ElementKind::HorizontalRule);
            }
            NodeValue::HtmlBlock(html) => {
                tree.append_text(parent, html.literal.trim_end());
            }
            _ => collect_blocks(tree, parent, child),
        }
        after_paragraph = is_paragraph;
    }
}

fn collect_inlines<'a>(tree: &mut Tree, parent: NodeId, node: &'a AstNode<'a>) {
    for child in node.children() {
        let data = child.data.borrow();
        match &data.value {
            NodeValue::Text(text) => {
                tree.append_text(parent, text.as_str());
            }
            NodeValue::SoftBreak | NodeValue::LineBreak => {
                append(tree, parent, ElementKind::LineBreak);
            }
            NodeValue::Strong => {
                let id = append(tree, parent, ElementKind::Bold);
                collect_inlines(tree, id, child);
            }
            NodeValue::Emph => {
                let id = append(tree, parent, ElementKind::Italic);
                collect_inlines(tree, id, child);
            }
            NodeValue::Code(code) => {
                let id = append(tree, parent, ElementKind::Code);
                tree.append_text(id, code.literal.as_str());
            }
            NodeValue::Link(link) => {
                let id = append(tree, parent, ElementKind::Link);
                tree.node_mut(id).attributes_mut().set("href", link.url.as_str());
                collect_inlines(tree, id, child);
            }
            NodeValue::Image(link) => {
                let id = append(tree, parent, ElementKind::Image);
                tree.node_mut(id).attributes_mut().set("src", link.url.as_str());
            }
            NodeValue::HtmlInline(html) => {
                tree.append_text(parent, html.as_str());
            }
            _ => collect_inlines(tree, parent, child),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tree: &Tree, id: NodeId) -> Vec<ElementKind> {
        tree.children(id).iter().map(|c| tree.kind(*c)).collect()
    }

    #[test]
    fn test_paragraphs_are_separated_by_breaks() {
        let tree = parse_from_markdown("Hello\n\nworld!", &ParseOptions::default()).unwrap();
        let root_kinds = kinds(&tree, tree.root());
        assert_eq!(root_kinds[..2], [ElementKind::Text, ElementKind::LineBreak]);
        assert_eq!(tree.count_children_of(tree.root(), ElementKind::LineBreak), 1);
        assert_eq!(tree.text_content(tree.root()), "Helloworld!");
    }

    #[test]
    fn test_inline_markup() {
        let tree = parse_from_markdown("**bold** _it_ `x` [site](https://example.com)", &ParseOptions::default())
            .unwrap();
        let root_kinds = kinds(&tree, tree.root());
        assert!(root_kinds.contains(&ElementKind::Bold));
        assert!(root_kinds.contains(&ElementKind::Italic));
        assert!(root_kinds.contains(&ElementKind::Code));
        let link = tree.find_descendants(tree.root(), |n| n.kind() == ElementKind::Link)[0];
        assert_eq!(tree.node(link).attribute("href"), Some("https://example.com"));
    }

    #[test]
    fn test_lists_and_code_blocks() {
        let tree = parse_from_markdown("- a\n- b\n\n```\nfn main() {}\n```\n", &ParseOptions::default())
            .unwrap();
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![ElementKind::BulletList, ElementKind::Preformatted]
        );
        let pre = tree.children(tree.root())[1];
        assert_eq!(tree.text_content(pre), "fn main() {}");
    }
}
