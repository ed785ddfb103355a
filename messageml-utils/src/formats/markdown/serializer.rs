//! Markdown serialization of the intermediate node graph
//!
//! Blocks force a line break on both sides; a break is only inserted when the
//! output does not already end with one, so nested blocks never stack blank
//! lines. Trailing line breaks are dropped from the final text.

use super::nodes::{Document, List, MarkdownNode};

pub const FORM_HEADER: &str = "\nSymphony Form (log into desktop client to answer):\n---\n";
pub const FORM_FOOTER: &str = "\n---\n";

pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    write_all(&mut out, &doc.children);
    out.truncate(out.trim_end_matches('\n').len());
    out
}

fn write_all(out: &mut String, nodes: &[MarkdownNode]) {
    for node in nodes {
        write(out, node);
    }
}

fn write(out: &mut String, node: &MarkdownNode) {
    match node {
        MarkdownNode::Text(text) => out.push_str(text),
        MarkdownNode::Strong(children) => wrap(out, "**", children),
        MarkdownNode::Emphasis(children) => wrap(out, "_", children),
        MarkdownNode::Code(code) => {
            out.push('`');
            out.push_str(code);
            out.push('`');
        }
        MarkdownNode::HardBreak => out.push('\n'),
        MarkdownNode::Keyword { sigil, tag } => {
            out.push(*sigil);
            out.push_str(tag);
        }
        MarkdownNode::Mention(name) => {
            out.push('@');
            out.push_str(name);
        }
        MarkdownNode::Link { href, children } => {
            out.push('[');
            if children.is_empty() {
                out.push_str(href);
            } else {
                write_all(out, children);
            }
            out.push_str("](");
            out.push_str(href);
            out.push(')');
        }
        MarkdownNode::Image(src) => {
            out.push_str("![](");
            out.push_str(src);
            out.push(')');
        }
        MarkdownNode::Group(children) => write_all(out, children),
        MarkdownNode::Block(children) => {
            ensure_newline(out);
            write_all(out, children);
            ensure_newline(out);
        }
        MarkdownNode::CodeBlock(code) => {
            ensure_newline(out);
            out.push_str("```\n");
            out.push_str(code);
            ensure_newline(out);
            out.push_str("```\n");
        }
        MarkdownNode::Rule => {
            ensure_newline(out);
            out.push_str("---\n");
        }
        MarkdownNode::List(list) => write_list(out, list),
        MarkdownNode::Table(rows) => {
            ensure_newline(out);
            for row in rows {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| {
                        let mut text = String::new();
                        write_all(&mut text, cell);
                        text.trim().to_string()
                    })
                    .collect();
                out.push_str(&cells.join(" | "));
                out.push('\n');
            }
        }
        MarkdownNode::Form(children) => {
            out.push_str(FORM_HEADER);
            write_all(out, children);
            out.push_str(FORM_FOOTER);
        }
        MarkdownNode::Control { name, detail } => {
            out.push('(');
            out.push_str(name);
            if let Some(detail) = detail {
                out.push(':');
                out.push_str(detail);
            }
            out.push(')');
        }
        MarkdownNode::Dropdown {
            placeholder,
            options,
        } => {
            out.push_str("(Dropdown");
            if let Some(placeholder) = placeholder {
                out.push(':');
                out.push_str(placeholder);
            }
            out.push(')');
            for option in options {
                out.push_str("\n- ");
                out.push_str(option);
            }
        }
    }
}

fn write_list(out: &mut String, list: &List) {
    ensure_newline(out);
    for (index, item) in list.items.iter().enumerate() {
        if list.ordered {
            out.push_str(&format!("{}. ", index + 1));
        } else {
            out.push_str("- ");
        }
        write_all(out, item);
        ensure_newline(out);
    }
}

fn wrap(out: &mut String, marker: &str, children: &[MarkdownNode]) {
    out.push_str(marker);
    write_all(out, children);
    out.push_str(marker);
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> MarkdownNode {
        MarkdownNode::Text(s.to_string())
    }

    #[test]
    fn test_blocks_do_not_stack_newlines() {
        let doc = Document {
            children: vec![
                MarkdownNode::Block(vec![text("one")]),
                MarkdownNode::Block(vec![MarkdownNode::Block(vec![text("two")])]),
            ],
        };
        assert_eq!(serialize(&doc), "one\ntwo");
    }

    #[test]
    fn test_ordered_list_numbers_items() {
        let doc = Document {
            children: vec![MarkdownNode::List(List {
                ordered: true,
                items: vec![vec![text("a")], vec![MarkdownNode::Strong(vec![text("b")])]],
            })],
        };
        assert_eq!(serialize(&doc), "1. a\n2. **b**");
    }

    #[test]
    fn test_table_rows_join_cells() {
        let doc = Document {
            children: vec![MarkdownNode::Table(vec![
                vec![vec![text("h1")], vec![text("h2")]],
                vec![vec![text("a")], vec![text("b")]],
            ])],
        };
        assert_eq!(serialize(&doc), "h1 | h2\na | b");
    }

    #[test]
    fn test_controls_and_dropdown() {
        let doc = Document {
            children: vec![
                MarkdownNode::Control {
                    name: "Text Field",
                    detail: None,
                },
                MarkdownNode::Dropdown {
                    placeholder: Some("Pick".to_string()),
                    options: vec!["One".to_string(), "Two".to_string()],
                },
            ],
        };
        assert_eq!(serialize(&doc), "(Text Field)(Dropdown:Pick)\n- One\n- Two");
    }
}
