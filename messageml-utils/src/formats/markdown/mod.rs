//! Markdown format
//!
//! Output for plain-text clients, and CommonMark import through `comrak`.
//!
//! # Element Mapping Table
//!
//! | MessageML              | Markdown export                     | Markdown import          |
//! |------------------------|-------------------------------------|--------------------------|
//! | `b`, `h1`-`h6`         | `**text**`                          | strong → `b`, `#` → `hN` |
//! | `i`                    | `_text_`                            | emphasis → `i`           |
//! | `code` / `pre`         | `` `code` `` / fenced block         | inline code / code block |
//! | `br`                   | newline                             | soft and hard breaks     |
//! | `ul`, `ol`             | `- item` / `1. item`                | lists                    |
//! | `a`, `img`             | `[text](href)`, `![](src)`          | links, images            |
//! | `hash`, `cash`         | `#tag`, `$tag`                      | not recognized           |
//! | `mention`              | `@Pretty Name`                      | not recognized           |
//! | `table`                | one line per row, cells ` \| `      | not recognized           |
//! | `form` and controls    | `(Button:Go)`-style placeholders    | not recognized           |
//!
//! # Lossy Conversions
//!
//! Export drops every attribute except link targets and image sources.
//! Import never produces entities or forms; `#tag` stays plain text.

pub mod nodes;
pub mod parser;
pub mod serializer;

use crate::elements::Tree;
use crate::entity;
use crate::error::Result;
use crate::format::Format;
use crate::parser::ParseContext;

/// Render a tree as Markdown
pub fn to_markdown(tree: &Tree) -> String {
    serializer::serialize(&nodes::from_tree(tree))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark text for plain-text clients"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, ctx: &mut ParseContext<'_>) -> Result<Tree> {
        let mut tree = parser::parse_from_markdown(source, ctx.options)?;
        entity::allocate_ids(&mut tree, &mut *ctx.allocator);
        Ok(tree)
    }

    fn serialize(&self, tree: &Tree) -> Result<String> {
        Ok(to_markdown(tree))
    }
}
