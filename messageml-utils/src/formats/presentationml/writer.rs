//! Compact XML output
//!
//! No indentation or newlines are added: text nodes are written exactly as
//! they appear in the tree, so the emitted document parses back to the same
//! content.

use crate::error::{MessageMLError, Result};
use std::borrow::Cow;

/// How an attribute value is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// Double quotes, `"` escaped
    Standard,
    /// Single quotes with `"` kept literal, so embedded JSON stays readable
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: &'static str,
    pub value: String,
    pub quoting: Quoting,
}

impl XmlAttribute {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        XmlAttribute {
            name,
            value: value.into(),
            quoting: Quoting::Standard,
        }
    }

    pub fn json(name: &'static str, value: impl Into<String>) -> Self {
        XmlAttribute {
            name,
            value: value.into(),
            quoting: Quoting::Json,
        }
    }
}

#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    open: Vec<&'static str>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, tag: &'static str, attributes: &[XmlAttribute]) {
        self.write_tag(tag, attributes);
        self.out.push('>');
        self.open.push(tag);
    }

    /// Self-closing element
    pub fn empty(&mut self, tag: &'static str, attributes: &[XmlAttribute]) {
        self.write_tag(tag, attributes);
        self.out.push_str("/>");
    }

    pub fn end(&mut self) -> Result<()> {
        let tag = self
            .open
            .pop()
            .ok_or_else(|| MessageMLError::Processing("closing tag without an open element".into()))?;
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        Ok(())
    }

    pub fn text(&mut self, text: &str) {
        self.out.push_str(&escape_text(text));
    }

    pub fn finish(self) -> Result<String> {
        match self.open.last() {
            Some(tag) => Err(MessageMLError::Processing(format!(
                "element \"{tag}\" was never closed"
            ))),
            None => Ok(self.out),
        }
    }

    fn write_tag(&mut self, tag: &str, attributes: &[XmlAttribute]) {
        self.out.push('<');
        self.out.push_str(tag);
        for attr in attributes {
            let quote = match attr.quoting {
                Quoting::Standard => '"',
                Quoting::Json => '\'',
            };
            self.out.push(' ');
            self.out.push_str(attr.name);
            self.out.push('=');
            self.out.push(quote);
            self.out.push_str(&escape_attribute(&attr.value, attr.quoting));
            self.out.push(quote);
        }
    }
}

pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, |c| match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        _ => None,
    })
}

pub fn escape_attribute(value: &str, quoting: Quoting) -> Cow<'_, str> {
    escape(value, |c| match (c, quoting) {
        ('<', _) => Some("&lt;"),
        ('>', _) => Some("&gt;"),
        ('&', _) => Some("&amp;"),
        ('"', Quoting::Standard) => Some("&quot;"),
        ('\'', Quoting::Json) => Some("&apos;"),
        // Literal newlines and tabs in attributes are normalized away by parsers.
        ('\n', _) => Some("&#10;"),
        ('\r', _) => Some("&#13;"),
        ('\t', _) => Some("&#9;"),
        _ => None,
    })
}

fn escape<F>(input: &str, replacement: F) -> Cow<'_, str>
where
    F: Fn(char) -> Option<&'static str>,
{
    if !input.chars().any(|c| replacement(c).is_some()) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match replacement(c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}
