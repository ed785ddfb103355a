//! Element tree to PresentationML
//!
//! Attributes are emitted in stored order under their presentation names;
//! authoring-only attributes are dropped or folded into generated structure:
//!
//! - shorthand kinds become a `div` carrying a class marker,
//! - keywords and mentions become `<span class="entity" data-entity-id="...">`
//!   with the rendered text as content,
//! - a labelled control with a `label` or `title` is wrapped in a generated
//!   `div` holding a `label` and an `info-hint` tooltip that point at the
//!   control through a fresh element id.

use super::writer::{XmlAttribute, XmlWriter};
use crate::elements::{attributes, ElementKind, EntityData, Node, NodeId, Tree, ValueKind};
use crate::entity::{ENTITY_CLASS, ENTITY_ID_ATTRIBUTE};
use crate::error::{MessageMLError, Result};
use crate::ids::IdAllocator;
use crate::parser::{GENERATED_ATTRIBUTE, INFO_HINT_CLASS};
use log::trace;

/// Render `tree` as a PresentationML document
pub fn serialize(tree: &Tree, version: &str, ids: &mut dyn IdAllocator) -> Result<String> {
    let mut renderer = Renderer {
        tree,
        ids,
        writer: XmlWriter::new(),
    };
    renderer.writer.start(
        "div",
        &[
            XmlAttribute::new("data-format", "PresentationML"),
            XmlAttribute::new("data-version", version),
        ],
    );
    renderer.children(tree.root())?;
    renderer.writer.end()?;
    renderer.writer.finish()
}

struct Renderer<'a> {
    tree: &'a Tree,
    ids: &'a mut dyn IdAllocator,
    writer: XmlWriter,
}

impl Renderer<'_> {
    fn children(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        for child in tree.children(id) {
            self.node(*child)?;
        }
        Ok(())
    }

    fn node(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node(id);
        match node.kind() {
            ElementKind::Text => {
                self.writer.text(node.text().unwrap_or_default());
                Ok(())
            }
            ElementKind::HashTag | ElementKind::CashTag | ElementKind::Mention => self.entity(id),
            ElementKind::Span | ElementKind::Div if node.entity_id().is_some() => self.extension(id),
            ElementKind::Checkbox | ElementKind::Radio => self.choice(id),
            kind if kind.is_labelled() && (node.attribute("label").is_some() || node.attribute("title").is_some()) => {
                self.wrapped(id)
            }
            _ => self.element(id, None),
        }
    }

    fn element(&mut self, id: NodeId, element_id: Option<String>) -> Result<()> {
        let tree = self.tree;
        let node = tree.node(id);
        let kind = node.kind();
        let mut attrs = Vec::new();
        let tag = match kind {
            ElementKind::TextField => {
                attrs.push(XmlAttribute::new("type", "text"));
                "input"
            }
            ElementKind::DatePicker => {
                attrs.push(XmlAttribute::new("type", "date"));
                "input"
            }
            _ => node.presentation_tag(),
        };
        let marker = kind.presentation_class(tree.parent_kind(id));
        if let Some(marker) = marker {
            attrs.push(XmlAttribute::new("class", join_class(marker, node.attribute("class"))));
        }
        if let Some(element_id) = element_id {
            attrs.push(XmlAttribute::new("id", element_id));
        }
        attrs.extend(mapped_attributes(node, marker.is_some())?);
        if kind == ElementKind::TextField {
            let value = tree.text_content(id);
            if !value.is_empty() {
                attrs.push(XmlAttribute::new("value", value));
            }
        }

        if kind.is_void() {
            self.writer.empty(tag, &attrs);
            return Ok(());
        }
        self.writer.start(tag, &attrs);
        self.children(id)?;
        self.writer.end()
    }

    /// Keyword or mention: the rendered text stands in for the authoring attributes
    fn entity(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node(id);
        let kind = node.kind();
        let entity_id = node.entity_id().ok_or_else(|| {
            MessageMLError::Processing(format!(
                "element \"{}\" has no entity identifier",
                kind.messageml_tag()
            ))
        })?;
        let text = match (kind, node.entity_data()) {
            (ElementKind::HashTag, _) => format!("#{}", node.attribute("tag").unwrap_or_default()),
            (ElementKind::CashTag, _) => format!("${}", node.attribute("tag").unwrap_or_default()),
            (_, Some(EntityData::User(user))) => format!("@{}", user.pretty_name),
            _ => format!("@{}", node.attribute("uid").unwrap_or_default()),
        };
        self.writer.start(
            node.presentation_tag(),
            &[
                XmlAttribute::new("class", ENTITY_CLASS),
                XmlAttribute::new(ENTITY_ID_ATTRIBUTE, entity_id),
            ],
        );
        self.writer.text(&text);
        self.writer.end()
    }

    /// A `span` or `div` bound to an extension entity
    fn extension(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node(id);
        let mut attrs = vec![
            XmlAttribute::new("class", join_class(ENTITY_CLASS, node.attribute("class"))),
            XmlAttribute::new(ENTITY_ID_ATTRIBUTE, node.entity_id().unwrap_or_default()),
        ];
        attrs.extend(mapped_attributes(node, true)?);
        self.writer.start(node.presentation_tag(), &attrs);
        self.children(id)?;
        self.writer.end()
    }

    /// `<div class="checkbox-group"><input type="checkbox" .../><label>text</label></div>`
    fn choice(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        let node = tree.node(id);
        let kind = node.kind();
        let (marker, input_type) = match kind {
            ElementKind::Checkbox => ("checkbox-group", "checkbox"),
            _ => ("radio-group", "radio"),
        };
        self.writer.start("div", &[XmlAttribute::new("class", marker)]);
        let mut attrs = vec![XmlAttribute::new("type", input_type)];
        attrs.extend(mapped_attributes(node, false)?);
        self.writer.empty("input", &attrs);
        if !node.children().is_empty() {
            self.writer.start("label", &[]);
            self.children(id)?;
            self.writer.end()?;
        }
        self.writer.end()
    }

    fn wrapped(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node(id);
        let tag = node.kind().messageml_tag();
        let element_id = self.ids.element_id(tag);
        trace!("wrapping <{tag}> as {element_id}");

        self.writer.start(
            "div",
            &[
                XmlAttribute::new("class", format!("{tag}-group")),
                XmlAttribute::new(GENERATED_ATTRIBUTE, "true"),
            ],
        );
        if let Some(label) = node.attribute("label") {
            self.writer
                .start("label", &[XmlAttribute::new("for", element_id.clone())]);
            self.writer.text(label);
            self.writer.end()?;
        }
        if let Some(title) = node.attribute("title") {
            self.writer.start(
                "span",
                &[
                    XmlAttribute::new("class", INFO_HINT_CLASS),
                    XmlAttribute::new("data-target-id", element_id.clone()),
                    XmlAttribute::new("data-title", title),
                ],
            );
            self.writer.end()?;
        }
        self.element(id, Some(element_id))?;
        self.writer.end()
    }
}

/// Stored attributes under their presentation names, in stored order
fn mapped_attributes(node: &Node, skip_class: bool) -> Result<Vec<XmlAttribute>> {
    let kind = node.kind();
    let mut out = Vec::with_capacity(node.attributes().len());
    for (name, value) in node.attributes().iter() {
        if skip_class && name == "class" {
            continue;
        }
        let Some(rule) = attributes::rule(kind, name) else {
            continue;
        };
        let Some(presentation_name) = rule.presentation_name() else {
            continue;
        };
        let attr = match rule.value {
            ValueKind::Json => XmlAttribute::json(presentation_name, value),
            ValueKind::Text | ValueKind::Integer => XmlAttribute::new(presentation_name, value),
        };
        out.push(attr);
    }
    Ok(out)
}

fn join_class(marker: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) if !extra.is_empty() => format!("{marker} {extra}"),
        _ => marker.to_string(),
    }
}
