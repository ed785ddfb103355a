//! Source document to element tree.
//!
//! The parser reads either XML dialect with `roxmltree` and builds the tree
//! depth-first. For each source element it resolves the kind, applies the
//! kind's defaults, dispatches every attribute through the attribute table,
//! builds the children and finally validates the node. The first violation
//! aborts the parse; no partial tree is returned.
//!
//! Once every node is built and validated the tree is finalized: keywords and
//! mentions without an identifier get one from the allocator.
//!
//! PresentationML-only structures (class markers, generated label wrappers,
//! `input` types, checkbox groups) are recognized in [`presentation`].

mod presentation;

pub use presentation::{GENERATED_ATTRIBUTE, INFO_HINT_CLASS};

use crate::elements::attributes;
use crate::elements::{Dialect, ElementKind, EntityData, NodeId, Tree, ValueKind};
use crate::entity::{self, EntitySchemas, ResolvedEntity, ENTITY_CLASS, ENTITY_ID_ATTRIBUTE};
use crate::error::{MessageMLError, Result};
use crate::ids::IdAllocator;
use crate::options::ParseOptions;
use crate::users::UserDirectory;
use crate::validate::{self, dates};
use log::{debug, info};
use roxmltree::{Node as XmlNode, NodeType};
use serde_json::{Map, Value};

/// Collaborators for one parse
pub struct ParseContext<'a> {
    pub options: &'a ParseOptions,
    /// Entity JSON the presentation references resolve against
    pub entity_json: &'a Map<String, Value>,
    pub allocator: &'a mut dyn IdAllocator,
    pub users: &'a dyn UserDirectory,
    pub schemas: &'a EntitySchemas,
}

/// Parse and validate a MessageML or PresentationML document
pub fn parse(source: &str, ctx: &mut ParseContext<'_>) -> Result<Tree> {
    let document = roxmltree::Document::parse(source)
        .map_err(|e| MessageMLError::Processing(format!("XML parsing error: {e}")))?;
    let root = document.root_element();
    let dialect = detect_dialect(root, ctx.options)?;
    debug!("parsing {dialect} document ({} bytes)", source.len());

    let mut builder = Builder {
        tree: Tree::new(dialect),
        dialect,
        options: ctx.options,
        entity_json: ctx.entity_json,
        users: ctx.users,
        schemas: ctx.schemas,
        wrapper: None,
    };
    builder.check_root(root)?;
    let root_id = builder.tree.root();
    builder.build_children(root, root_id)?;
    validate::validate(&builder.tree, root_id, &ctx.options.limits)?;

    let mut tree = builder.tree;
    entity::allocate_ids(&mut tree, &mut *ctx.allocator);
    debug!("parsed {} nodes", tree.len());
    Ok(tree)
}

/// Validate every node of a tree built outside the XML parser, children first
pub fn validate_tree(tree: &Tree, options: &ParseOptions) -> Result<()> {
    for id in tree.descendants(tree.root()).into_iter().rev() {
        validate::validate(tree, id, &options.limits)?;
    }
    validate::validate(tree, tree.root(), &options.limits)
}

fn detect_dialect(root: XmlNode<'_, '_>, options: &ParseOptions) -> Result<Dialect> {
    let tag = root.tag_name().name();
    let found = match tag {
        "messageML" => Dialect::MessageMl,
        "div" => Dialect::PresentationMl,
        _ => {
            return Err(MessageMLError::structure(format!(
                "Root tag must be <messageML> or <div>, found <{tag}>"
            )))
        }
    };
    match options.input_format.dialect() {
        Some(declared) if declared != found => Err(MessageMLError::structure(format!(
            "Expected a {declared} document but the root element is <{tag}>"
        ))),
        _ => Ok(found),
    }
}

pub(crate) fn invalid_content(tag: &str) -> MessageMLError {
    MessageMLError::structure(format!("Invalid MessageML content at element \"{tag}\""))
}

fn class_tokens<'x>(source: XmlNode<'x, '_>) -> Vec<&'x str> {
    source
        .attribute("class")
        .map(|c| c.split_whitespace().collect())
        .unwrap_or_default()
}

fn is_entity_reference(source: XmlNode<'_, '_>) -> bool {
    matches!(source.tag_name().name(), "span" | "div")
        && (source.has_attribute(ENTITY_ID_ATTRIBUTE) || class_tokens(source).contains(&ENTITY_CLASS))
}

/// Label and tooltip read from a generated wrapper, waiting for their control
#[derive(Debug, Default)]
struct Wrapper {
    label: Option<String>,
    title: Option<String>,
}

struct Builder<'a> {
    tree: Tree,
    dialect: Dialect,
    options: &'a ParseOptions,
    entity_json: &'a Map<String, Value>,
    users: &'a dyn UserDirectory,
    schemas: &'a EntitySchemas,
    wrapper: Option<Wrapper>,
}

impl Builder<'_> {
    fn check_root(&self, root: XmlNode<'_, '_>) -> Result<()> {
        match self.dialect {
            Dialect::MessageMl => match root.attributes().next() {
                Some(attr) => Err(attributes::not_allowed(ElementKind::MessageMl, attr.name())),
                None => Ok(()),
            },
            Dialect::PresentationMl => {
                for attr in root.attributes() {
                    if !matches!(attr.name(), "data-format" | "data-version") {
                        return Err(attributes::not_allowed(ElementKind::MessageMl, attr.name()));
                    }
                }
                if root.attribute("data-format") != Some("PresentationML") {
                    return Err(MessageMLError::attribute(
                        "The attribute \"data-format\" of the root element must be \"PresentationML\"",
                    ));
                }
                let expected = self.options.presentationml_version.as_str();
                match root.attribute("data-version") {
                    Some(version) if version == expected => Ok(()),
                    Some(version) => Err(MessageMLError::attribute(format!(
                        "Unsupported PresentationML version \"{version}\", expected \"{expected}\""
                    ))),
                    None => Err(MessageMLError::attribute(
                        "The attribute \"data-version\" is required",
                    )),
                }
            }
        }
    }

    fn build_children(&mut self, source: XmlNode<'_, '_>, parent: NodeId) -> Result<()> {
        let skip_whitespace = self.tree.kind(parent).skips_whitespace();
        for child in source.children() {
            match child.node_type() {
                NodeType::Element => self.build_element(child, parent)?,
                NodeType::Text => {
                    let text = child.text().unwrap_or_default();
                    if skip_whitespace && text.trim().is_empty() {
                        continue;
                    }
                    self.tree.append_text(parent, text);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn build_element(&mut self, source: XmlNode<'_, '_>, parent: NodeId) -> Result<()> {
        if is_entity_reference(source) {
            return self.build_entity_reference(source, parent);
        }
        match self.dialect {
            Dialect::MessageMl => {
                let tag = source.tag_name().name();
                let kind = ElementKind::from_messageml_tag(tag, Some(self.tree.kind(parent)))
                    .filter(|kind| *kind != ElementKind::MessageMl)
                    .ok_or_else(|| invalid_content(tag))?;
                self.element(source, parent, kind, &[])
            }
            Dialect::PresentationMl => presentation::build(self, source, parent),
        }
    }

    /// The common path: open, attributes, children, finish
    fn element(
        &mut self,
        source: XmlNode<'_, '_>,
        parent: NodeId,
        kind: ElementKind,
        consumed: &[&str],
    ) -> Result<()> {
        let id = self.open(parent, kind)?;
        self.build_attributes(source, id, consumed)?;
        self.build_children(source, id)?;
        self.finish(id)
    }

    /// Create the node and apply its defaults
    fn open(&mut self, parent: NodeId, kind: ElementKind) -> Result<NodeId> {
        let parent_kind = self.tree.kind(parent);
        let id = self.tree.append(parent, kind, self.dialect);
        let attrs = self.tree.node_mut(id).attributes_mut();
        match kind {
            ElementKind::Button if parent_kind != ElementKind::UiAction => attrs.set("type", "action"),
            ElementKind::Checkbox | ElementKind::Radio => attrs.set("value", "on"),
            _ => {}
        }
        if let Some(wrapper) = self.wrapper.take() {
            if !kind.is_labelled() {
                return Err(MessageMLError::structure(format!(
                    "Element \"{}\" cannot be wrapped in a generated label",
                    kind.messageml_tag()
                )));
            }
            let attrs = self.tree.node_mut(id).attributes_mut();
            if let Some(label) = wrapper.label {
                attrs.set("label", label);
            }
            if let Some(title) = wrapper.title {
                attrs.set("title", title);
            }
        }
        Ok(id)
    }

    fn build_attributes(&mut self, source: XmlNode<'_, '_>, id: NodeId, consumed: &[&str]) -> Result<()> {
        for attr in source.attributes() {
            if consumed.contains(&attr.name()) {
                continue;
            }
            self.set_attribute(id, attr.name(), attr.value())?;
        }
        Ok(())
    }

    /// Dispatch one source attribute through the attribute table
    fn set_attribute(&mut self, id: NodeId, source_name: &str, raw: &str) -> Result<()> {
        let kind = self.tree.kind(id);
        let rule = attributes::accept(kind, self.dialect, source_name)
            .ok_or_else(|| attributes::not_allowed(kind, source_name))?;
        let mut value = rule.canonical_value(raw)?;
        if kind == ElementKind::Button && rule.name == "class" && value.contains("-destructive") {
            info!("Button class cannot be a destructive one, replacing it accordingly.");
            if let Some(stripped) = value.strip_suffix("-destructive") {
                value = stripped.to_string();
            }
        }
        self.tree.node_mut(id).attributes_mut().set(rule.name, value);
        Ok(())
    }

    fn finish(&mut self, id: NodeId) -> Result<()> {
        if self.tree.kind(id) == ElementKind::Mention {
            self.resolve_mention(id)?;
        }
        validate::validate(&self.tree, id, &self.options.limits)?;
        self.normalize_json_attributes(id)
    }

    /// Date range attributes are stored in their typed presentation form
    fn normalize_json_attributes(&mut self, id: NodeId) -> Result<()> {
        let kind = self.tree.kind(id);
        for rule in attributes::rules_for(kind) {
            if rule.value != ValueKind::Json {
                continue;
            }
            let Some(raw) = self.tree.node(id).attribute(rule.name) else {
                continue;
            };
            let normalized = dates::presentation_json(rule.name, raw)?;
            self.tree.node_mut(id).attributes_mut().set(rule.name, normalized);
        }
        Ok(())
    }

    /// Look the mentioned user up, collapsing an `email` into the user's `uid`
    fn resolve_mention(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node(id);
        let user = if let Some(uid) = node.attribute("uid") {
            uid.parse::<i64>()
                .ok()
                .and_then(|uid| self.users.user_by_id(uid))
                .ok_or_else(|| lookup_failed(uid))?
        } else if let Some(email) = node.attribute("email") {
            self.users
                .user_by_email(email)
                .ok_or_else(|| lookup_failed(email))?
        } else {
            return Ok(());
        };
        let node = self.tree.node_mut(id);
        node.attributes_mut().remove("email");
        node.attributes_mut().set("uid", user.id.to_string());
        node.set_entity_data(EntityData::User(user));
        Ok(())
    }

    /// A `span`/`div` pointing into the entity JSON
    fn build_entity_reference(&mut self, source: XmlNode<'_, '_>, parent: NodeId) -> Result<()> {
        let entity_id = source.attribute(ENTITY_ID_ATTRIBUTE).ok_or_else(|| {
            MessageMLError::attribute(format!("The attribute \"{ENTITY_ID_ATTRIBUTE}\" is required"))
        })?;
        let residual_class: Vec<&str> = class_tokens(source)
            .into_iter()
            .filter(|token| *token != ENTITY_CLASS)
            .collect();
        let residual_class = residual_class.join(" ");
        let is_div = source.tag_name().name() == "div";

        let (kind, value) = match entity::resolve(self.entity_json, entity_id, self.schemas)? {
            ResolvedEntity::HashTag(tag) => (ElementKind::HashTag, ("tag", tag)),
            ResolvedEntity::CashTag(tag) => (ElementKind::CashTag, ("tag", tag)),
            ResolvedEntity::Mention(uid) => (ElementKind::Mention, ("uid", uid.to_string())),
            ResolvedEntity::Extension { payload, .. } => {
                let kind = if is_div { ElementKind::Div } else { ElementKind::Span };
                let id = self.open(parent, kind)?;
                if !residual_class.is_empty() {
                    self.set_attribute(id, "class", &residual_class)?;
                }
                self.build_attributes(source, id, &["class", ENTITY_ID_ATTRIBUTE])?;
                let node = self.tree.node_mut(id);
                node.set_entity_id(entity_id);
                node.set_entity_data(EntityData::Extension(payload));
                self.build_children(source, id)?;
                return self.finish(id);
            }
        };

        if !residual_class.is_empty() {
            return Err(attributes::not_allowed(kind, "class"));
        }
        if let Some(attr) = source
            .attributes()
            .find(|a| !matches!(a.name(), "class" | ENTITY_ID_ATTRIBUTE))
        {
            return Err(attributes::not_allowed(kind, attr.name()));
        }
        let id = self.open(parent, kind)?;
        let node = self.tree.node_mut(id);
        node.attributes_mut().set(value.0, value.1);
        node.set_entity_id(entity_id);
        if is_div {
            node.set_presentation_tag("div");
        }
        // The rendered text ("#tag", "@Name") is derived, not content.
        self.finish(id)
    }
}

fn lookup_failed(key: &str) -> MessageMLError {
    MessageMLError::entity(format!("Failed to lookup user \"{key}\""))
}
