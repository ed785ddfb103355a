//! PresentationML structures that have no tag of their own

use super::{class_tokens, invalid_content, Builder, Wrapper};
use crate::elements::{attributes, is_shorthand_tag, ElementKind, NodeId};
use crate::error::{MessageMLError, Result};
use roxmltree::Node as XmlNode;

/// Marks a `div` inserted by the renderer around a labelled control
pub const GENERATED_ATTRIBUTE: &str = "data-generated";
pub const INFO_HINT_CLASS: &str = "info-hint";

pub(super) fn build(builder: &mut Builder<'_>, source: XmlNode<'_, '_>, parent: NodeId) -> Result<()> {
    let tag = source.tag_name().name();
    if is_shorthand_tag(tag) {
        return Err(MessageMLError::structure(format!(
            "Shorthand tag \"{tag}\" is not allowed in PresentationML"
        )));
    }
    let wrapped = builder.wrapper.is_some();
    match tag {
        "div" if source.attribute(GENERATED_ATTRIBUTE) == Some("true") => unwrap_generated(builder, source, parent),
        "div" => build_div(builder, source, parent, wrapped),
        "span" => builder.element(source, parent, ElementKind::Span, &[]),
        "input" => build_input(builder, source, parent, wrapped),
        _ => {
            let kind = ElementKind::from_presentationml_tag(tag).ok_or_else(|| invalid_content(tag))?;
            builder.element(source, parent, kind, consumed_for(kind, wrapped))
        }
    }
}

/// Structural attributes that never reach the attribute table.
///
/// The `id` of a labelled control is the target of its generated label, so it
/// is only structural inside a generated wrapper; anywhere else the attribute
/// table rejects it.
fn consumed_for(kind: ElementKind, wrapped: bool) -> &'static [&'static str] {
    match (kind.presentation_class(None).is_some(), kind.is_labelled() && wrapped) {
        (true, true) => &["class", "id"],
        (true, false) => &["class"],
        (false, true) => &["id"],
        (false, false) => &[],
    }
}

fn build_div(builder: &mut Builder<'_>, source: XmlNode<'_, '_>, parent: NodeId, wrapped: bool) -> Result<()> {
    let classes = class_tokens(source);
    let marker = classes
        .iter()
        .enumerate()
        .find_map(|(index, class)| ElementKind::from_presentation_class(class).map(|kind| (index, kind)));
    let Some((index, kind)) = marker else {
        return builder.element(source, parent, ElementKind::Div, &[]);
    };
    let residual: Vec<&str> = classes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, class)| *class)
        .collect();
    let residual = residual.join(" ");

    if matches!(kind, ElementKind::Checkbox | ElementKind::Radio) {
        if !residual.is_empty() {
            return Err(attributes::not_allowed(kind, "class"));
        }
        return build_choice(builder, source, parent, kind);
    }

    let id = builder.open(parent, kind)?;
    if !residual.is_empty() {
        builder.set_attribute(id, "class", &residual)?;
    }
    builder.build_attributes(source, id, consumed_for(kind, wrapped))?;
    builder.build_children(source, id)?;
    builder.finish(id)
}

/// `<input type="text">` is a text field, `<input type="date">` a date picker
fn build_input(builder: &mut Builder<'_>, source: XmlNode<'_, '_>, parent: NodeId, wrapped: bool) -> Result<()> {
    let kind = match source.attribute("type") {
        Some("text") => ElementKind::TextField,
        Some("date") => ElementKind::DatePicker,
        _ => {
            return Err(MessageMLError::attribute(
                "Attribute \"type\" of element \"input\" can only be one of the following values: [text, date]",
            ))
        }
    };
    let consumed: &[&str] = match (kind, wrapped) {
        (ElementKind::TextField, true) => &["type", "id", "value"],
        (ElementKind::TextField, false) => &["type", "value"],
        (_, true) => &["type", "id"],
        (_, false) => &["type"],
    };
    let id = builder.open(parent, kind)?;
    builder.build_attributes(source, id, consumed)?;
    if kind == ElementKind::TextField {
        if let Some(value) = source.attribute("value") {
            builder.tree.append_text(id, value);
        }
    }
    builder.build_children(source, id)?;
    builder.finish(id)
}

/// `<div class="checkbox-group"><input type="checkbox" .../><label>text</label></div>`
fn build_choice(
    builder: &mut Builder<'_>,
    source: XmlNode<'_, '_>,
    parent: NodeId,
    kind: ElementKind,
) -> Result<()> {
    let malformed = || {
        MessageMLError::structure(format!(
            "Invalid PresentationML for the \"{}\" element",
            kind.messageml_tag()
        ))
    };
    if let Some(attr) = source.attributes().find(|a| a.name() != "class") {
        return Err(attributes::not_allowed(kind, attr.name()));
    }
    let input_type = if kind == ElementKind::Checkbox { "checkbox" } else { "radio" };
    let mut elements = source.children().filter(|n| n.is_element());
    let input = elements
        .next()
        .filter(|n| n.tag_name().name() == "input" && n.attribute("type") == Some(input_type))
        .ok_or_else(malformed)?;
    let label = elements.next();
    if label.is_some_and(|l| l.tag_name().name() != "label") || elements.next().is_some() {
        return Err(malformed());
    }

    let id = builder.open(parent, kind)?;
    builder.build_attributes(input, id, &["type"])?;
    if let Some(label) = label {
        builder.build_children(label, id)?;
    }
    builder.finish(id)
}

/// Fold a generated label and tooltip back into the control they describe
fn unwrap_generated(builder: &mut Builder<'_>, source: XmlNode<'_, '_>, parent: NodeId) -> Result<()> {
    let mut wrapper = Wrapper::default();
    let mut control = None;
    for child in source.children().filter(|n| n.is_element()) {
        let tag = child.tag_name().name();
        if tag == "label" && wrapper.label.is_none() && control.is_none() {
            let text: String = child
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            wrapper.label = Some(text);
        } else if tag == "span" && class_tokens(child).contains(&INFO_HINT_CLASS) {
            wrapper.title = child.attribute("data-title").map(str::to_string);
        } else if control.is_none() {
            control = Some(child);
        } else {
            return Err(invalid_content(tag));
        }
    }
    let control = control.ok_or_else(|| {
        MessageMLError::structure("Invalid PresentationML: generated wrapper without a form control")
    })?;
    builder.wrapper = Some(wrapper);
    build(builder, control, parent)
}
