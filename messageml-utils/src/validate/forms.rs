//! Forms, their controls, dialogs and UI actions

use super::Check;
use crate::elements::ElementKind::{self, *};
use crate::error::{MessageMLError, Result};
use regex::Regex;

pub const ACTION_TYPE: &str = "action";
pub const CANCEL_TYPE: &str = "cancel";
pub const RESET_TYPE: &str = "reset";

const BUTTON_CLASSES: &[&str] = &[
    "primary",
    "secondary",
    "tertiary",
    "destructive",
    "primary-destructive",
    "secondary-destructive",
    "primary-link",
    "destructive-link",
];
const BUTTON_TYPES: &[&str] = &[ACTION_TYPE, RESET_TYPE, CANCEL_TYPE];

const MAX_TEXT_LENGTH: i64 = 128;

pub fn form(check: &Check<'_>) -> Result<()> {
    check.not_ancestor(&[Form])?;
    for kind in [Checkbox, Radio] {
        check.at_most_descendants_of(kind, check.limits.max_form_children_per_type)?;
    }
    let id = check.required("id")?;
    if !check.tree.has_ancestor_of(check.id, &[Dialog]) {
        let has_action = check
            .tree
            .find_descendants(check.id, |n| n.kind() == Button)
            .into_iter()
            .any(|button| check.tree.node(button).attribute("type") == Some(ACTION_TYPE));
        if !has_action {
            return Err(MessageMLError::structure(format!(
                "The form with id '{id}' should have at least one action button"
            )));
        }
    }
    Ok(())
}

pub fn button(check: &Check<'_>) -> Result<()> {
    check.ancestor_in(&[Form, UiAction])?;
    if let Some(class) = check.attr("class") {
        if !BUTTON_CLASSES.contains(&class) {
            return Err(MessageMLError::attribute(
                "Attribute \"class\" must be \"primary\", \"secondary\", \"tertiary\" or \"destructive\" \
                 (\"primary-destructive\" and \"secondary-destructive\" are deprecated)",
            ));
        }
    }

    if check.tree.parent_kind(check.id) == Some(UiAction) {
        if check.attr("type").is_some() || check.attr("name").is_some() {
            return Err(MessageMLError::attribute(
                "Attributes \"type\" and \"name\" are not allowed on a button inside a UIAction.",
            ));
        }
        return Ok(());
    }

    let kind = check.attr("type").unwrap_or_default();
    if !BUTTON_TYPES.contains(&kind) {
        return Err(MessageMLError::attribute(
            "Attribute \"type\" must be \"action\", \"reset\" or \"cancel\"",
        ));
    }
    let blank_name = check.attr("name").map_or(true, |n| n.trim().is_empty());
    match kind {
        ACTION_TYPE if blank_name => {
            return Err(MessageMLError::attribute(
                "Attribute \"name\" is required for action buttons",
            ))
        }
        CANCEL_TYPE if blank_name => {
            return Err(MessageMLError::attribute(
                "Attribute \"name\" is required for cancel buttons",
            ))
        }
        RESET_TYPE if check.attr("name").is_some() => {
            return Err(MessageMLError::attribute(
                "Attribute \"name\" is allowed for action buttons only",
            ))
        }
        _ => {}
    }
    check.children_in(&[Text])?;
    check.contains_child_of(&[Text])
}

/// Checks shared by every control that submits a value
fn control(check: &Check<'_>) -> Result<()> {
    check.ancestor_in(&[Form])?;
    check.required("name")?;
    check.short_text("name")?;
    for flag in ["required", "disabled", "readonly"] {
        check.boolean(flag)?;
    }
    if check.kind.is_labelled() {
        check.short_text("label")?;
        check.short_text("title")?;
    }
    Ok(())
}

pub fn text_field(check: &Check<'_>) -> Result<()> {
    control(check)?;
    check.boolean("masked")?;
    check.children_in(&[Text])?;
    let min = bounded(check, "minlength")?;
    let max = bounded(check, "maxlength")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(MessageMLError::attribute(
                "The \"minlength\" attribute must be lower than the \"maxlength\" attribute",
            ));
        }
    }
    let initial = check.tree.text_content(check.id).chars().count() as i64;
    if initial > 0 && (min.is_some_and(|m| initial < m) || max.is_some_and(|m| initial > m)) {
        return Err(MessageMLError::attribute(format!(
            "The length of this text-field's initial value must be between {} and {}",
            min.unwrap_or(0),
            max.unwrap_or(MAX_TEXT_LENGTH)
        )));
    }
    pattern(check)
}

pub fn text_area(check: &Check<'_>) -> Result<()> {
    control(check)?;
    check.children_in(&[Text])?;
    for dimension in ["rows", "cols"] {
        if let Some(value) = check.attr(dimension) {
            if value.parse::<i64>().map_or(true, |n| n < 1) {
                return Err(MessageMLError::attribute(format!(
                    "Attribute \"{dimension}\" must be a positive integer"
                )));
            }
        }
    }
    pattern(check)
}

pub fn select(check: &Check<'_>) -> Result<()> {
    control(check)?;
    check.children_in(&[SelectOption])?;
    check.contains_child_of(&[SelectOption])?;
    let selected = check
        .tree
        .children(check.id)
        .iter()
        .filter(|option| check.tree.node(**option).attribute("selected") == Some("true"))
        .count();
    if selected > 1 {
        return Err(MessageMLError::attribute(
            "Element \"select\" can only have one selected \"option\"",
        ));
    }
    Ok(())
}

pub fn option(check: &Check<'_>) -> Result<()> {
    check.parent_in(&[Select])?;
    check.required("value")?;
    check.boolean("selected")?;
    check.children_in(&[Text])
}

pub fn choice(check: &Check<'_>) -> Result<()> {
    control(check)?;
    check.boolean("checked")?;
    check.phrasing()
}

pub fn person_selector(check: &Check<'_>) -> Result<()> {
    control(check)?;
    check.no_content()
}

pub fn dialog(check: &Check<'_>) -> Result<()> {
    check.not_ancestor(&[Dialog])?;
    check.required("id")?;
    check.one_of("width", &["small", "medium", "large", "full-width"])?;
    check.one_of("state", &["open", "close"])?;
    check.children_in(&[DialogTitle, DialogBody, DialogFooter])?;
    for part in [DialogTitle, DialogBody] {
        check.contains_child_of(&[part])?;
    }
    for part in [DialogTitle, DialogBody, DialogFooter] {
        check.at_most_children_of(part, 1)?;
    }
    Ok(())
}

pub fn ui_action(check: &Check<'_>) -> Result<()> {
    check.required("trigger")?;
    check.one_of("trigger", &["click"])?;
    check.required("action")?;
    check.one_of("action", &["open-dialog"])?;
    check.required("target-id")?;
    check.children_in(&[Button])?;
    if check.tree.children(check.id).len() != 1 {
        return Err(MessageMLError::structure(
            "The \"ui-action\" element must have exactly one child that is any of the following elements: [button].",
        ));
    }
    Ok(())
}

/// Every `ui-action` must open a dialog declared in the same message
pub fn check_dialog_targets(check: &Check<'_>) -> Result<()> {
    let dialog_ids: Vec<&str> = kinds_below(check, Dialog)
        .filter_map(|node| node.attribute("id"))
        .collect();
    for action in kinds_below(check, UiAction) {
        if let Some(target) = action.attribute("target-id") {
            if !dialog_ids.contains(&target) {
                return Err(MessageMLError::structure(format!(
                    "The target-id \"{target}\" of the \"ui-action\" does not match any dialog id"
                )));
            }
        }
    }
    Ok(())
}

fn kinds_below<'a>(
    check: &Check<'a>,
    kind: ElementKind,
) -> impl Iterator<Item = &'a crate::elements::Node> + 'a {
    let tree = check.tree;
    tree.find_descendants(check.id, move |n| n.kind() == kind)
        .into_iter()
        .map(move |id| tree.node(id))
}

fn bounded(check: &Check<'_>, name: &str) -> Result<Option<i64>> {
    match check.attr(name) {
        None => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if (0..=MAX_TEXT_LENGTH).contains(&n) => Ok(Some(n)),
            _ => Err(MessageMLError::attribute(format!(
                "The \"{name}\" attribute must be between 0 and {MAX_TEXT_LENGTH}"
            ))),
        },
    }
}

fn pattern(check: &Check<'_>) -> Result<()> {
    match check.attr("pattern") {
        Some(pattern) => {
            Regex::new(pattern).map_err(|_| {
                MessageMLError::attribute(format!(
                    "Attribute \"pattern\" contains an invalid regular expression: {pattern}"
                ))
            })?;
            Ok(())
        }
        None if check.attr("pattern-error-message").is_some() => Err(MessageMLError::attribute(
            "Attribute \"pattern-error-message\" cannot be used without attribute \"pattern\"",
        )),
        None => Ok(()),
    }
}
