//! Per-node validation.
//!
//! [`validate`] runs once for every node, right after the builder has attached
//! all of its children, so content-model checks see the complete subtree.
//! Checks are grouped by element family; form controls live in [`forms`] and
//! the date picker's date and range rules in [`dates`].

pub mod dates;
pub mod forms;

use crate::elements::{tag_list, ElementKind, Node, NodeId, Tree};
use crate::error::{MessageMLError, Result};
use crate::options::Limits;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Pattern a hashtag's `tag` must match, as shown in diagnostics
pub const HASHTAG_PATTERN: &str = r#"[\S]*[^\s!@#$%^&*()+=<>,./?`~:;'"\\|-]+[\S]*$"#;

// `HASHTAG_PATTERN` with `\s`/`\S` spelled out as ASCII whitespace only.
const HASHTAG_MATCHER: &str =
    r#"[^ \t\n\x0B\f\r]*[^ \t\n\x0B\f\r!@#$%^&*()+=<>,./?`~:;'"\\|-]+[^ \t\n\x0B\f\r]*$"#;

static HASHTAG_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(&format!("^(?:{HASHTAG_MATCHER})")).ok());

const UNSAFE_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

/// Validate one fully built node
pub fn validate(tree: &Tree, id: NodeId, limits: &Limits) -> Result<()> {
    use ElementKind::*;
    let check = Check::new(tree, id, limits);
    match check.kind {
        MessageMl => forms::check_dialog_targets(&check),
        Text | Span | Div | Paragraph => Ok(()),
        Bold | Italic | Code | Heading(_) | Preformatted => check.phrasing(),
        Link => {
            check.phrasing()?;
            check.url("href")
        }
        LineBreak | HorizontalRule => check.no_content(),
        Image => {
            check.no_content()?;
            check.url("src")
        }
        BulletList | OrderedList => check.children_in(&[ListItem]),
        ListItem => check.parent_in(&[BulletList, OrderedList]),
        Table => check.children_in(&[TableHeader, TableBody, TableFooter, TableRow]),
        TableHeader | TableBody | TableFooter => {
            check.parent_in(&[Table])?;
            check.children_in(&[TableRow])
        }
        TableRow => {
            check.parent_in(&[Table, TableHeader, TableBody, TableFooter])?;
            check.children_in(&[TableHeaderCell, TableCell])
        }
        TableHeaderCell | TableCell => check.parent_in(&[TableRow]),
        Card => check.children_in(&[CardHeader, CardBody]),
        CardHeader | CardBody => check.parent_in(&[Card, ExpandableCard]),
        ExpandableCard => {
            check.children_in(&[CardHeader, CardBody])?;
            check.required("state")?;
            check.one_of("state", &["collapsed", "cropped", "expanded"])
        }
        HashTag => {
            check.no_content()?;
            let tag = check.required("tag")?;
            let matches = HASHTAG_REGEX.as_ref().is_some_and(|re| re.is_match(tag));
            if !matches {
                return Err(MessageMLError::attribute(format!(
                    "Values of the attribute 'tag' for the element '{}' must match the pattern {HASHTAG_PATTERN}.",
                    check.tag()
                )));
            }
            Ok(())
        }
        CashTag => {
            check.no_content()?;
            check.required("tag").map(|_| ())
        }
        Mention => {
            check.no_content()?;
            check.required("uid").map(|_| ())
        }
        Form => forms::form(&check),
        Button => forms::button(&check),
        TextField => forms::text_field(&check),
        TextArea => forms::text_area(&check),
        Select => forms::select(&check),
        SelectOption => forms::option(&check),
        Checkbox | Radio => forms::choice(&check),
        PersonSelector => forms::person_selector(&check),
        DatePicker => dates::date_picker(&check),
        Dialog => forms::dialog(&check),
        DialogTitle | DialogBody | DialogFooter => check.parent_in(&[Dialog]),
        UiAction => forms::ui_action(&check),
    }
}

/// The node under validation plus the assertions shared by every family
pub struct Check<'a> {
    pub tree: &'a Tree,
    pub id: NodeId,
    pub kind: ElementKind,
    pub limits: &'a Limits,
}

impl<'a> Check<'a> {
    pub fn new(tree: &'a Tree, id: NodeId, limits: &'a Limits) -> Self {
        Check {
            tree,
            id,
            kind: tree.kind(id),
            limits,
        }
    }

    pub fn node(&self) -> &'a Node {
        self.tree.node(self.id)
    }

    pub fn tag(&self) -> &'static str {
        self.kind.messageml_tag()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node().attribute(name)
    }

    /// Required and not blank
    pub fn required(&self, name: &str) -> Result<&'a str> {
        match self.attr(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(MessageMLError::attribute(format!(
                "The attribute \"{name}\" is required"
            ))),
        }
    }

    /// Optional, but when present must be one of `allowed`
    pub fn one_of(&self, name: &str, allowed: &[&str]) -> Result<()> {
        match self.attr(name) {
            Some(value) if !allowed.contains(&value) => Err(MessageMLError::attribute(format!(
                "Attribute \"{name}\" of element \"{}\" can only be one of the following values: [{}]",
                self.tag(),
                allowed.join(", ")
            ))),
            _ => Ok(()),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<()> {
        self.one_of(name, &["true", "false"])
    }

    pub fn max_length(&self, name: &str, max: usize) -> Result<()> {
        match self.attr(name) {
            Some(value) if value.chars().count() > max => Err(MessageMLError::attribute(format!(
                "Attribute \"{name}\" exceed maximum allowed length ({max})"
            ))),
            _ => Ok(()),
        }
    }

    /// Length limit shared by names, labels and tooltips
    pub fn short_text(&self, name: &str) -> Result<()> {
        self.max_length(name, self.limits.max_attribute_length)
    }

    pub fn parent_in(&self, kinds: &[ElementKind]) -> Result<()> {
        match self.tree.parent_kind(self.id) {
            Some(parent) if kinds.contains(&parent) => Ok(()),
            _ => Err(MessageMLError::structure(format!(
                "Element \"{}\" can only be a child of the following elements: {}",
                self.tag(),
                tag_list(kinds)
            ))),
        }
    }

    pub fn ancestor_in(&self, kinds: &[ElementKind]) -> Result<()> {
        if self.tree.has_ancestor_of(self.id, kinds) {
            Ok(())
        } else {
            Err(MessageMLError::structure(format!(
                "Element \"{}\" can only be an inner child of the following elements: {}",
                self.tag(),
                tag_list(kinds)
            )))
        }
    }

    pub fn not_ancestor(&self, kinds: &[ElementKind]) -> Result<()> {
        if self.tree.has_ancestor_of(self.id, kinds) {
            Err(MessageMLError::structure(format!(
                "Element \"{}\" cannot be an inner child of the following elements: {}",
                self.tag(),
                tag_list(kinds)
            )))
        } else {
            Ok(())
        }
    }

    pub fn no_content(&self) -> Result<()> {
        if self.tree.children(self.id).is_empty() {
            Ok(())
        } else {
            Err(MessageMLError::structure(format!(
                "Element \"{}\" may not have child elements or text content",
                self.tag()
            )))
        }
    }

    /// Every child must be one of `kinds`
    pub fn children_in(&self, kinds: &[ElementKind]) -> Result<()> {
        self.children_where(|kind| kinds.contains(&kind))
    }

    /// Phrasing content only
    pub fn phrasing(&self) -> Result<()> {
        self.children_where(ElementKind::is_phrasing)
    }

    fn children_where(&self, allowed: impl Fn(ElementKind) -> bool) -> Result<()> {
        for child in self.tree.children(self.id) {
            let kind = self.tree.kind(*child);
            if !allowed(kind) {
                return Err(MessageMLError::structure(format!(
                    "Element \"{}\" is not allowed in \"{}\"",
                    kind.messageml_tag(),
                    self.tag()
                )));
            }
        }
        Ok(())
    }

    pub fn contains_child_of(&self, kinds: &[ElementKind]) -> Result<()> {
        let found = self
            .tree
            .children(self.id)
            .iter()
            .any(|child| kinds.contains(&self.tree.kind(*child)));
        if found {
            Ok(())
        } else {
            Err(MessageMLError::structure(format!(
                "The \"{}\" element must have at least one child that is any of the following elements: {}.",
                self.tag(),
                tag_list(kinds)
            )))
        }
    }

    /// At most `max` direct children of `kind`
    pub fn at_most_children_of(&self, kind: ElementKind, max: usize) -> Result<()> {
        if self.tree.count_children_of(self.id, kind) > max {
            return Err(self.too_many(kind, max));
        }
        Ok(())
    }

    /// At most `max` descendants of `kind`, at any depth
    pub fn at_most_descendants_of(&self, kind: ElementKind, max: usize) -> Result<()> {
        if self.tree.count_descendants_of(self.id, kind) > max {
            return Err(self.too_many(kind, max));
        }
        Ok(())
    }

    fn too_many(&self, kind: ElementKind, max: usize) -> MessageMLError {
        MessageMLError::structure(format!(
            "Element \"{}\" cannot have more than {max} children of the following elements: {}",
            self.tag(),
            tag_list(&[kind])
        ))
    }

    /// A reference that must parse as an absolute or relative URL with a safe scheme
    pub fn url(&self, name: &str) -> Result<()> {
        let value = self.required(name)?;
        match Url::parse(value) {
            Ok(url) if UNSAFE_SCHEMES.contains(&url.scheme()) => Err(MessageMLError::attribute(
                format!("Attribute \"{name}\" has an unsupported URI scheme \"{}\"", url.scheme()),
            )),
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
            Err(e) => Err(MessageMLError::attribute(format!(
                "Attribute \"{name}\" must be a valid URI: {e}"
            ))),
        }
    }
}
