//! Dual-format attribute table.
//!
//! Each kind lists every attribute it accepts, under its authoring name, with
//! the dialects it is legal in and the name it takes in PresentationML. Any
//! (kind, attribute, dialect) triple that is not listed here is illegal.
//!
//! Attributes are always stored under the authoring name; the PresentationML
//! renderer maps them back out through [`AttributeRule::presentation_name`].
//! Structural markers such as `data-entity-id`, a presentation `class` marker
//! or an `input`'s `type` are consumed by the parser and never reach this table.

use super::{Dialect, ElementKind};
use crate::error::{MessageMLError, Result};

/// In which dialects an attribute is legal and under what name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Same name in both dialects
    Both,
    /// Legal in both, under a different presentation name
    Renamed(&'static str),
    /// Authoring only; the presentation side carries the value some other way
    MessageMlOnly,
}

/// How a value crosses the dialect boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Parsed as i64 and stored as canonical decimal
    Integer,
    /// JSON document, stored in its typed form once validated and emitted single-quoted
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRule {
    pub name: &'static str,
    pub presence: Presence,
    pub value: ValueKind,
}

impl AttributeRule {
    const fn both(name: &'static str) -> Self {
        AttributeRule {
            name,
            presence: Presence::Both,
            value: ValueKind::Text,
        }
    }

    const fn renamed(name: &'static str, presentation: &'static str) -> Self {
        AttributeRule {
            name,
            presence: Presence::Renamed(presentation),
            value: ValueKind::Text,
        }
    }

    const fn authoring(name: &'static str) -> Self {
        AttributeRule {
            name,
            presence: Presence::MessageMlOnly,
            value: ValueKind::Text,
        }
    }

    const fn integer(self) -> Self {
        AttributeRule {
            value: ValueKind::Integer,
            ..self
        }
    }

    const fn json(self) -> Self {
        AttributeRule {
            value: ValueKind::Json,
            ..self
        }
    }

    /// Name this attribute is written under in the given dialect
    pub fn source_name(&self, dialect: Dialect) -> Option<&'static str> {
        match (dialect, self.presence) {
            (Dialect::MessageMl, _) => Some(self.name),
            (Dialect::PresentationMl, Presence::Both) => Some(self.name),
            (Dialect::PresentationMl, Presence::Renamed(name)) => Some(name),
            (Dialect::PresentationMl, Presence::MessageMlOnly) => None,
        }
    }

    /// Name emitted by the PresentationML renderer, if the attribute is emitted at all
    pub fn presentation_name(&self) -> Option<&'static str> {
        self.source_name(Dialect::PresentationMl)
    }

    /// Stored value for a raw source value; JSON is normalized after validation
    pub fn canonical_value(&self, raw: &str) -> Result<String> {
        match self.value {
            ValueKind::Text | ValueKind::Json => Ok(raw.to_string()),
            ValueKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|_| {
                    MessageMLError::attribute(format!(
                        "Invalid input: {} must be a int64 value not \"{raw}\"",
                        self.name
                    ))
                }),
        }
    }
}

use AttributeRule as R;

const CLASS: R = R::both("class");
const STYLE: R = R::both("style");

const GENERIC: &[R] = &[CLASS, STYLE];
const NONE: &[R] = &[];
const LINK: &[R] = &[R::both("href"), CLASS, STYLE];
const IMAGE: &[R] = &[R::both("src"), CLASS, STYLE];
const TABLE_CELL: &[R] = &[
    R::both("rowspan").integer(),
    R::both("colspan").integer(),
    CLASS,
    STYLE,
];
const CARD: &[R] = &[
    R::renamed("iconSrc", "data-icon-src"),
    R::renamed("accent", "data-accent-color"),
    CLASS,
];
const CARD_PART: &[R] = &[CLASS];
const EXPANDABLE_CARD: &[R] = &[R::renamed("state", "data-state"), CLASS];
const KEYWORD: &[R] = &[R::authoring("tag")];
const MENTION: &[R] = &[R::authoring("uid").integer(), R::authoring("email")];
const FORM: &[R] = &[R::both("id")];
const BUTTON: &[R] = &[
    R::both("name"),
    R::both("type"),
    CLASS,
    R::renamed("icon", "data-icon"),
    R::renamed("title", "data-title"),
    R::renamed("formnovalidate", "data-formnovalidate"),
];
const TEXT_FIELD: &[R] = &[
    R::both("name"),
    R::both("placeholder"),
    R::both("required"),
    R::renamed("masked", "data-masked"),
    R::both("minlength").integer(),
    R::both("maxlength").integer(),
    R::both("pattern"),
    R::renamed("pattern-error-message", "data-pattern-error-message"),
    R::authoring("label"),
    R::authoring("title"),
    R::both("disabled"),
    R::both("readonly"),
    R::renamed("formnovalidate", "data-formnovalidate"),
];
const TEXT_AREA: &[R] = &[
    R::both("name"),
    R::both("placeholder"),
    R::both("required"),
    R::both("rows").integer(),
    R::both("cols").integer(),
    R::both("pattern"),
    R::renamed("pattern-error-message", "data-pattern-error-message"),
    R::authoring("label"),
    R::authoring("title"),
    R::both("disabled"),
    R::both("readonly"),
    R::renamed("formnovalidate", "data-formnovalidate"),
];
const SELECT: &[R] = &[
    R::both("name"),
    R::both("required"),
    R::both("data-placeholder"),
    R::authoring("label"),
    R::authoring("title"),
    R::both("disabled"),
];
const OPTION: &[R] = &[R::both("value"), R::both("selected")];
const CHOICE: &[R] = &[
    R::both("name"),
    R::both("value"),
    R::both("checked"),
    R::both("disabled"),
];
const PERSON_SELECTOR: &[R] = &[
    R::renamed("name", "data-name"),
    R::renamed("placeholder", "data-placeholder"),
    R::renamed("required", "data-required"),
    R::authoring("label"),
    R::authoring("title"),
];
const DATE_PICKER: &[R] = &[
    R::both("name"),
    R::both("value"),
    R::both("required"),
    R::both("placeholder"),
    R::both("min"),
    R::both("max"),
    R::renamed("disabled-date", "data-disabled-date").json(),
    R::renamed("highlighted-date", "data-highlighted-date").json(),
    R::renamed("format", "data-format"),
    R::authoring("label"),
    R::authoring("title"),
    R::both("disabled"),
    R::both("readonly"),
    R::renamed("formnovalidate", "data-formnovalidate"),
];
const DIALOG: &[R] = &[
    R::both("id"),
    R::renamed("width", "data-width"),
    R::renamed("state", "data-state"),
    CLASS,
];
const UI_ACTION: &[R] = &[
    R::renamed("trigger", "data-trigger"),
    R::renamed("action", "data-action"),
    R::renamed("target-id", "data-target-id"),
];

/// The attribute table for one kind
pub fn rules_for(kind: ElementKind) -> &'static [AttributeRule] {
    use ElementKind::*;
    match kind {
        MessageMl | Text | LineBreak | HorizontalRule => NONE,
        DialogTitle | DialogBody | DialogFooter => NONE,
        Bold | Italic | Code | Span | Paragraph | Heading(_) | Preformatted | Div => GENERIC,
        BulletList | OrderedList | ListItem => GENERIC,
        Table | TableHeader | TableBody | TableFooter | TableRow => GENERIC,
        Link => LINK,
        Image => IMAGE,
        TableHeaderCell | TableCell => TABLE_CELL,
        Card => CARD,
        CardHeader | CardBody => CARD_PART,
        ExpandableCard => EXPANDABLE_CARD,
        HashTag | CashTag => KEYWORD,
        Mention => MENTION,
        Form => FORM,
        Button => BUTTON,
        TextField => TEXT_FIELD,
        TextArea => TEXT_AREA,
        Select => SELECT,
        SelectOption => OPTION,
        Checkbox | Radio => CHOICE,
        PersonSelector => PERSON_SELECTOR,
        DatePicker => DATE_PICKER,
        Dialog => DIALOG,
        UiAction => UI_ACTION,
    }
}

/// Look up the rule accepting `source_name` on `kind` when parsed as `dialect`
pub fn accept(kind: ElementKind, dialect: Dialect, source_name: &str) -> Option<&'static AttributeRule> {
    rules_for(kind)
        .iter()
        .find(|rule| rule.source_name(dialect) == Some(source_name))
}

/// Rule for a stored (authoring) attribute name
pub fn rule(kind: ElementKind, name: &str) -> Option<&'static AttributeRule> {
    rules_for(kind).iter().find(|rule| rule.name == name)
}

/// The failure for an attribute the table does not list
pub fn not_allowed(kind: ElementKind, source_name: &str) -> MessageMLError {
    MessageMLError::attribute(format!(
        "Attribute \"{source_name}\" is not allowed in \"{}\"",
        kind.messageml_tag()
    ))
}
