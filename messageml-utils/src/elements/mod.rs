//! Element tree model
//!
//! Every MessageML tag maps to exactly one [`ElementKind`]. The kind is a closed
//! enum: tag lookup, attribute rules, validation and the render projections are
//! all `match`es over it, so adding a variant is checked for exhaustiveness by
//! the compiler.
//!
//! Nodes live in a [`Tree`] arena and refer to each other by [`NodeId`]. See
//! [`tree`] for the arena and [`attributes`] for the per-kind attribute table.

pub mod attributes;
pub mod tree;

use std::fmt;

pub use attributes::{AttributeRule, Presence, ValueKind};
pub use tree::{Attributes, EntityData, Node, NodeId, Tree};

/// Which of the two XML dialects produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Authoring dialect
    MessageMl,
    /// Sanitized display dialect
    PresentationMl,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::MessageMl => "MessageML",
            Dialect::PresentationMl => "PresentationML",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The closed set of element variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    MessageMl,
    Text,
    Bold,
    Italic,
    Code,
    Span,
    Link,
    Image,
    LineBreak,
    Paragraph,
    Heading(u8),
    Preformatted,
    Div,
    HorizontalRule,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableHeader,
    TableBody,
    TableFooter,
    TableRow,
    TableHeaderCell,
    TableCell,
    Card,
    CardHeader,
    CardBody,
    ExpandableCard,
    HashTag,
    CashTag,
    Mention,
    Form,
    Button,
    TextField,
    TextArea,
    Select,
    SelectOption,
    Checkbox,
    Radio,
    PersonSelector,
    DatePicker,
    Dialog,
    DialogTitle,
    DialogBody,
    DialogFooter,
    UiAction,
}

/// Authoring tags that have no literal counterpart in PresentationML.
const SHORTHAND_TAGS: &[&str] = &[
    "messageML",
    "card",
    "header",
    "body",
    "expandable-card",
    "hash",
    "cash",
    "mention",
    "text-field",
    "checkbox",
    "radio",
    "person-selector",
    "date-picker",
    "title",
    "footer",
    "ui-action",
];

impl ElementKind {
    /// Tag name in the authoring dialect
    pub fn messageml_tag(self) -> &'static str {
        use ElementKind::*;
        match self {
            MessageMl => "messageML",
            Text => "#text",
            Bold => "b",
            Italic => "i",
            Code => "code",
            Span => "span",
            Link => "a",
            Image => "img",
            LineBreak => "br",
            Paragraph => "p",
            Heading(level) => heading_tag(level),
            Preformatted => "pre",
            Div => "div",
            HorizontalRule => "hr",
            BulletList => "ul",
            OrderedList => "ol",
            ListItem => "li",
            Table => "table",
            TableHeader => "thead",
            TableBody => "tbody",
            TableFooter => "tfoot",
            TableRow => "tr",
            TableHeaderCell => "th",
            TableCell => "td",
            Card => "card",
            CardHeader => "header",
            CardBody => "body",
            ExpandableCard => "expandable-card",
            HashTag => "hash",
            CashTag => "cash",
            Mention => "mention",
            Form => "form",
            Button => "button",
            TextField => "text-field",
            TextArea => "textarea",
            Select => "select",
            SelectOption => "option",
            Checkbox => "checkbox",
            Radio => "radio",
            PersonSelector => "person-selector",
            DatePicker => "date-picker",
            Dialog => "dialog",
            DialogTitle => "title",
            DialogBody => "body",
            DialogFooter => "footer",
            UiAction => "ui-action",
        }
    }

    /// Default tag name in the presentation dialect
    pub fn presentationml_tag(self) -> &'static str {
        use ElementKind::*;
        match self {
            MessageMl | Card | CardHeader | CardBody | ExpandableCard | Checkbox | Radio
            | PersonSelector | DialogTitle | DialogBody | DialogFooter | UiAction => "div",
            HashTag | CashTag | Mention => "span",
            TextField | DatePicker => "input",
            other => other.messageml_tag(),
        }
    }

    /// Resolve an authoring tag. A few tags (`header`, `body`, `title`, `footer`)
    /// depend on the enclosing element.
    pub fn from_messageml_tag(tag: &str, parent: Option<ElementKind>) -> Option<ElementKind> {
        use ElementKind::*;
        let kind = match tag {
            "messageML" => MessageMl,
            "b" => Bold,
            "i" => Italic,
            "code" => Code,
            "span" => Span,
            "a" => Link,
            "img" => Image,
            "br" => LineBreak,
            "p" => Paragraph,
            "pre" => Preformatted,
            "div" => Div,
            "hr" => HorizontalRule,
            "ul" => BulletList,
            "ol" => OrderedList,
            "li" => ListItem,
            "table" => Table,
            "thead" => TableHeader,
            "tbody" => TableBody,
            "tfoot" => TableFooter,
            "tr" => TableRow,
            "th" => TableHeaderCell,
            "td" => TableCell,
            "card" => Card,
            "header" => CardHeader,
            "body" if parent == Some(Dialog) => DialogBody,
            "body" => CardBody,
            "expandable-card" => ExpandableCard,
            "hash" => HashTag,
            "cash" => CashTag,
            "mention" => Mention,
            "form" => Form,
            "button" => Button,
            "text-field" => TextField,
            "textarea" => TextArea,
            "select" => Select,
            "option" => SelectOption,
            "checkbox" => Checkbox,
            "radio" => Radio,
            "person-selector" => PersonSelector,
            "date-picker" => DatePicker,
            "dialog" => Dialog,
            "title" => DialogTitle,
            "footer" => DialogFooter,
            "ui-action" => UiAction,
            _ => return heading_level(tag).map(Heading),
        };
        Some(kind)
    }

    /// Resolve a presentation tag whose name alone identifies the kind.
    /// `div`, `span` and `input` need their attributes and are resolved by the parser.
    pub fn from_presentationml_tag(tag: &str) -> Option<ElementKind> {
        match tag {
            "div" | "span" | "input" => None,
            t if is_shorthand_tag(t) => None,
            t => ElementKind::from_messageml_tag(t, None),
        }
    }

    /// Class marker identifying this kind on a presentation `div`
    pub fn presentation_class(self, parent: Option<ElementKind>) -> Option<&'static str> {
        use ElementKind::*;
        let expandable = parent == Some(ExpandableCard);
        match self {
            Card => Some("card"),
            CardHeader if expandable => Some("expandable-card-header"),
            CardHeader => Some("cardHeader"),
            CardBody if expandable => Some("expandable-card-body"),
            CardBody => Some("cardBody"),
            ExpandableCard => Some("expandable-card"),
            Checkbox => Some("checkbox-group"),
            Radio => Some("radio-group"),
            PersonSelector => Some("person-selector"),
            DialogTitle => Some("dialog-title"),
            DialogBody => Some("dialog-body"),
            DialogFooter => Some("dialog-footer"),
            UiAction => Some("ui-action"),
            _ => None,
        }
    }

    /// Inverse of [`ElementKind::presentation_class`]
    pub fn from_presentation_class(class: &str) -> Option<ElementKind> {
        use ElementKind::*;
        let kind = match class {
            "card" => Card,
            "cardHeader" | "expandable-card-header" => CardHeader,
            "cardBody" | "expandable-card-body" => CardBody,
            "expandable-card" => ExpandableCard,
            "checkbox-group" => Checkbox,
            "radio-group" => Radio,
            "person-selector" => PersonSelector,
            "dialog-title" => DialogTitle,
            "dialog-body" => DialogBody,
            "dialog-footer" => DialogFooter,
            "ui-action" => UiAction,
            _ => return None,
        };
        Some(kind)
    }

    /// Phrasing (inline) content
    pub fn is_phrasing(self) -> bool {
        use ElementKind::*;
        matches!(
            self,
            Text | Bold | Italic | Code | Span | Link | Image | LineBreak | HashTag | CashTag | Mention
        )
    }

    /// Rendered as a self-closing presentation element
    pub fn is_void(self) -> bool {
        use ElementKind::*;
        matches!(
            self,
            LineBreak | HorizontalRule | Image | TextField | DatePicker | PersonSelector
        )
    }

    /// Control that may be wrapped with a generated label and tooltip
    pub fn is_labelled(self) -> bool {
        use ElementKind::*;
        matches!(
            self,
            TextField | TextArea | Select | PersonSelector | DatePicker
        )
    }

    /// Containers whose content model admits elements only; whitespace text
    /// between their children is dropped while building.
    pub fn skips_whitespace(self) -> bool {
        use ElementKind::*;
        matches!(
            self,
            BulletList
                | OrderedList
                | Table
                | TableHeader
                | TableBody
                | TableFooter
                | TableRow
                | Card
                | ExpandableCard
                | Select
                | Dialog
                | UiAction
        )
    }
}

/// Authoring-only tag that must not appear in PresentationML input
pub fn is_shorthand_tag(tag: &str) -> bool {
    SHORTHAND_TAGS.contains(&tag)
}

/// Render a bracketed tag list for diagnostics, e.g. `[ul, ol]`
pub fn tag_list(kinds: &[ElementKind]) -> String {
    let tags: Vec<&str> = kinds.iter().map(|k| k.messageml_tag()).collect();
    format!("[{}]", tags.join(", "))
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?;
    match level {
        "1" | "2" | "3" | "4" | "5" | "6" => level.parse().ok(),
        _ => None,
    }
}
