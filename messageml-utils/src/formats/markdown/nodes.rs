//! Intermediate node graph for the Markdown renderer
//!
//! Built from an element tree by [`from_tree`], then written out by the
//! serializer. Inline containers keep their children; everything the
//! Markdown side cannot express collapses into [`MarkdownNode::Control`]
//! placeholders or plain blocks.

use crate::elements::{ElementKind, EntityData, NodeId, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<MarkdownNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownNode {
    Text(String),
    Strong(Vec<MarkdownNode>),
    Emphasis(Vec<MarkdownNode>),
    Code(String),
    HardBreak,
    /// `#tag` or `$tag`
    Keyword { sigil: char, tag: String },
    /// `@Pretty Name`
    Mention(String),
    Link { href: String, children: Vec<MarkdownNode> },
    Image(String),
    /// Transparent inline grouping
    Group(Vec<MarkdownNode>),
    Block(Vec<MarkdownNode>),
    CodeBlock(String),
    Rule,
    List(List),
    Table(Vec<Vec<Vec<MarkdownNode>>>),
    Form(Vec<MarkdownNode>),
    /// `(Name[:detail])`
    Control { name: &'static str, detail: Option<String> },
    Dropdown { placeholder: Option<String>, options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<Vec<MarkdownNode>>,
}

pub fn from_tree(tree: &Tree) -> Document {
    Document {
        children: children(tree, tree.root()),
    }
}

fn children(tree: &Tree, id: NodeId) -> Vec<MarkdownNode> {
    tree.children(id).iter().map(|child| node(tree, *child)).collect()
}

fn node(tree: &Tree, id: NodeId) -> MarkdownNode {
    use ElementKind::*;
    let element = tree.node(id);
    let attr = |name: &str| element.attribute(name).map(str::to_string);
    match element.kind() {
        Text => MarkdownNode::Text(element.text().unwrap_or_default().to_string()),
        Bold => MarkdownNode::Strong(children(tree, id)),
        Heading(_) => MarkdownNode::Block(vec![MarkdownNode::Strong(children(tree, id))]),
        Italic => MarkdownNode::Emphasis(children(tree, id)),
        Code => MarkdownNode::Code(tree.text_content(id)),
        LineBreak => MarkdownNode::HardBreak,
        HashTag | CashTag => MarkdownNode::Keyword {
            sigil: if element.kind() == HashTag { '#' } else { '$' },
            tag: attr("tag").unwrap_or_default(),
        },
        Mention => MarkdownNode::Mention(match element.entity_data() {
            Some(EntityData::User(user)) => user.pretty_name.clone(),
            _ => attr("uid").unwrap_or_default(),
        }),
        Link => MarkdownNode::Link {
            href: attr("href").unwrap_or_default(),
            children: children(tree, id),
        },
        Image => MarkdownNode::Image(attr("src").unwrap_or_default()),
        Span | UiAction | SelectOption => MarkdownNode::Group(children(tree, id)),
        Preformatted => MarkdownNode::CodeBlock(tree.text_content(id)),
        HorizontalRule => MarkdownNode::Rule,
        BulletList | OrderedList => MarkdownNode::List(List {
            ordered: element.kind() == OrderedList,
            items: tree
                .element_children(id)
                .map(|item| children(tree, item))
                .collect(),
        }),
        Table => MarkdownNode::Table(
            tree.find_descendants(id, |n| n.kind() == TableRow)
                .into_iter()
                .map(|row| tree.element_children(row).map(|cell| children(tree, cell)).collect())
                .collect(),
        ),
        Form => MarkdownNode::Form(children(tree, id)),
        Button => control("Button", Some(tree.text_content(id))),
        TextField => control("Text Field", attr("placeholder")),
        TextArea => control("Text Area", attr("placeholder")),
        Select => MarkdownNode::Dropdown {
            placeholder: attr("data-placeholder"),
            options: tree
                .element_children(id)
                .map(|option| tree.text_content(option))
                .collect(),
        },
        Checkbox => control("Checkbox", Some(tree.text_content(id))),
        Radio => control("Radio Button", Some(tree.text_content(id))),
        PersonSelector => control("Person Selector", attr("placeholder")),
        DatePicker => control("Date Picker", attr("label").or_else(|| attr("placeholder"))),
        MessageMl | Paragraph | Div | ListItem | TableHeader | TableBody | TableFooter | TableRow
        | TableHeaderCell | TableCell | Card | CardHeader | CardBody | ExpandableCard | Dialog
        | DialogTitle | DialogBody | DialogFooter => MarkdownNode::Block(children(tree, id)),
    }
}

fn control(name: &'static str, detail: Option<String>) -> MarkdownNode {
    MarkdownNode::Control {
        name,
        detail: detail.filter(|d| !d.is_empty()),
    }
}
