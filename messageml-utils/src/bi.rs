//! Usage telemetry ("BI") collected while a message is processed.
//!
//! Items are named counters with an ordered attribute map. They are written
//! through [`TelemetrySink`] and never read back by the renderers. Updating an
//! item that already exists merges into it; the item list keeps first-occurrence
//! order.

use crate::elements::{ElementKind, NodeId, Tree};
use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};

static LIBRARY_VERSION: Lazy<String> = Lazy::new(|| {
    let version = match option_env!("CARGO_PKG_VERSION") {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            warn!("Failed to extract the messageML library version.");
            "Unknown".to_string()
        }
    };
    format!("MessageML {version}")
});

/// `MessageML <version>`, resolved once per process
pub fn library_version() -> &'static str {
    LIBRARY_VERSION.as_str()
}

/// Item and attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiFields {
    Count,
    Entity,
    EntityType,
    Hashtags,
    Cashtags,
    Mentions,
    Button,
    StyleColor,
    Type,
    Forms,
    Cards,
    ExpandableCardsCollapsed,
    ExpandableCardsCropped,
    ExpandableCardsExpanded,
    Tables,
    TableCellRowSpan,
    TableCellColSpan,
    LineBreak,
    Headers,
    Paragraph,
    BulletList,
    OrderedList,
    Links,
    Images,
    Code,
    Bold,
    Italic,
    TextField,
    TextArea,
    Select,
    Checkbox,
    Radio,
    PersonSelector,
    DatePicker,
    Dialog,
    UiAction,
    MessageLength,
    Placeholder,
    Label,
    Title,
    Required,
    Default,
    Masked,
    ValidationPattern,
    ValidationMin,
    ValidationMax,
    OptionsCount,
}

impl BiFields {
    pub fn as_str(self) -> &'static str {
        use BiFields::*;
        match self {
            Count => "count",
            Entity => "entity",
            EntityType => "entity_type",
            Hashtags => "hashtags",
            Cashtags => "cashtags",
            Mentions => "mentions",
            Button => "button",
            StyleColor => "style_color",
            Type => "type",
            Forms => "forms",
            Cards => "cards",
            ExpandableCardsCollapsed => "expandable_cards_collapsed",
            ExpandableCardsCropped => "expandable_cards_cropped",
            ExpandableCardsExpanded => "expandable_cards_expanded",
            Tables => "tables",
            TableCellRowSpan => "table_cell_row_span",
            TableCellColSpan => "table_cell_col_span",
            LineBreak => "line_break",
            Headers => "headers",
            Paragraph => "paragraph",
            BulletList => "bullet_list",
            OrderedList => "ordered_list",
            Links => "links",
            Images => "images",
            Code => "code",
            Bold => "bold",
            Italic => "italic",
            TextField => "text_field",
            TextArea => "text_area",
            Select => "select",
            Checkbox => "checkbox",
            Radio => "radio",
            PersonSelector => "person_selector",
            DatePicker => "date_selector",
            Dialog => "dialog",
            UiAction => "ui_action",
            MessageLength => "message_length",
            Placeholder => "placeholder",
            Label => "label",
            Title => "title",
            Required => "required",
            Default => "default",
            Masked => "masked",
            ValidationPattern => "validation_pattern",
            ValidationMin => "validation_min",
            ValidationMax => "validation_max",
            OptionsCount => "options_count",
        }
    }
}

/// One named counter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiItem {
    name: String,
    attributes: Map<String, Value>,
}

impl BiItem {
    pub fn new(name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        BiItem {
            name: name.into(),
            attributes,
        }
    }

    /// An item with the given attribute counted once
    pub fn counted(name: impl Into<String>, attribute: &str) -> Self {
        let mut attributes = Map::new();
        attributes.insert(attribute.to_string(), Value::from(1));
        Self::new(name, attributes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn count(&self, attribute: &str) -> Option<i64> {
        self.attributes.get(attribute).and_then(Value::as_i64)
    }

    fn increase(&mut self, attribute: &str) {
        let next = self.count(attribute).unwrap_or(0) + 1;
        self.attributes.insert(attribute.to_string(), Value::from(next));
    }

    fn raise_to(&mut self, attribute: &str, value: i64) {
        let current = self.count(attribute).unwrap_or(i64::MIN);
        if value > current {
            self.attributes.insert(attribute.to_string(), Value::from(value));
        }
    }
}

/// Write-only telemetry contract
pub trait TelemetrySink {
    fn add_item(&mut self, item: BiItem);

    /// Increment the `count` attribute of an item, creating it on first use
    fn update_count(&mut self, name: &str) {
        self.update_count_of(name, BiFields::Count.as_str());
    }

    fn update_count_of(&mut self, name: &str, attribute: &str);

    /// Merge attributes into an item: non-empty values already present are
    /// counted, unseen keys are added as-is.
    fn update_item(&mut self, name: &str, attributes: Map<String, Value>);

    /// Keep the maximum `count` seen for an item
    fn update_max(&mut self, name: &str, value: i64);

    fn is_attribute_set(&self, name: &str, attribute: &str) -> bool;
}

/// Telemetry collected for one message
#[derive(Debug, Clone, PartialEq)]
pub struct BiContext {
    library_version: String,
    items: Vec<BiItem>,
}

impl BiContext {
    pub fn new() -> Self {
        Self::with_version(library_version())
    }

    pub fn with_version(library_version: impl Into<String>) -> Self {
        BiContext {
            library_version: library_version.into(),
            items: Vec::new(),
        }
    }

    pub fn library_version(&self) -> &str {
        &self.library_version
    }

    pub fn items(&self) -> &[BiItem] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&BiItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Record an item with a single `count` value
    pub fn add_item_with_value(&mut self, name: &str, value: impl Into<Value>) {
        let mut attributes = Map::new();
        attributes.insert(BiFields::Count.as_str().to_string(), value.into());
        self.add_item(BiItem::new(name, attributes));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn item_mut(&mut self, name: &str) -> Option<&mut BiItem> {
        self.items.iter_mut().find(|item| item.name == name)
    }
}

impl Default for BiContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for BiContext {
    fn add_item(&mut self, item: BiItem) {
        self.items.push(item);
    }

    fn update_count_of(&mut self, name: &str, attribute: &str) {
        match self.item_mut(name) {
            Some(item) => item.increase(attribute),
            None => self.add_item(BiItem::counted(name, attribute)),
        }
    }

    fn update_item(&mut self, name: &str, attributes: Map<String, Value>) {
        let Some(item) = self.item_mut(name) else {
            self.add_item(BiItem::new(name, attributes));
            return;
        };
        for (key, value) in attributes {
            let empty = matches!(&value, Value::String(s) if s.is_empty()) || value.is_null();
            if !empty && item.attributes.contains_key(&key) {
                item.increase(&key);
            } else {
                item.attributes.entry(key).or_insert(value);
            }
        }
    }

    fn update_max(&mut self, name: &str, value: i64) {
        match self.item_mut(name) {
            Some(item) => item.raise_to(BiFields::Count.as_str(), value),
            None => self.add_item_with_value(name, value),
        }
    }

    fn is_attribute_set(&self, name: &str, attribute: &str) -> bool {
        self.item(name)
            .is_some_and(|item| item.attributes.get(attribute).is_some_and(|v| !v.is_null()))
    }
}

/// Visit a validated tree once and report element usage
pub fn collect(tree: &Tree, sink: &mut dyn TelemetrySink, message_length: usize) {
    for id in tree.descendants(tree.root()) {
        visit(tree, id, sink);
    }
    sink.update_max(BiFields::MessageLength.as_str(), message_length as i64);
}

fn visit(tree: &Tree, id: NodeId, sink: &mut dyn TelemetrySink) {
    use ElementKind::*;
    let node = tree.node(id);
    match node.kind() {
        Bold => count(sink, BiFields::Bold),
        Italic => count(sink, BiFields::Italic),
        Code | Preformatted => count(sink, BiFields::Code),
        Link => count(sink, BiFields::Links),
        Image => count(sink, BiFields::Images),
        LineBreak => count(sink, BiFields::LineBreak),
        Paragraph => count(sink, BiFields::Paragraph),
        Heading(_) => count(sink, BiFields::Headers),
        BulletList => count(sink, BiFields::BulletList),
        OrderedList => count(sink, BiFields::OrderedList),
        Table => count(sink, BiFields::Tables),
        TableCell | TableHeaderCell => {
            if let Some(span) = node.attribute("rowspan").and_then(|v| v.parse::<i64>().ok()) {
                sink.update_max(BiFields::TableCellRowSpan.as_str(), span);
            }
            if let Some(span) = node.attribute("colspan").and_then(|v| v.parse::<i64>().ok()) {
                sink.update_max(BiFields::TableCellColSpan.as_str(), span);
            }
        }
        Card => count(sink, BiFields::Cards),
        ExpandableCard => match node.attribute("state") {
            Some("collapsed") => count(sink, BiFields::ExpandableCardsCollapsed),
            Some("cropped") => count(sink, BiFields::ExpandableCardsCropped),
            Some("expanded") => count(sink, BiFields::ExpandableCardsExpanded),
            _ => {}
        },
        HashTag | CashTag | Mention => {
            let (field, subtype) = match node.kind() {
                HashTag => (BiFields::Hashtags, crate::entity::HASHTAG_SUBTYPE),
                CashTag => (BiFields::Cashtags, crate::entity::CASHTAG_SUBTYPE),
                _ => (BiFields::Mentions, crate::entity::MENTION_SUBTYPE),
            };
            count(sink, field);
            let mut attributes = Map::new();
            attributes.insert(BiFields::EntityType.as_str().to_string(), Value::from(subtype));
            sink.add_item(BiItem::new(BiFields::Entity.as_str(), attributes));
        }
        Form => count(sink, BiFields::Forms),
        Button => {
            let mut attributes = Map::new();
            put_if_present(&mut attributes, BiFields::StyleColor, node.attribute("class"));
            put_if_present(&mut attributes, BiFields::Type, node.attribute("type"));
            sink.add_item(BiItem::new(BiFields::Button.as_str(), attributes));
        }
        TextField | TextArea | PersonSelector | DatePicker => {
            let field = match node.kind() {
                TextField => BiFields::TextField,
                TextArea => BiFields::TextArea,
                PersonSelector => BiFields::PersonSelector,
                _ => BiFields::DatePicker,
            };
            sink.add_item(BiItem::new(field.as_str(), control_attributes(tree, id)));
        }
        Select => {
            let mut attributes = control_attributes(tree, id);
            let options = tree.count_children_of(id, SelectOption);
            attributes.insert(BiFields::OptionsCount.as_str().to_string(), Value::from(options));
            sink.add_item(BiItem::new(BiFields::Select.as_str(), attributes));
        }
        Checkbox => count(sink, BiFields::Checkbox),
        Radio => count(sink, BiFields::Radio),
        Dialog => count(sink, BiFields::Dialog),
        UiAction => count(sink, BiFields::UiAction),
        _ => {}
    }
}

fn count(sink: &mut dyn TelemetrySink, field: BiFields) {
    sink.update_count(field.as_str());
}

fn control_attributes(tree: &Tree, id: NodeId) -> Map<String, Value> {
    let node = tree.node(id);
    let mut attributes = Map::new();
    let flag = |attributes: &mut Map<String, Value>, field: BiFields, present: bool| {
        if present {
            attributes.insert(field.as_str().to_string(), Value::from(1));
        }
    };
    flag(&mut attributes, BiFields::Placeholder, node.attribute("placeholder").is_some());
    flag(&mut attributes, BiFields::Label, node.attribute("label").is_some());
    flag(&mut attributes, BiFields::Title, node.attribute("title").is_some());
    flag(&mut attributes, BiFields::Required, node.attribute("required") == Some("true"));
    flag(&mut attributes, BiFields::Masked, node.attribute("masked") == Some("true"));
    flag(&mut attributes, BiFields::ValidationPattern, node.attribute("pattern").is_some());
    flag(
        &mut attributes,
        BiFields::ValidationMin,
        node.attribute("minlength").or(node.attribute("min")).is_some(),
    );
    flag(
        &mut attributes,
        BiFields::ValidationMax,
        node.attribute("maxlength").or(node.attribute("max")).is_some(),
    );
    let has_default = node.attribute("value").is_some() || !tree.text_content(id).is_empty();
    flag(&mut attributes, BiFields::Default, has_default);
    attributes
}

fn put_if_present(attributes: &mut Map<String, Value>, field: BiFields, value: Option<&str>) {
    if let Some(value) = value {
        attributes.insert(field.as_str().to_string(), Value::from(value));
    }
}
