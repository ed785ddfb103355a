//! Entity records and the JSON side-document.
//!
//! Hashtags, cashtags and mentions own a record in the entity JSON, keyed by
//! the identifier stored on their node. Extension entities (any other record
//! type referenced from a `span`/`div`) carry their payload through unchanged.
//!
//! The same module goes the other way for the round trip: [`resolve`] turns a
//! referenced record back into what the builder needs to rebuild a node.

pub mod schema;

use crate::elements::{ElementKind, EntityData, NodeId, Tree};
use crate::error::{MessageMLError, Result};
use crate::ids::IdAllocator;
use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

pub use schema::{BasicSchemaValidator, EntitySchemas, SchemaError, SchemaValidator, SchemaViolation};

pub const ENTITY_VERSION: &str = "1.0";

pub const HASHTAG_TYPE: &str = "org.symphonyoss.taxonomy";
pub const HASHTAG_SUBTYPE: &str = "org.symphonyoss.taxonomy.hashtag";
pub const CASHTAG_TYPE: &str = "org.symphonyoss.fin.security";
pub const CASHTAG_SUBTYPE: &str = "org.symphonyoss.fin.security.id.ticker";
pub const MENTION_TYPE: &str = "com.symphony.user.mention";
pub const MENTION_SUBTYPE: &str = "com.symphony.user.userId";

/// Attribute carrying the join key on presentation elements
pub const ENTITY_ID_ATTRIBUTE: &str = "data-entity-id";
/// Class marking a presentation element as an entity reference
pub const ENTITY_CLASS: &str = "entity";

const KEYWORD_PREFIX: &str = "keyword";
const MENTION_PREFIX: &str = "mention";

/// One `{type, version, id}` record of the entity JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub version: String,
    pub id: Vec<EntityValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: Value,
}

impl EntityRecord {
    fn single(entity_type: &str, value_type: &str, value: Value) -> Self {
        EntityRecord {
            entity_type: entity_type.to_string(),
            version: ENTITY_VERSION.to_string(),
            id: vec![EntityValue {
                value_type: value_type.to_string(),
                value,
            }],
        }
    }

    pub fn hashtag(tag: &str) -> Self {
        Self::single(HASHTAG_TYPE, HASHTAG_SUBTYPE, Value::from(tag))
    }

    pub fn cashtag(tag: &str) -> Self {
        Self::single(CASHTAG_TYPE, CASHTAG_SUBTYPE, Value::from(tag))
    }

    pub fn mention(uid: i64) -> Self {
        Self::single(MENTION_TYPE, MENTION_SUBTYPE, Value::from(uid))
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": self.entity_type,
            "version": self.version,
            "id": self.id.iter().map(|v| json!({"type": v.value_type, "value": v.value})).collect::<Vec<_>>(),
        })
    }
}

/// What a referenced record resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedEntity {
    HashTag(String),
    CashTag(String),
    Mention(i64),
    /// Any other record type, payload kept verbatim
    Extension { entity_type: String, payload: Value },
}

/// Identifier prefix for kinds whose identifiers are allocated
pub fn id_prefix(kind: ElementKind) -> Option<&'static str> {
    match kind {
        ElementKind::HashTag | ElementKind::CashTag => Some(KEYWORD_PREFIX),
        ElementKind::Mention => Some(MENTION_PREFIX),
        _ => None,
    }
}

/// Give every keyword and mention without an identifier a fresh one.
///
/// Identifiers already present (read from PresentationML or carried by
/// extension references) are kept, and newly issued ones never collide with them.
pub fn allocate_ids(tree: &mut Tree, allocator: &mut dyn IdAllocator) {
    let nodes = tree.descendants(tree.root());
    let mut taken: HashSet<String> = nodes
        .iter()
        .filter_map(|id| tree.node(*id).entity_id().map(str::to_string))
        .collect();

    for id in nodes {
        let node = tree.node(id);
        if node.entity_id().is_some() {
            continue;
        }
        let Some(prefix) = id_prefix(node.kind()) else {
            continue;
        };
        let mut entity_id = allocator.entity_id(prefix);
        while taken.contains(&entity_id) {
            entity_id = allocator.entity_id(prefix);
        }
        trace!("allocated entity id {entity_id} for {}", node.kind().messageml_tag());
        taken.insert(entity_id.clone());
        tree.node_mut(id).set_entity_id(entity_id);
    }
}

/// The record a node contributes to the entity JSON, if any
pub fn record_for(tree: &Tree, id: NodeId) -> Option<Value> {
    let node = tree.node(id);
    node.entity_id()?;
    match node.kind() {
        ElementKind::HashTag => node.attribute("tag").map(|t| EntityRecord::hashtag(t).to_value()),
        ElementKind::CashTag => node.attribute("tag").map(|t| EntityRecord::cashtag(t).to_value()),
        ElementKind::Mention => node
            .attribute("uid")
            .and_then(|uid| uid.parse::<i64>().ok())
            .map(|uid| EntityRecord::mention(uid).to_value()),
        _ => match node.entity_data() {
            Some(EntityData::Extension(payload)) => Some(payload.clone()),
            _ => None,
        },
    }
}

/// The identifier-keyed entity document, in document order
pub fn entity_json(tree: &Tree) -> Map<String, Value> {
    let mut out = Map::new();
    for id in tree.descendants(tree.root()) {
        if let (Some(key), Some(record)) = (tree.node(id).entity_id(), record_for(tree, id)) {
            out.insert(key.to_string(), record);
        }
    }
    out
}

/// The legacy flat entities document: `hashtags`, `userMentions` and `urls`.
/// Empty categories are omitted.
pub fn legacy_entities(tree: &Tree) -> Map<String, Value> {
    let mut hashtags = Vec::new();
    let mut mentions = Vec::new();
    let mut urls = Vec::new();

    for id in tree.descendants(tree.root()) {
        let node = tree.node(id);
        match node.kind() {
            ElementKind::HashTag | ElementKind::CashTag => {
                let sigil = if node.kind() == ElementKind::HashTag { '#' } else { '$' };
                if let Some(tag) = node.attribute("tag") {
                    let text = format!("{sigil}{tag}");
                    hashtags.push(json!({"id": text, "text": text, "type": "KEYWORD"}));
                }
            }
            ElementKind::Mention => {
                if let Some(EntityData::User(user)) = node.entity_data() {
                    mentions.push(json!({
                        "id": user.id,
                        "screenName": user.screen_name,
                        "prettyName": user.pretty_name,
                        "text": format!("@{}", user.pretty_name),
                        "type": "USER_FOLLOW",
                    }));
                }
            }
            ElementKind::Link => {
                if let Some(href) = node.attribute("href") {
                    urls.push(json!({"id": href, "text": href, "expandedUrl": href, "type": "URL"}));
                }
            }
            _ => {}
        }
    }

    let mut out = Map::new();
    for (key, list) in [("hashtags", hashtags), ("userMentions", mentions), ("urls", urls)] {
        if !list.is_empty() {
            out.insert(key.to_string(), Value::Array(list));
        }
    }
    out
}

/// Resolve a `data-entity-id` reference against the entity JSON
pub fn resolve(entity_json: &Map<String, Value>, id: &str, schemas: &EntitySchemas) -> Result<ResolvedEntity> {
    let record = entity_json.get(id).ok_or_else(|| {
        MessageMLError::entity(format!(
            "Error processing EntityJSON: no entity data provided for \"{ENTITY_ID_ATTRIBUTE}\"=\"{id}\""
        ))
    })?;
    let invalid = |reason: &str| {
        MessageMLError::entity(format!("Error processing EntityJSON: entity \"{id}\" {reason}"))
    };
    let entity_type = record
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("has no \"type\""))?;

    let first_value = || {
        record
            .get("id")
            .and_then(Value::as_array)
            .and_then(|values| values.first())
            .and_then(|v| v.get("value"))
            .ok_or_else(|| invalid("has no \"id\" value"))
    };

    match entity_type {
        HASHTAG_TYPE | CASHTAG_TYPE => {
            let tag = first_value()?
                .as_str()
                .filter(|tag| !tag.is_empty())
                .ok_or_else(|| invalid("has an empty or non-string tag"))?;
            Ok(if entity_type == HASHTAG_TYPE {
                ResolvedEntity::HashTag(tag.to_string())
            } else {
                ResolvedEntity::CashTag(tag.to_string())
            })
        }
        MENTION_TYPE => {
            let value = first_value()?;
            let uid = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| invalid(&format!("has an invalid user id {value}")))?;
            Ok(ResolvedEntity::Mention(uid))
        }
        other => {
            schemas.check(id, other, record)?;
            Ok(ResolvedEntity::Extension {
                entity_type: other.to_string(),
                payload: record.clone(),
            })
        }
    }
}
