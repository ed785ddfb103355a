//! Entity JSON outputs
//!
//! [`EntityJsonFormat`] writes the structured entity map keyed by entity id;
//! [`LegacyEntitiesFormat`] writes the flat `hashtags` / `userMentions` /
//! `urls` arrays older consumers read.

use crate::elements::Tree;
use crate::entity;
use crate::error::{MessageMLError, Result};
use crate::format::Format;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct EntityJsonFormat {
    pub pretty: bool,
}

impl Format for EntityJsonFormat {
    fn name(&self) -> &str {
        "entityjson"
    }

    fn description(&self) -> &str {
        "Structured entity data keyed by data-entity-id"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, tree: &Tree) -> Result<String> {
        to_json(entity::entity_json(tree), self.pretty)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEntitiesFormat {
    pub pretty: bool,
}

impl Format for LegacyEntitiesFormat {
    fn name(&self) -> &str {
        "entities"
    }

    fn description(&self) -> &str {
        "Flat hashtag, mention and url lists"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, tree: &Tree) -> Result<String> {
        to_json(entity::legacy_entities(tree), self.pretty)
    }
}

fn to_json(map: Map<String, Value>, pretty: bool) -> Result<String> {
    let value = Value::Object(map);
    let out = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    out.map_err(|e| MessageMLError::Processing(format!("JSON serialization error: {e}")))
}
