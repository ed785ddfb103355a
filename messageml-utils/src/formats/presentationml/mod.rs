//! PresentationML format
//!
//! The sanitized XHTML dialect displayed by clients. Parsing goes through the
//! shared parser (the root `div` selects the dialect); serializing emits a
//! compact document rooted at
//! `<div data-format="PresentationML" data-version="...">`.
//!
//! | Authoring element          | PresentationML                                            |
//! |----------------------------|-----------------------------------------------------------|
//! | `card`, `header`, `body`   | `div` with `card` / `cardHeader` / `cardBody` class        |
//! | `hash`, `cash`, `mention`  | `span class="entity" data-entity-id` with rendered text    |
//! | `text-field`               | `input type="text"`, content as `value`                    |
//! | `date-picker`              | `input type="date"`, date ranges single-quoted JSON        |
//! | `checkbox`, `radio`        | `div class="checkbox-group"` holding `input` and `label`   |
//! | `label` / `title`          | generated `div` with `label for` and `info-hint` tooltip   |

pub mod serializer;
pub mod writer;

use crate::elements::Tree;
use crate::error::Result;
use crate::format::Format;
use crate::ids::{DefaultIdAllocator, IdAllocator};
use crate::parser::{self, ParseContext};

/// PresentationML in and out
#[derive(Debug, Clone)]
pub struct PresentationMlFormat {
    version: String,
}

impl PresentationMlFormat {
    pub fn new(version: impl Into<String>) -> Self {
        PresentationMlFormat {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Serialize with the caller's id allocator for generated element ids
    pub fn serialize_with(&self, tree: &Tree, ids: &mut dyn IdAllocator) -> Result<String> {
        serializer::serialize(tree, &self.version, ids)
    }
}

impl Default for PresentationMlFormat {
    fn default() -> Self {
        PresentationMlFormat::new("2.0")
    }
}

impl Format for PresentationMlFormat {
    fn name(&self) -> &str {
        "presentationml"
    }

    fn description(&self) -> &str {
        "Sanitized XHTML dialect rendered by clients"
    }

    fn file_extensions(&self) -> &[&str] {
        &["pml"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, ctx: &mut ParseContext<'_>) -> Result<Tree> {
        parser::parse(source, ctx)
    }

    fn serialize(&self, tree: &Tree) -> Result<String> {
        self.serialize_with(tree, &mut DefaultIdAllocator::new())
    }
}
