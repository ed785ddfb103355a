//! Format registry for format discovery and selection
//!
//! Formats are registered and retrieved by name. The CLI picks its input and
//! output through the registry.

use crate::elements::Tree;
use crate::error::{MessageMLError, Result};
use crate::format::Format;
use crate::formats::{
    EntityJsonFormat, LegacyEntitiesFormat, MarkdownFormat, MessageMlFormat, PresentationMlFormat,
};
use crate::parser::ParseContext;
use std::collections::HashMap;

/// Registry of message formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let tree = registry.parse(source, "messageml", &mut ctx)?;
/// let markdown = registry.serialize(&tree, "markdown")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| MessageMLError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect a parseable format from a filename's extension
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        let mut matches: Vec<&str> = self
            .formats
            .values()
            .filter(|format| format.supports_parsing() && format.file_extensions().contains(&extension))
            .map(|format| format.name())
            .collect();
        matches.sort();
        matches.first().map(|name| name.to_string())
    }

    /// Parse source text using the specified format
    pub fn parse(&self, source: &str, format: &str, ctx: &mut ParseContext<'_>) -> Result<Tree> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(MessageMLError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse(source, ctx)
    }

    /// Serialize a tree using the specified format
    pub fn serialize(&self, tree: &Tree, format: &str) -> Result<String> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(MessageMLError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize(tree)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MessageMlFormat);
        registry.register(PresentationMlFormat::default());
        registry.register(MarkdownFormat);
        registry.register(EntityJsonFormat::default());
        registry.register(LegacyEntitiesFormat::default());
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
