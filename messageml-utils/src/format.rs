//! Format trait definition
//!
//! Every wire format the library reads or writes implements [`Format`]. Inputs
//! parse into an element [`Tree`]; outputs are projections of a validated tree.
//! Most formats support one direction only.

use crate::elements::Tree;
use crate::error::{MessageMLError, Result};
use crate::parser::ParseContext;

/// Trait for message formats
///
/// # Examples
///
/// ```ignore
/// struct UpperText;
///
/// impl Format for UpperText {
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, tree: &Tree) -> Result<String> {
///         Ok(tree.text_content(tree.root()).to_uppercase())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g. "messageml", "markdown")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// File extensions without the leading dot, used for detection from filenames
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a validated tree
    fn parse(&self, _source: &str, _ctx: &mut ParseContext<'_>) -> Result<Tree> {
        Err(MessageMLError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Render a validated tree
    fn serialize(&self, _tree: &Tree) -> Result<String> {
        Err(MessageMLError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}
