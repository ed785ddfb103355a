//! MessageML format
//!
//! The authoring dialect is an input only: messages are stored and displayed
//! as PresentationML, never written back as MessageML.

use crate::elements::Tree;
use crate::error::Result;
use crate::format::Format;
use crate::parser::{self, ParseContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageMlFormat;

impl Format for MessageMlFormat {
    fn name(&self) -> &str {
        "messageml"
    }

    fn description(&self) -> &str {
        "Authoring dialect of chat messages"
    }

    fn file_extensions(&self) -> &[&str] {
        &["mml", "messageml"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, ctx: &mut ParseContext<'_>) -> Result<Tree> {
        parser::parse(source, ctx)
    }
}
