//! Format implementations
//!
//! Inputs: MessageML, PresentationML, Markdown. Outputs: PresentationML,
//! Markdown, entity JSON and the legacy entities document.

pub mod entityjson;
pub mod markdown;
pub mod messageml;
pub mod presentationml;

pub use entityjson::{EntityJsonFormat, LegacyEntitiesFormat};
pub use markdown::MarkdownFormat;
pub use messageml::MessageMlFormat;
pub use presentationml::PresentationMlFormat;
