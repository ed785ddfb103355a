//! Knobs passed into every parse.
//!
//! Nothing here is global: the caller builds a [`ParseOptions`] (usually from
//! `messageml-config`) and hands it to the context.

use crate::elements::Dialect;

/// Size limits enforced by the validators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length of names, labels, tooltips and date formats
    pub max_attribute_length: usize,
    /// Maximum length of the JSON in `disabled-date` / `highlighted-date`
    pub max_date_range_length: usize,
    /// Maximum number of checkboxes, and separately of radios, in one form
    pub max_form_children_per_type: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_attribute_length: 64,
            max_date_range_length: 1024,
            max_form_children_per_type: 50,
        }
    }
}

/// Which input dialect to expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Infer from the root element
    #[default]
    Auto,
    MessageMl,
    PresentationMl,
    Markdown,
}

impl InputFormat {
    /// The XML dialect forced by this setting, if any
    pub fn dialect(self) -> Option<Dialect> {
        match self {
            InputFormat::MessageMl => Some(Dialect::MessageMl),
            InputFormat::PresentationMl => Some(Dialect::PresentationMl),
            InputFormat::Auto | InputFormat::Markdown => None,
        }
    }

    pub fn from_name(name: &str) -> Option<InputFormat> {
        match name {
            "auto" => Some(InputFormat::Auto),
            "messageml" => Some(InputFormat::MessageMl),
            "presentationml" => Some(InputFormat::PresentationMl),
            "markdown" => Some(InputFormat::Markdown),
            _ => None,
        }
    }
}

/// Options for one parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub input_format: InputFormat,
    /// `data-version` emitted on, and required of, PresentationML roots
    pub presentationml_version: String,
    pub limits: Limits,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            input_format: InputFormat::Auto,
            presentationml_version: "2.0".to_string(),
            limits: Limits::default(),
        }
    }
}
