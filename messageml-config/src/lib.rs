//! Shared configuration loader for the messageml toolchain.
//!
//! `defaults/messageml.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`MessageMLConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use messageml_utils::options::{InputFormat, Limits, ParseOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/messageml.default.toml");

/// Top-level configuration consumed by messageml applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageMLConfig {
    pub parser: ParserConfig,
    pub limits: LimitsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub input_format: InputFormatConfig,
    pub presentationml_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormatConfig {
    Auto,
    #[serde(rename = "messageml")]
    MessageMl,
    #[serde(rename = "presentationml")]
    PresentationMl,
    Markdown,
}

impl From<InputFormatConfig> for InputFormat {
    fn from(config: InputFormatConfig) -> Self {
        match config {
            InputFormatConfig::Auto => InputFormat::Auto,
            InputFormatConfig::MessageMl => InputFormat::MessageMl,
            InputFormatConfig::PresentationMl => InputFormat::PresentationMl,
            InputFormatConfig::Markdown => InputFormat::Markdown,
        }
    }
}

/// Mirrors the validator limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_attribute_length: usize,
    pub max_date_range_length: usize,
    pub max_form_children_per_type: usize,
}

impl From<&LimitsConfig> for Limits {
    fn from(config: &LimitsConfig) -> Self {
        Limits {
            max_attribute_length: config.max_attribute_length,
            max_date_range_length: config.max_date_range_length,
            max_form_children_per_type: config.max_form_children_per_type,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty_json: bool,
}

impl MessageMLConfig {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            input_format: self.parser.input_format.into(),
            presentationml_version: self.parser.presentationml_version.clone(),
            limits: Limits::from(&self.limits),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<MessageMLConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MessageMLConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parser.input_format, InputFormatConfig::Auto);
        assert_eq!(config.parser.presentationml_version, "2.0");
        assert_eq!(config.limits.max_date_range_length, 1024);
        assert!(!config.output.pretty_json);
    }

    #[test]
    fn defaults_match_library_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parser.input_format", "presentationml")
            .expect("override to apply")
            .set_override("limits.max_attribute_length", 16)
            .expect("override to apply")
            .build()
            .expect("config to build");
        let options = config.parse_options();
        assert_eq!(options.input_format, InputFormat::PresentationMl);
        assert_eq!(options.limits.max_attribute_length, 16);
    }

    #[test]
    fn layers_user_file() {
        let dir = std::env::temp_dir().join(format!("messageml-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("user.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[output]\npretty_json = true").unwrap();

        let config = Loader::new().with_file(&path).build().expect("config to build");
        assert!(config.output.pretty_json);
        assert_eq!(config.limits.max_form_children_per_type, 50);

        let missing = Loader::new().with_optional_file(dir.join("absent.toml")).build();
        assert!(missing.is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_unknown_input_format() {
        let result = Loader::new()
            .set_override("parser.input_format", "rtf")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}
