//! One message, parsed once, rendered many ways
//!
//! [`MessageMLContext`] owns the collaborators of a parse (options, user
//! directory, schemas, id allocator) and the telemetry of the last message.
//! Each successful parse replaces the stored tree; the render methods are
//! independent projections of it.

use crate::bi::{self, BiContext};
use crate::elements::Tree;
use crate::entity::{self, EntitySchemas};
use crate::error::{MessageMLError, Result};
use crate::formats::{markdown, presentationml};
use crate::ids::{DefaultIdAllocator, IdAllocator};
use crate::options::{InputFormat, ParseOptions};
use crate::parser::{self, ParseContext};
use crate::users::{StaticUserDirectory, UserDirectory};
use log::debug;
use serde_json::{Map, Value};

pub struct MessageMLContext {
    options: ParseOptions,
    users: Box<dyn UserDirectory>,
    schemas: EntitySchemas,
    allocator: Box<dyn IdAllocator>,
    telemetry: BiContext,
    tree: Option<Tree>,
}

impl MessageMLContext {
    pub fn new(options: ParseOptions) -> Self {
        MessageMLContext {
            options,
            users: Box::new(StaticUserDirectory::new()),
            schemas: EntitySchemas::new(),
            allocator: Box::new(DefaultIdAllocator::new()),
            telemetry: BiContext::new(),
            tree: None,
        }
    }

    pub fn with_users(mut self, users: impl UserDirectory + 'static) -> Self {
        self.users = Box::new(users);
        self
    }

    pub fn with_schemas(mut self, schemas: EntitySchemas) -> Self {
        self.schemas = schemas;
        self
    }

    /// Replace the allocator; the default issues `keyword1`, `mention2`, ...
    pub fn with_allocator(mut self, allocator: impl IdAllocator + 'static) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a MessageML or PresentationML message, with the entity JSON its
    /// entity references resolve against.
    ///
    /// When the options declare Markdown input the message is imported as
    /// Markdown instead and `entity_json` is ignored.
    pub fn parse_messageml(&mut self, message: &str, entity_json: Option<&str>) -> Result<()> {
        if self.options.input_format == InputFormat::Markdown {
            return self.parse_markdown(message);
        }
        let entity_json = parse_entity_json(entity_json)?;
        self.tree = None;
        self.telemetry.clear();
        self.allocator.reset();

        let mut ctx = ParseContext {
            options: &self.options,
            entity_json: &entity_json,
            allocator: &mut *self.allocator,
            users: &*self.users,
            schemas: &self.schemas,
        };
        let tree = parser::parse(message, &mut ctx)?;
        self.finish(tree, message.len());
        Ok(())
    }

    pub fn parse_markdown(&mut self, markdown_text: &str) -> Result<()> {
        self.tree = None;
        self.telemetry.clear();
        self.allocator.reset();
        let mut tree = markdown::parser::parse_from_markdown(markdown_text, &self.options)?;
        entity::allocate_ids(&mut tree, &mut *self.allocator);
        self.finish(tree, markdown_text.len());
        Ok(())
    }

    fn finish(&mut self, tree: Tree, message_length: usize) {
        bi::collect(&tree, &mut self.telemetry, message_length);
        debug!("collected {} telemetry items", self.telemetry.items().len());
        self.tree = Some(tree);
    }

    /// The last successfully parsed tree
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn presentationml(&mut self) -> Result<String> {
        let tree = self.tree.as_ref().ok_or_else(not_parsed)?;
        presentationml::serializer::serialize(
            tree,
            &self.options.presentationml_version,
            &mut *self.allocator,
        )
    }

    pub fn markdown(&self) -> Result<String> {
        Ok(markdown::to_markdown(self.parsed()?))
    }

    /// Entity JSON keyed by `data-entity-id`
    pub fn entity_json(&self) -> Result<Map<String, Value>> {
        Ok(entity::entity_json(self.parsed()?))
    }

    /// Legacy flat entities document
    pub fn entities(&self) -> Result<Map<String, Value>> {
        Ok(entity::legacy_entities(self.parsed()?))
    }

    pub fn telemetry(&self) -> &BiContext {
        &self.telemetry
    }

    fn parsed(&self) -> Result<&Tree> {
        self.tree.as_ref().ok_or_else(not_parsed)
    }
}

impl Default for MessageMLContext {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

fn not_parsed() -> MessageMLError {
    MessageMLError::Processing("no message has been parsed yet".to_string())
}

fn parse_entity_json(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MessageMLError::entity(
            "Error parsing EntityJSON: the document must be a JSON object",
        )),
        Err(e) => Err(MessageMLError::entity(format!("Error parsing EntityJSON: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bi::BiFields;

    #[test]
    fn test_render_before_parse_fails() {
        let ctx = MessageMLContext::default();
        assert!(ctx.markdown().is_err());
        assert!(ctx.tree().is_none());
    }

    #[test]
    fn test_failed_parse_keeps_no_tree() {
        let mut ctx = MessageMLContext::default();
        ctx.parse_messageml("<messageML>ok</messageML>", None).unwrap();
        assert!(ctx.tree().is_some());
        assert!(ctx.parse_messageml("<messageML><li>x</li></messageML>", None).is_err());
        assert!(ctx.tree().is_none());
    }

    #[test]
    fn test_entity_json_must_be_an_object() {
        let mut ctx = MessageMLContext::default();
        let err = ctx
            .parse_messageml("<messageML>x</messageML>", Some("[1, 2]"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Error parsing EntityJSON"));
    }

    #[test]
    fn test_markdown_input_format_routes_to_import() {
        let options = ParseOptions {
            input_format: InputFormat::Markdown,
            ..ParseOptions::default()
        };
        let mut ctx = MessageMLContext::new(options);
        ctx.parse_messageml("**hi**", None).unwrap();
        assert_eq!(ctx.markdown().unwrap(), "**hi**");
        assert_eq!(
            ctx.telemetry()
                .item(BiFields::Bold.as_str())
                .and_then(|item| item.count("count")),
            Some(1)
        );
    }
}
