//! Shared fixtures for the integration tests.

use messageml_utils::{
    IdAllocator, MessageMLContext, ParseOptions, StaticUserDirectory, UserPresentation,
};

/// Sequential ids for both entities and generated elements, so rendered
/// output is deterministic.
#[derive(Debug, Default)]
pub struct CountingIds {
    entities: u32,
    elements: u32,
}

impl IdAllocator for CountingIds {
    fn entity_id(&mut self, prefix: &str) -> String {
        self.entities += 1;
        format!("{prefix}{}", self.entities)
    }

    fn element_id(&mut self, prefix: &str) -> String {
        self.elements += 1;
        format!("{prefix}-{}", self.elements)
    }

    fn reset(&mut self) {
        *self = CountingIds::default();
    }
}

pub fn users() -> StaticUserDirectory {
    StaticUserDirectory::new()
        .with_user(UserPresentation::new(1, "bot.user1", "Bot User01").with_email("bot@example.com"))
        .with_user(UserPresentation::new(42, "jdoe", "Jane Doe"))
}

pub fn context() -> MessageMLContext {
    context_with(ParseOptions::default())
}

pub fn context_with(options: ParseOptions) -> MessageMLContext {
    MessageMLContext::new(options)
        .with_users(users())
        .with_allocator(CountingIds::default())
}

/// Parse `message` and return its PresentationML and compact entity JSON
pub fn render(message: &str) -> (String, String) {
    let mut ctx = context();
    ctx.parse_messageml(message, None).expect("message to parse");
    let pml = ctx.presentationml().expect("presentationml to render");
    let json = serde_json::to_string(&ctx.entity_json().expect("entity json")).expect("json");
    (pml, json)
}

pub fn parse_error(message: &str) -> String {
    let mut ctx = context();
    ctx.parse_messageml(message, None)
        .expect_err("message to be rejected")
        .to_string()
}
