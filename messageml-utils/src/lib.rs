//! Parsing, validation and rendering of MessageML chat messages
//!
//!     MessageML is the XML dialect bots and integrations author messages in.
//!     This crate parses it (or PresentationML, the sanitized dialect clients
//!     display, or CommonMark) into one validated element tree, and projects
//!     that tree into four independent artifacts:
//!         - PresentationML markup,
//!         - Markdown for plain-text clients,
//!         - the entity JSON keyed by `data-entity-id`,
//!         - the legacy flat entities document.
//!
//!     This is a pure lib: nothing here reads files, the environment or
//!     global configuration. Knobs travel in [`ParseOptions`], built by the
//!     caller (usually from `messageml-config`).
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # MessageMLError and the violation families
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── context.rs              # MessageMLContext: parse once, render many
//!     ├── elements                # ElementKind, arena Tree, attribute table
//!     ├── parser                  # roxmltree source → Tree, both dialects
//!     ├── validate                # content-model and attribute rules per kind
//!     ├── entity                  # entity JSON records, resolution, schemas
//!     ├── formats
//!     │   ├── messageml           # input only
//!     │   ├── presentationml      # writer + serializer
//!     │   ├── markdown            # nodes + serializer, comrak import
//!     │   └── entityjson          # entity JSON and legacy entities
//!     ├── bi.rs                   # usage telemetry
//!     ├── ids.rs                  # entity and element id allocation
//!     ├── users.rs                # user lookups for mentions
//!     └── options.rs              # limits and dialect settings
//!
//! Core Algorithms
//!
//!     The parser builds the tree depth-first and validates every node once,
//!     after its children are built; the first violation aborts the parse and
//!     no partial tree is returned. Attribute legality is a pure function of
//!     (kind, dialect, name), listed in `elements::attributes`. Attributes are
//!     stored under their authoring names, so a tree parsed from the
//!     PresentationML rendering of a message is content-equal to the tree the
//!     message was parsed into.
//!
//! Usage
//!
//! ```ignore
//! let mut ctx = MessageMLContext::default();
//! ctx.parse_messageml("<messageML>Hello <cash tag=\"world\"/>!</messageML>", None)?;
//! let pml = ctx.presentationml()?;
//! let markdown = ctx.markdown()?;
//! let entities = ctx.entity_json()?;
//! ```

pub mod bi;
pub mod context;
pub mod elements;
pub mod entity;
pub mod error;
pub mod format;
pub mod formats;
pub mod ids;
pub mod options;
pub mod parser;
pub mod registry;
pub mod users;
pub mod validate;

pub use bi::{BiContext, BiFields, BiItem, TelemetrySink};
pub use context::MessageMLContext;
pub use elements::{Dialect, ElementKind, NodeId, Tree};
pub use entity::{EntitySchemas, SchemaValidator, SchemaViolation};
pub use error::{MessageMLError, Result, Violation};
pub use format::Format;
pub use ids::{DefaultIdAllocator, IdAllocator, ShortId};
pub use options::{InputFormat, Limits, ParseOptions};
pub use parser::ParseContext;
pub use registry::FormatRegistry;
pub use users::{StaticUserDirectory, UserDirectory, UserPresentation};
