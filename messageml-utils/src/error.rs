//! Error types for MessageML processing

use thiserror::Error;

/// Rule family a content failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Wrong parent or child, child-count limits, missing required child
    Structure,
    /// Unknown, missing or malformed attribute for the tag/dialect pair
    Attribute,
    /// Entity reference that does not agree with the entity JSON
    Entity,
}

/// Errors that can occur while parsing or rendering a message
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageMLError {
    /// The message content is invalid. The caller must fix and resubmit it.
    #[error("{message}")]
    InvalidInput {
        violation: Violation,
        message: String,
    },
    /// Plumbing failure: malformed document, broken schema, output failure
    #[error("Processing error: {0}")]
    Processing(String),
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl MessageMLError {
    pub fn structure(message: impl Into<String>) -> Self {
        MessageMLError::InvalidInput {
            violation: Violation::Structure,
            message: message.into(),
        }
    }

    pub fn attribute(message: impl Into<String>) -> Self {
        MessageMLError::InvalidInput {
            violation: Violation::Attribute,
            message: message.into(),
        }
    }

    pub fn entity(message: impl Into<String>) -> Self {
        MessageMLError::InvalidInput {
            violation: Violation::Entity,
            message: message.into(),
        }
    }

    /// The violation family, for content failures only
    pub fn violation(&self) -> Option<Violation> {
        match self {
            MessageMLError::InvalidInput { violation, .. } => Some(*violation),
            _ => None,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.violation().is_some()
    }
}

pub type Result<T> = std::result::Result<T, MessageMLError>;
