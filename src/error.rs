//! Error types for reading annotations.

use thiserror::Error;

/// Errors raised by the reader.
///
/// Parsing itself never fails: absent tags, malformed bodies and values that
/// are not JSON all come back as data. Only the two cases below are errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No usable class (or method) name was given to resolve a doc comment from.
    #[error("empty declaration reference: a class name is required{}", method_hint(.method))]
    EmptyReference { method: Option<String> },

    /// A declaration tag holds something other than a non-empty string.
    #[error("invalid declaration in @{tag}: {reason}")]
    InvalidDeclaration { tag: String, reason: String },
}

impl Error {
    pub(crate) fn invalid_declaration(tag: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

fn method_hint(method: &Option<String>) -> String {
    match method {
        Some(m) if !m.is_empty() => format!(" (method '{}' given without a class)", m),
        Some(_) => " (method name is empty)".to_string(),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
