//! `type name` declarations carried by parameter-like tags.

use crate::error::{Error, Result};
use crate::value::{type_name, AnnotationValue};
use serde::Serialize;

/// Type assumed when a declaration names only the variable.
pub const DEFAULT_TYPE: &str = "string";

/// A parsed `@param int $count` style declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDeclaration {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}

/// Parse one stored tag value as a declaration.
///
/// The value is split on single spaces; a lone token is the name and gets
/// [`DEFAULT_TYPE`]. Tokens past the second are dropped, so a trailing
/// description costs nothing.
pub fn parse_variable_declaration(value: &AnnotationValue, tag: &str) -> Result<VariableDeclaration> {
    let raw = value.as_str().ok_or_else(|| {
        Error::invalid_declaration(
            tag,
            format!("raw declaration must be a string, {} given", type_name(value)),
        )
    })?;
    if raw.is_empty() {
        return Err(Error::invalid_declaration(
            tag,
            "raw declaration cannot have zero length",
        ));
    }

    let mut tokens = raw.split(' ');
    let first = tokens.next().unwrap_or_default();
    let (ty, name) = match tokens.next() {
        Some(second) => (first, second),
        None => (DEFAULT_TYPE, first),
    };

    Ok(VariableDeclaration {
        ty: ty.to_string(),
        name: name.to_string(),
    })
}

/// Flatten a tag's value into the list of items to parse as declarations.
///
/// A list contributes its elements, `null` contributes nothing, anything
/// else is a single item.
pub(crate) fn declaration_items(value: Option<AnnotationValue>) -> Vec<AnnotationValue> {
    match value {
        None | Some(AnnotationValue::Null) => Vec::new(),
        Some(AnnotationValue::Array(items)) => items,
        Some(other) => vec![other],
    }
}
