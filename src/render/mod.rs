//! Renderer module — trait-based format dispatch.

pub mod json;
pub mod text;

use anyhow::anyhow;
use docblock::{AnnotationValue, VariableDeclaration};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// What was read for one declaration.
#[derive(Debug, Serialize)]
pub struct Entry {
    /// Source file, absent in stdin mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// `Class`, `Class::method`, or `-` for a raw comment
    pub target: String,
    #[serde(flatten)]
    pub result: QueryResult,
}

/// Result of the query selected on the command line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResult {
    Parameters(Parameters),
    Value(Option<AnnotationValue>),
    Declarations(Vec<VariableDeclaration>),
}

/// All annotations of a comment, each with its occurrences in order.
///
/// Serializes like `AnnotationParser::parameters`: one occurrence is the
/// value itself, several become a list.
#[derive(Debug, Default)]
pub struct Parameters(pub Vec<(String, Vec<AnnotationValue>)>);

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, values) in &self.0 {
            match values.as_slice() {
                [single] => map.serialize_entry(key, single)?,
                many => map.serialize_entry(key, many)?,
            }
        }
        map.end()
    }
}

/// Trait for rendering query results into a specific output format.
pub trait Renderer {
    fn render(&self, entries: &[Entry]) -> anyhow::Result<String>;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> anyhow::Result<Box<dyn Renderer>> {
    match format {
        "json" => Ok(Box::new(json::JsonRenderer)),
        "text" | "txt" => Ok(Box::new(text::TextRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use json or text", format)),
    }
}
