//! Plain text renderer — one `@key value` line per tag occurrence.

use super::{Entry, QueryResult, Renderer};
use anyhow::Result;
use docblock::AnnotationValue;

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, entries: &[Entry]) -> Result<String> {
        let mut out = String::new();
        for entry in entries {
            match entry.file {
                Some(ref file) => out.push_str(&format!("{} {}\n", file, entry.target)),
                None => out.push_str(&format!("{}\n", entry.target)),
            }

            match entry.result {
                QueryResult::Parameters(ref params) => {
                    for (key, values) in &params.0 {
                        for value in values {
                            push_tag_line(&mut out, key, value);
                        }
                    }
                }
                QueryResult::Value(Some(ref value)) => out.push_str(&format!("  {}\n", show(value))),
                QueryResult::Value(None) => out.push_str("  (not found)\n"),
                QueryResult::Declarations(ref decls) => {
                    for decl in decls {
                        out.push_str(&format!("  {} {}\n", decl.ty, decl.name));
                    }
                }
            }
        }
        Ok(out)
    }
}

fn push_tag_line(out: &mut String, key: &str, value: &AnnotationValue) {
    match value {
        AnnotationValue::Bool(true) => out.push_str(&format!("  @{}\n", key)),
        other => out.push_str(&format!("  @{} {}\n", key, show(other))),
    }
}

/// Strings print bare, everything else as compact JSON.
fn show(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
