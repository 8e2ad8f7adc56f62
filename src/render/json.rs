//! JSON renderer — structured output for tooling integration.

use super::{Entry, Renderer};
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, entries: &[Entry]) -> Result<String> {
        let mut out = serde_json::to_string_pretty(entries).context("failed to encode JSON")?;
        out.push('\n');
        Ok(out)
    }
}
