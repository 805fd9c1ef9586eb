use super::markdown::split_markdown;
use super::types::Section;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;

/// Load an ordered section list from disk.
///
/// `.json` files hold either `[{"title", "content"}]` or a `{title: content}`
/// object; anything else is split as markdown.
pub async fn load_sections(path: &Path) -> Result<Vec<Section>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed reading book: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        sections_from_json(&raw).with_context(|| format!("invalid section list: {}", path.display()))
    } else {
        Ok(split_markdown(&raw))
    }
}

pub fn sections_from_json(raw: &str) -> Result<Vec<Section>> {
    let value: Value = serde_json::from_str(raw).context("book is not valid JSON")?;
    match value {
        Value::Array(_) => {
            serde_json::from_value(value).context("expected a list of {title, content} objects")
        }
        Value::Object(map) => map
            .into_iter()
            .map(|(title, content)| match content {
                Value::String(content) => Ok(Section::new(title, content)),
                other => bail!("section {title} has non-string content: {other}"),
            })
            .collect(),
        other => bail!("expected an array or object of sections, found {other}"),
    }
}
