//! YAML frontmatter parsing for documentation scaffolds.
//!
//! A scaffold starts with a `---` line, carries a YAML mapping of `entity_*`
//! metadata, and closes it with another `---` line before the markdown body.

use std::borrow::Cow;

use anyhow::{Context, Result, anyhow};
use serde_yaml::{Mapping, Value};

/// Keys every scaffold frontmatter block must define, in reporting order.
pub const REQUIRED_SCAFFOLD_KEYS: &[&str] = &[
    "entity_id",
    "entity_name",
    "entity_type",
    "entity_language",
    "entity_status",
    "entity_path",
    "entity_dependencies",
    "entity_health_check",
];

/// Split a document into (frontmatter, body).
///
/// Returns `None` unless the document opens with `---\n` and later contains a
/// closing `\n---\n`.
pub fn split_frontmatter(contents: &str) -> Option<(&str, &str)> {
    let after = contents.strip_prefix("---\n")?;
    let end = after.find("\n---\n")?;
    Some((&after[..end], &after[end + 5..]))
}

/// Parse the frontmatter block of `contents` into a YAML mapping.
pub fn parse_frontmatter(contents: &str) -> Result<Mapping> {
    let normalized = normalize_newlines(contents);
    if !normalized.starts_with("---\n") {
        return Err(anyhow!("missing frontmatter start"));
    }
    let (frontmatter, _) =
        split_frontmatter(&normalized).ok_or_else(|| anyhow!("missing frontmatter end"))?;
    if frontmatter.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: Value = serde_yaml::from_str(frontmatter).context("parse frontmatter yaml")?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(anyhow!(
            "frontmatter must be a mapping (got {})",
            kind(&other)
        )),
    }
}

/// Return the `required` keys absent from `frontmatter`, preserving order.
pub fn missing_keys<'a>(frontmatter: &Mapping, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|key| !frontmatter.contains_key(*key))
        .collect()
}

fn normalize_newlines(contents: &str) -> Cow<'_, str> {
    if contents.contains("\r\n") {
        Cow::Owned(contents.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(contents)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
