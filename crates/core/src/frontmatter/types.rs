//! Frontmatter types and data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// Typed YAML frontmatter of a vault note.
///
/// Known fields are explicit; anything else is kept in `extra` so that a
/// rewrite of the note never drops user data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "string_or_seq", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "string_or_seq", skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,

    #[serde(default, deserialize_with = "string_or_seq", skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, deserialize_with = "string_or_seq", skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,

    /// Binding level of a standards note (e.g. `required`, `recommended`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_binding: Option<String>,

    #[serde(default, deserialize_with = "string_or_seq", skip_serializing_if = "Vec::is_empty")]
    pub applies_to: Vec<String>,

    /// Monotonic per-note revision counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palace_version: Option<i64>,

    /// Fields not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Frontmatter {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
}

/// Accept either a single scalar or a sequence of scalars.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(&other).into_iter().collect(),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
