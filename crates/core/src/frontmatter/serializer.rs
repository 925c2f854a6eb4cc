//! Frontmatter serialization back to markdown.

use super::types::{Frontmatter, ParsedDocument};

/// Serialize a parsed document back to a markdown string.
pub fn serialize(doc: &ParsedDocument) -> Result<String, serde_yaml::Error> {
    if let Some(fm) = &doc.frontmatter
        && !fm.is_empty()
    {
        let yaml = frontmatter_to_yaml(fm)?;
        return Ok(format!("---\n{}---\n{}", yaml, doc.body));
    }
    Ok(doc.body.clone())
}

/// Serialize a Frontmatter struct to YAML string (without delimiters).
pub fn frontmatter_to_yaml(fm: &Frontmatter) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(fm)
}
