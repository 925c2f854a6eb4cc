//! Note content extraction: title and wiki-links.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::frontmatter::Frontmatter;

/// A wiki-link occurrence in note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Raw target text, as written before any `|`.
    pub target: String,
    /// Display text after `|`, if present.
    pub display: Option<String>,
    /// Line number where the link appears (1-based).
    pub line_number: u32,
}

// Matches [[target]] or [[target|display]]; target may carry a #section.
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]").expect("valid wikilink regex")
});

/// Regex matching a single wiki-link. Capture 1 is the target, 2 the display.
pub fn wikilink_regex() -> &'static Regex {
    &WIKILINK_RE
}

/// Extract every wiki-link occurrence from content, in document order.
///
/// Duplicates are kept: two `[[Docker]]` produce two entries.
pub fn extract_wiki_links(content: &str) -> Vec<WikiLink> {
    let mut links = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        for cap in WIKILINK_RE.captures_iter(line) {
            let target = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if target.is_empty() {
                continue;
            }
            links.push(WikiLink {
                target: target.to_string(),
                display: cap.get(2).map(|m| m.as_str().to_string()),
                line_number: (line_idx + 1) as u32,
            });
        }
    }

    links
}

/// Normalize a raw link target for name comparison.
///
/// Drops any `#section` anchor and a trailing `.md`, trims whitespace and
/// lowercases: `"Research/Docker.md#Setup"` becomes `"research/docker"`.
pub fn normalize_target(raw: &str) -> String {
    let without_section = raw.split('#').next().unwrap_or(raw).trim();
    let lower = without_section.to_lowercase();
    lower.strip_suffix(".md").map(str::to_string).unwrap_or(lower)
}

/// Names under which a note can be referenced by a wiki-link, normalized.
///
/// Covers the title, the file stem, the relative path without extension and
/// every alias.
pub fn reference_names(title: &str, path: &Path, aliases: &[String]) -> Vec<String> {
    let mut names = vec![normalize_target(title)];

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        names.push(normalize_target(stem));
    }
    names.push(normalize_target(&path.to_string_lossy()));
    names.extend(aliases.iter().map(|a| normalize_target(a)));

    names.retain(|n| !n.is_empty());
    names.sort();
    names.dedup();
    names
}

/// Resolve a note title: frontmatter > first heading > file stem.
pub fn extract_title(fm: Option<&Frontmatter>, body: &str, file_path: &Path) -> String {
    if let Some(title) = fm.and_then(|fm| fm.title.as_deref())
        && !title.trim().is_empty()
    {
        return title.trim().to_string();
    }

    for line in body.lines() {
        let trimmed = line.trim();
        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    file_path.file_stem().and_then(|s| s.to_str()).unwrap_or("Untitled").to_string()
}
