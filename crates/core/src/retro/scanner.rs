//! Unlinked mention detection.
//!
//! Content is scanned line by line. Skipped entirely: fenced code blocks,
//! heading lines, and any line that already links to the target. Raw
//! documents passed to [`scan_content`] also have their leading frontmatter
//! block skipped; indexed bodies are already stripped of it. On the remaining lines each term match is dropped when it
//! overlaps a wiki-link, inline code, a markdown link or a bare URL.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{MentionMatch, RetroTarget, UnlinkedMention};
use crate::index::IndexDb;
use crate::vault::{normalize_target, reference_names, wikilink_regex};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}(\s|$)").expect("valid heading regex"));

// Any [[...]] span, including ones the link extractor would reject.
static WIKILINK_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\]]*\]\]").expect("valid wikilink span regex"));

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[[^\]]*\]\([^)]*\)").expect("valid markdown link regex"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:(?:https?|ftp)://|www\.)[^\s)>\]]+").expect("valid url regex")
});

/// Mention matcher for one target. Build one per scan.
pub struct MentionScanner {
    /// (term, compiled pattern) in priority order.
    terms: Vec<(String, Regex)>,
    /// Normalized names a wiki-link may use for the target.
    names: Vec<String>,
}

impl MentionScanner {
    pub fn new(target: &RetroTarget) -> Self {
        let terms = target
            .terms()
            .into_iter()
            .filter_map(|term| match Regex::new(&term_pattern(term)) {
                Ok(re) => Some((term.to_string(), re)),
                Err(e) => {
                    tracing::warn!("skipping search term {:?}: {}", term, e);
                    None
                }
            })
            .collect();

        Self { terms, names: reference_names(&target.title, &target.path, &target.aliases) }
    }

    /// Scan a note body (frontmatter already removed) and return surviving
    /// matches in document order. A leading `---` is a thematic break here.
    pub fn scan(&self, body: &str) -> Vec<MentionMatch> {
        self.scan_from(body, 0)
    }

    /// Scan a raw document, skipping its leading frontmatter block.
    pub fn scan_document(&self, content: &str) -> Vec<MentionMatch> {
        self.scan_from(content, frontmatter_lines(content))
    }

    fn scan_from(&self, content: &str, body_start: usize) -> Vec<MentionMatch> {
        let mut matches = Vec::new();
        if self.terms.is_empty() {
            return matches;
        }

        let mut in_fence = false;

        for (idx, line) in content.lines().enumerate().skip(body_start) {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence || HEADING_RE.is_match(line) || self.links_to_target(line) {
                continue;
            }

            let protected = protected_spans(line);
            let mut taken: Vec<Range<usize>> = Vec::new();
            let mut line_matches = Vec::new();

            for (term, re) in &self.terms {
                for m in re.find_iter(line) {
                    let range = m.range();
                    if overlaps_any(&range, &protected)
                        || overlaps_any(&range, &taken)
                        || in_inline_code(line, range.start)
                    {
                        continue;
                    }

                    taken.push(range.clone());
                    line_matches.push(MentionMatch {
                        line: idx + 1,
                        column: line[..range.start].chars().count(),
                        byte_offset: range.start,
                        matched_text: m.as_str().to_string(),
                        term: term.clone(),
                        context: line.trim().to_string(),
                    });
                }
            }

            line_matches.sort_by_key(|m| m.column);
            matches.extend(line_matches);
        }

        matches
    }

    fn links_to_target(&self, line: &str) -> bool {
        wikilink_regex().captures_iter(line).any(|cap| {
            cap.get(1)
                .map(|t| self.names.binary_search(&normalize_target(t.as_str())).is_ok())
                .unwrap_or(false)
        })
    }
}

/// Scan a single raw document for unlinked mentions of `target`.
pub fn scan_content(content: &str, target: &RetroTarget) -> Vec<MentionMatch> {
    MentionScanner::new(target).scan_document(content)
}

/// Find every other indexed note mentioning `target` without linking it.
///
/// Notes are returned in path order; each carries its surviving matches.
pub fn find_unlinked_mentions(
    db: &IndexDb,
    target: &RetroTarget,
) -> Result<Vec<UnlinkedMention>, crate::index::IndexError> {
    let scanner = MentionScanner::new(target);
    let mut found = Vec::new();

    for note in db.all_notes()? {
        if note.path == target.path {
            continue;
        }

        let matches = scanner.scan(&note.content);
        if matches.is_empty() {
            continue;
        }

        tracing::debug!("{}: {} unlinked mentions", note.path.display(), matches.len());
        found.push(UnlinkedMention {
            path: note.path,
            title: note.title,
            mention_count: matches.len(),
            matches,
        });
    }

    Ok(found)
}

/// Case-insensitive pattern for a literal term. Word boundaries are only
/// asserted on edges that are word characters.
fn term_pattern(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if term.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let trail = if term.chars().last().is_some_and(is_word) { r"\b" } else { "" };
    format!("(?i){}{}{}", lead, regex::escape(term), trail)
}

/// Number of leading lines taken by a frontmatter block (0 if none).
fn frontmatter_lines(content: &str) -> usize {
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return 0;
    }

    lines
        .position(|l| l.trim_end() == "---")
        .map(|closing| closing + 2)
        .unwrap_or(0)
}

fn protected_spans(line: &str) -> Vec<Range<usize>> {
    [&*WIKILINK_SPAN_RE, &*MARKDOWN_LINK_RE, &*URL_RE]
        .into_iter()
        .flat_map(|re| re.find_iter(line).map(|m| m.range()))
        .collect()
}

fn overlaps_any(range: &Range<usize>, spans: &[Range<usize>]) -> bool {
    spans.iter().any(|s| range.start < s.end && s.start < range.end)
}

/// Inside inline code when an odd number of backticks precede the offset.
fn in_inline_code(line: &str, offset: usize) -> bool {
    line[..offset].bytes().filter(|&b| b == b'`').count() % 2 == 1
}
