//! Data structures for retroactive linking.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::frontmatter::FrontmatterParseError;
use crate::index::{IndexDb, IndexError, IndexedNote};
use crate::vault::NoteReadError;

/// Default cap on notes rewritten by one apply call.
pub const DEFAULT_MAX_NOTES: usize = 10;

/// Line snippets shown per candidate in a preview.
pub const PREVIEW_SNIPPETS: usize = 3;

/// Errors that can occur during retroactive linking.
#[derive(Debug, Error)]
pub enum RetroError {
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error(transparent)]
    Note(#[from] NoteReadError),

    #[error("invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterParseError,
    },

    #[error("note not found in index: {0}")]
    TargetNotIndexed(PathBuf),
}

/// The note whose mentions are being linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetroTarget {
    /// Canonical title; spliced links use it verbatim.
    pub title: String,
    /// Path relative to vault root. This note is never scanned.
    pub path: PathBuf,
    pub aliases: Vec<String>,
}

impl RetroTarget {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>, aliases: Vec<String>) -> Self {
        Self { title: title.into(), path: path.into(), aliases }
    }

    pub fn from_note(note: &IndexedNote) -> Self {
        Self::new(note.title.clone(), note.path.clone(), note.aliases.clone())
    }

    /// Look the target up in the index by path.
    pub fn load(db: &IndexDb, path: &Path) -> Result<Self, RetroError> {
        db.get_note_by_path(path)?
            .map(|note| Self::from_note(&note))
            .ok_or_else(|| RetroError::TargetNotIndexed(path.to_path_buf()))
    }

    /// Search terms in priority order: title, then aliases. Blank and
    /// case-insensitive duplicate terms are dropped.
    pub fn terms(&self) -> Vec<&str> {
        let mut seen: Vec<String> = Vec::new();
        let mut terms = Vec::new();

        for term in std::iter::once(&self.title).chain(&self.aliases) {
            let term = term.trim();
            let key = term.to_lowercase();
            if term.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            terms.push(term);
        }

        terms
    }
}

/// A single unlinked mention inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionMatch {
    /// Line number (1-based).
    pub line: usize,
    /// Character offset of the match within the line (0-based).
    pub column: usize,
    /// Byte offset of the match within the line, for splicing.
    pub byte_offset: usize,
    /// Text as written in the note.
    pub matched_text: String,
    /// Search term that produced the match.
    pub term: String,
    /// The whole line, trimmed.
    pub context: String,
}

/// A note containing one or more unlinked mentions.
#[derive(Debug, Clone, Serialize)]
pub struct UnlinkedMention {
    pub path: PathBuf,
    pub title: String,
    pub matches: Vec<MentionMatch>,
    pub mention_count: usize,
}

/// A line excerpt shown in a preview.
#[derive(Debug, Clone, Serialize)]
pub struct MentionSnippet {
    pub line: usize,
    pub text: String,
}

/// Preview entry for one candidate note.
#[derive(Debug, Clone, Serialize)]
pub struct CandidatePreview {
    pub path: PathBuf,
    pub title: String,
    pub mention_count: usize,
    /// Up to [`PREVIEW_SNIPPETS`] distinct lines.
    pub snippets: Vec<MentionSnippet>,
}

/// What retroactive linking would change, without touching any file.
#[derive(Debug, Clone, Serialize)]
pub struct RetroPreview {
    pub target: RetroTarget,
    pub candidates: Vec<CandidatePreview>,
    pub total_mentions: usize,
}

impl RetroPreview {
    pub fn notes_affected(&self) -> usize {
        self.candidates.len()
    }
}

/// Options for an apply call.
#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    /// Without confirmation nothing is written and the preview is returned.
    pub confirm: bool,
    /// Maximum number of candidate notes to rewrite.
    pub max_notes: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self { confirm: false, max_notes: DEFAULT_MAX_NOTES }
    }
}

/// A note that was rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedNote {
    pub path: PathBuf,
    /// Number of mentions turned into links.
    pub links_added: usize,
    /// Whether the target was appended to `related`.
    pub related_added: bool,
}

/// A note that could not be rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct NoteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a confirmed apply call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub applied: Vec<AppliedNote>,
    pub errors: Vec<NoteFailure>,
    /// Candidates left untouched because of `max_notes`.
    pub remaining: usize,
}

impl ApplyReport {
    pub fn links_added(&self) -> usize {
        self.applied.iter().map(|n| n.links_added).sum()
    }
}

/// Outcome of [`apply_retroactive_links_with_confirmation`](super::apply_retroactive_links_with_confirmation).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApplyOutcome {
    /// Not confirmed: nothing was written.
    Preview(RetroPreview),
    Applied(ApplyReport),
}
