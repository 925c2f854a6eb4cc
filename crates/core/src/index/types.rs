//! Index data types for vault notes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Lifecycle status of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Active,
    /// Placeholder created for a link target that has no content yet.
    Stub,
    Archived,
}

impl NoteStatus {
    /// Parse status from string (case-insensitive). Unknown values are active.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "stub" => Self::Stub,
            "archived" | "archive" => Self::Archived,
            _ => Self::Active,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Stub => "stub",
            Self::Archived => "archived",
        }
    }
}

/// A note row in the vault index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedNote {
    /// Surrogate key.
    pub id: i64,
    /// Path relative to vault root.
    pub path: PathBuf,
    pub title: String,
    /// Free-form type tag from frontmatter `type:` (`"note"` when absent).
    pub note_type: String,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
    pub verified: bool,
    /// Note body (frontmatter excluded).
    pub content: String,
    pub content_hash: String,
    pub status: NoteStatus,
    pub tags: Vec<String>,
    pub related: Vec<String>,
    pub aliases: Vec<String>,
    pub domain: Vec<String>,
    pub ai_binding: Option<String>,
    pub applies_to: Vec<String>,
    pub palace_version: i64,
}

/// Outcome of indexing a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No row existed for the path.
    Inserted,
    /// The stored hash differed; row and edges were rewritten.
    Updated,
    /// The stored hash matched; nothing was written.
    Unchanged,
}

/// Query filter for listing notes.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    /// Filter by type tag (exact match).
    pub note_type: Option<String>,
    pub status: Option<NoteStatus>,
    /// Filter by tag (case-insensitive).
    pub tag: Option<String>,
    /// Filter by path prefix.
    pub path_prefix: Option<PathBuf>,
    /// Modified at or after this timestamp (string comparison on RFC 3339).
    pub modified_after: Option<String>,
    /// Modified at or before this timestamp.
    pub modified_before: Option<String>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

/// A full-text search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub note: IndexedNote,
    /// Relevance score (higher = more relevant).
    pub score: f64,
}

/// Summary statistics of a vault index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub notes: i64,
    pub links: i64,
    /// Distinct tags.
    pub tags: i64,
    pub by_type: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
    pub schema_version: i32,
}
