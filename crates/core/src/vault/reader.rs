//! Reading and writing note files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use super::extractor::extract_title;
use crate::frontmatter::{self, Frontmatter, ParsedDocument};

#[derive(Debug, Error)]
pub enum NoteReadError {
    #[error("failed to read note {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write note {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize frontmatter for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A note as read from disk, ready to be indexed.
#[derive(Debug, Clone)]
pub struct Note {
    /// Path relative to vault root.
    pub path: PathBuf,
    /// Resolved title (frontmatter, first heading, or file stem).
    pub title: String,
    /// Typed frontmatter (default when absent or invalid).
    pub frontmatter: Frontmatter,
    /// Body without the frontmatter block.
    pub content: String,
    /// Full file content; hashed for change detection.
    pub raw: String,
}

impl Note {
    /// Build a note from raw file content.
    ///
    /// `fallback_modified` fills `created`/`modified` when the frontmatter
    /// does not carry them (normally the file mtime).
    pub fn from_raw(
        path: impl Into<PathBuf>,
        raw: String,
        fallback_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let path = path.into();
        let parsed = frontmatter::parse_lenient(&raw);
        let mut fm = parsed.frontmatter.unwrap_or_default();

        if let Some(ts) = fallback_modified {
            let stamp = ts.to_rfc3339_opts(SecondsFormat::Secs, true);
            fm.modified.get_or_insert_with(|| stamp.clone());
            fm.created.get_or_insert(stamp);
        }

        let title = extract_title(Some(&fm), &parsed.body, &path);
        Self { path, title, frontmatter: fm, content: parsed.body, raw }
    }
}

/// Read a note from `vault_root/relative_path`.
pub fn read_note(vault_root: &Path, relative_path: &Path) -> Result<Note, NoteReadError> {
    let abs = vault_root.join(relative_path);
    let raw = fs::read_to_string(&abs)
        .map_err(|e| NoteReadError::Read { path: abs.clone(), source: e })?;

    let modified = fs::metadata(&abs)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    Ok(Note::from_raw(relative_path, raw, modified))
}

/// Write a document to `vault_root/relative_path`, returning the written text.
pub fn write_document(
    vault_root: &Path,
    relative_path: &Path,
    doc: &ParsedDocument,
) -> Result<String, NoteReadError> {
    let abs = vault_root.join(relative_path);
    let text = frontmatter::serialize(doc)
        .map_err(|e| NoteReadError::Serialize { path: abs.clone(), source: e })?;

    fs::write(&abs, &text).map_err(|e| NoteReadError::Write { path: abs, source: e })?;
    Ok(text)
}
