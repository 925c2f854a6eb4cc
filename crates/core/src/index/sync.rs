//! Index synchronizer: keeps note rows, tag edges and link edges in step with
//! note content.
//!
//! Every mutation runs in a single transaction. A note's tag and link edges
//! are always deleted and re-derived as a whole; there is no edge diffing.

use std::path::Path;

use rusqlite::{OptionalExtension, params};

use super::db::{IndexDb, IndexError};
use super::types::{NoteStatus, SyncOutcome};
use crate::vault::{Note, content_hash, extract_wiki_links};

impl IndexDb {
    /// Index a note, skipping all writes when its content hash is unchanged.
    pub fn index_note(&self, note: &Note) -> Result<SyncOutcome, IndexError> {
        let hash = content_hash(&note.raw);
        let path = note.path.to_string_lossy();

        let stored: Option<String> = self
            .connection()
            .query_row("SELECT content_hash FROM notes WHERE path = ?1", [&path], |row| {
                row.get(0)
            })
            .optional()?;

        if stored.as_deref() == Some(hash.as_str()) {
            tracing::debug!("unchanged: {}", path);
            return Ok(SyncOutcome::Unchanged);
        }

        let fm = &note.frontmatter;
        let tx = self.connection().unchecked_transaction()?;

        tx.execute(
            "INSERT INTO notes (
                path, title, type, created, modified, source, confidence, verified,
                content, content_hash, status, tags, related, aliases, domain,
                ai_binding, applies_to, palace_version
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
             ON CONFLICT(path) DO UPDATE SET
                title = excluded.title,
                type = excluded.type,
                created = excluded.created,
                modified = excluded.modified,
                source = excluded.source,
                confidence = excluded.confidence,
                verified = excluded.verified,
                content = excluded.content,
                content_hash = excluded.content_hash,
                status = excluded.status,
                tags = excluded.tags,
                related = excluded.related,
                aliases = excluded.aliases,
                domain = excluded.domain,
                ai_binding = excluded.ai_binding,
                applies_to = excluded.applies_to,
                palace_version = MAX(excluded.palace_version, notes.palace_version + 1)",
            params![
                path,
                note.title,
                fm.note_type.as_deref().unwrap_or("note"),
                fm.created,
                fm.modified,
                fm.source,
                fm.confidence,
                fm.verified.unwrap_or(false),
                note.content,
                hash,
                fm.status.as_deref().map(NoteStatus::parse).unwrap_or_default().as_str(),
                serde_json::to_string(&fm.tags)?,
                serde_json::to_string(&fm.related)?,
                serde_json::to_string(&fm.aliases)?,
                serde_json::to_string(&fm.domain)?,
                fm.ai_binding,
                serde_json::to_string(&fm.applies_to)?,
                fm.palace_version.unwrap_or(1),
            ],
        )?;

        let note_id: i64 =
            tx.query_row("SELECT id FROM notes WHERE path = ?1", [&path], |row| row.get(0))?;

        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", [note_id])?;
        tx.execute("DELETE FROM links WHERE source_id = ?1", [note_id])?;

        {
            let mut insert_tag =
                tx.prepare("INSERT OR IGNORE INTO note_tags (note_id, tag) VALUES (?1, ?2)")?;
            for tag in fm.tags.iter().filter_map(|t| normalize_tag(t)) {
                insert_tag.execute(params![note_id, tag])?;
            }

            let mut insert_link =
                tx.prepare("INSERT INTO links (source_id, target_path) VALUES (?1, ?2)")?;
            for link in extract_wiki_links(&note.content) {
                insert_link.execute(params![note_id, link.target])?;
            }
        }

        tx.commit()?;

        let outcome =
            if stored.is_some() { SyncOutcome::Updated } else { SyncOutcome::Inserted };
        tracing::debug!("{:?}: {}", outcome, path);
        Ok(outcome)
    }

    /// Remove a note and all of its edges. Returns false for unknown paths.
    pub fn remove_from_index(&self, path: &Path) -> Result<bool, IndexError> {
        let tx = self.connection().unchecked_transaction()?;

        let note_id: Option<i64> = tx
            .query_row("SELECT id FROM notes WHERE path = ?1", [path.to_string_lossy()], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(note_id) = note_id else {
            return Ok(false);
        };

        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", [note_id])?;
        tx.execute("DELETE FROM links WHERE source_id = ?1", [note_id])?;
        tx.execute("DELETE FROM notes WHERE id = ?1", [note_id])?;
        tx.commit()?;

        tracing::debug!("removed: {}", path.display());
        Ok(true)
    }

    /// True if `path` is not indexed or was indexed with different content.
    pub fn needs_reindex(&self, path: &Path, content: &str) -> Result<bool, IndexError> {
        let stored = self.get_content_hash(path)?;
        Ok(stored.as_deref() != Some(content_hash(content).as_str()))
    }

    /// Delete every note, tag edge and link edge.
    pub fn clear_index(&self) -> Result<(), IndexError> {
        let tx = self.connection().unchecked_transaction()?;
        tx.execute_batch(
            "DELETE FROM note_tags;
             DELETE FROM links;
             DELETE FROM notes;",
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Rebuild the full-text shadow index from the notes table.
    pub fn rebuild_fts_index(&self) -> Result<(), IndexError> {
        self.connection().execute("INSERT INTO notes_fts(notes_fts) VALUES ('rebuild')", [])?;
        Ok(())
    }
}

fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#').to_lowercase();
    if tag.is_empty() { None } else { Some(tag) }
}
