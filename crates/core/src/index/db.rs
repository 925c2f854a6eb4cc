//! Database connection and read operations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row};
use thiserror::Error;

use super::schema::{SchemaError, get_schema_version, migrate};
use super::types::{IndexStats, IndexedNote, NoteQuery, NoteStatus, SearchHit};

/// Vault-local directory holding the index.
pub const INDEX_DIR: &str = ".palace";
/// Index database file name inside [`INDEX_DIR`].
pub const INDEX_FILE: &str = "index.db";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to create index directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode field: {0}")]
    Encode(#[from] serde_json::Error),
}

const NOTE_COLUMNS: &[&str] = &[
    "id",
    "path",
    "title",
    "type",
    "created",
    "modified",
    "source",
    "confidence",
    "verified",
    "content",
    "content_hash",
    "status",
    "tags",
    "related",
    "aliases",
    "domain",
    "ai_binding",
    "applies_to",
    "palace_version",
];

/// Column list for selecting notes, optionally qualified with a table alias.
pub(crate) fn note_columns(alias: Option<&str>) -> String {
    NOTE_COLUMNS
        .iter()
        .map(|c| match alias {
            Some(a) => format!("{}.{}", a, c),
            None => (*c).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Vault index database handle. One per vault.
pub struct IndexDb {
    conn: Connection,
}

impl IndexDb {
    /// Open or create the index of the vault rooted at `vault_root`
    /// (`<vault_root>/.palace/index.db`).
    pub fn open(vault_root: &Path) -> Result<Self, IndexError> {
        let dir = vault_root.join(INDEX_DIR);
        std::fs::create_dir_all(&dir)
            .map_err(|e| IndexError::CreateDir { path: dir.clone(), source: e })?;
        Self::open_at(&dir.join(INDEX_FILE))
    }

    /// Open or create an index database at an explicit file path.
    pub fn open_at(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        migrate(&conn)?;
        tracing::debug!("opened index {}", path.display());
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Get the underlying connection (for transactions).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> Result<(), IndexError> {
        self.conn.close().map_err(|(_, e)| IndexError::Database(e))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notes
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a note by its path.
    pub fn get_note_by_path(&self, path: &Path) -> Result<Option<IndexedNote>, IndexError> {
        let sql = format!("SELECT {} FROM notes WHERE path = ?1", note_columns(None));
        self.conn
            .query_row(&sql, [path.to_string_lossy()], row_to_note)
            .optional()
            .map_err(Into::into)
    }

    /// Get a note by its surrogate key.
    pub fn get_note_by_id(&self, id: i64) -> Result<Option<IndexedNote>, IndexError> {
        let sql = format!("SELECT {} FROM notes WHERE id = ?1", note_columns(None));
        self.conn.query_row(&sql, [id], row_to_note).optional().map_err(Into::into)
    }

    /// Get the stored content hash for a path (for change detection).
    pub fn get_content_hash(&self, path: &Path) -> Result<Option<String>, IndexError> {
        self.conn
            .query_row(
                "SELECT content_hash FROM notes WHERE path = ?1",
                [path.to_string_lossy()],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All indexed paths, sorted.
    pub fn get_indexed_paths(&self) -> Result<Vec<PathBuf>, IndexError> {
        let mut stmt = self.conn.prepare("SELECT path FROM notes ORDER BY path")?;
        let paths = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths.into_iter().map(PathBuf::from).collect())
    }

    /// All notes, sorted by path.
    pub fn all_notes(&self) -> Result<Vec<IndexedNote>, IndexError> {
        let sql = format!("SELECT {} FROM notes ORDER BY path", note_columns(None));
        let mut stmt = self.conn.prepare(&sql)?;
        let notes = stmt.query_map([], row_to_note)?.collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Query notes with filters, most recently modified first.
    pub fn query_notes(&self, query: &NoteQuery) -> Result<Vec<IndexedNote>, IndexError> {
        let mut sql = format!("SELECT {} FROM notes WHERE 1=1", note_columns(None));
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(note_type) = &query.note_type {
            sql.push_str(" AND type = ?");
            params_vec.push(Box::new(note_type.clone()));
        }

        if let Some(status) = &query.status {
            sql.push_str(" AND status = ?");
            params_vec.push(Box::new(status.as_str()));
        }

        if let Some(tag) = &query.tag {
            sql.push_str(" AND id IN (SELECT note_id FROM note_tags WHERE tag = ?)");
            params_vec.push(Box::new(tag.to_lowercase()));
        }

        if let Some(prefix) = &query.path_prefix {
            // Literal comparison: `_` and `%` are ordinary path characters.
            let prefix = prefix.to_string_lossy().to_string();
            sql.push_str(" AND substr(path, 1, length(?)) = ?");
            params_vec.push(Box::new(prefix.clone()));
            params_vec.push(Box::new(prefix));
        }

        if let Some(after) = &query.modified_after {
            sql.push_str(" AND modified >= ?");
            params_vec.push(Box::new(after.clone()));
        }

        if let Some(before) = &query.modified_before {
            sql.push_str(" AND modified <= ?");
            params_vec.push(Box::new(before.clone()));
        }

        sql.push_str(" ORDER BY modified DESC, path ASC");

        // SQLite requires a LIMIT before OFFSET
        match (query.limit, query.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset))
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let notes = stmt
            .query_map(params_refs.as_slice(), row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Full-text search over title and content, best match first.
    ///
    /// Every whitespace-separated word of `text` must appear; words are
    /// quoted so FTS5 operators in user input are matched literally.
    pub fn search(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>, IndexError> {
        let Some(fts_query) = fts_query(text) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {}, bm25(notes_fts) AS rank
             FROM notes_fts JOIN notes n ON n.id = notes_fts.rowid
             WHERE notes_fts MATCH ?1
             ORDER BY rank
             LIMIT ?2",
            note_columns(Some("n"))
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let hits = stmt
            .query_map(rusqlite::params![fts_query, limit as i64], |row| {
                let rank: f64 = row.get(NOTE_COLUMNS.len())?;
                Ok(SearchHit { note: row_to_note(row)?, score: -rank })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statistics
    // ─────────────────────────────────────────────────────────────────────────

    /// Summary counts for the whole index.
    pub fn get_index_stats(&self) -> Result<IndexStats, IndexError> {
        let count = |sql: &str| -> Result<i64, rusqlite::Error> {
            self.conn.query_row(sql, [], |row| row.get(0))
        };

        let mut stats = IndexStats {
            notes: count("SELECT COUNT(*) FROM notes")?,
            links: count("SELECT COUNT(*) FROM links")?,
            tags: count("SELECT COUNT(DISTINCT tag) FROM note_tags")?,
            schema_version: get_schema_version(&self.conn)?,
            ..Default::default()
        };

        stats.by_type = self.grouped_counts("SELECT type, COUNT(*) FROM notes GROUP BY type")?;
        stats.by_status =
            self.grouped_counts("SELECT status, COUNT(*) FROM notes GROUP BY status")?;

        Ok(stats)
    }

    fn grouped_counts(&self, sql: &str) -> Result<BTreeMap<String, i64>, IndexError> {
        let mut stmt = self.conn.prepare(sql)?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(counts)
    }
}

/// Build an FTS5 query that matches every word of `text` literally.
fn fts_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|word| format!("\"{}\"", word.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() { None } else { Some(terms.join(" ")) }
}

fn json_list(row: &Row, idx: usize) -> Result<Vec<String>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default())
}

pub(crate) fn row_to_note(row: &Row) -> Result<IndexedNote, rusqlite::Error> {
    let path_str: String = row.get(1)?;
    let status_str: String = row.get(11)?;
    let verified: Option<bool> = row.get(8)?;

    Ok(IndexedNote {
        id: row.get(0)?,
        path: path_str.into(),
        title: row.get(2)?,
        note_type: row.get(3)?,
        created: row.get(4)?,
        modified: row.get(5)?,
        source: row.get(6)?,
        confidence: row.get(7)?,
        verified: verified.unwrap_or(false),
        content: row.get(9)?,
        content_hash: row.get(10)?,
        status: NoteStatus::parse(&status_str),
        tags: json_list(row, 12)?,
        related: json_list(row, 13)?,
        aliases: json_list(row, 14)?,
        domain: json_list(row, 15)?,
        ai_binding: row.get(16)?,
        applies_to: json_list(row, 17)?,
        palace_version: row.get(18)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_palace_dir() {
        let vault = TempDir::new().unwrap();
        let db = IndexDb::open(vault.path()).unwrap();
        assert!(vault.path().join(".palace/index.db").exists());
        db.close().unwrap();

        // Reopening an existing index is fine
        IndexDb::open(vault.path()).unwrap();
    }

    #[test]
    fn test_fts_query_quotes_words() {
        assert_eq!(fts_query("docker compose").as_deref(), Some("\"docker\" \"compose\""));
        assert_eq!(fts_query("say \"hi\"").as_deref(), Some("\"say\" \"\"\"hi\"\"\""));
        assert_eq!(fts_query("   "), None);
    }

    #[test]
    fn test_empty_index_stats() {
        let db = IndexDb::open_in_memory().unwrap();
        let stats = db.get_index_stats().unwrap();
        assert_eq!(stats.notes, 0);
        assert_eq!(stats.links, 0);
        assert_eq!(stats.schema_version, crate::index::SCHEMA_VERSION);
    }

    #[test]
    fn test_path_prefix_is_literal() {
        let db = IndexDb::open_in_memory().unwrap();
        for path in ["my_notes/a.md", "myXnotes/b.md", "100%/c.md", "1000/d.md"] {
            db.index_note(&crate::vault::Note::from_raw(path, "# Note\n".to_string(), None))
                .unwrap();
        }

        let under = |prefix: &str| -> Vec<PathBuf> {
            let query = NoteQuery { path_prefix: Some(prefix.into()), ..Default::default() };
            let mut paths: Vec<_> =
                db.query_notes(&query).unwrap().into_iter().map(|n| n.path).collect();
            paths.sort();
            paths
        };

        assert_eq!(under("my_notes/"), vec![PathBuf::from("my_notes/a.md")]);
        assert_eq!(under("100%/"), vec![PathBuf::from("100%/c.md")]);
        assert_eq!(under("my").len(), 2);
    }

    #[test]
    fn test_unknown_path_lookups() {
        let db = IndexDb::open_in_memory().unwrap();
        assert!(db.get_note_by_path(Path::new("nope.md")).unwrap().is_none());
        assert!(db.get_content_hash(Path::new("nope.md")).unwrap().is_none());
        assert!(db.get_indexed_paths().unwrap().is_empty());
    }
}
