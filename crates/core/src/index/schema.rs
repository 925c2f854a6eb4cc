//! SQLite schema definition and migrations.
//!
//! Migrations are additive and applied in order, one transaction per step.
//! The stored version is written inside the same transaction as the step, so
//! a failed step leaves the database at the previous version.

use rusqlite::Connection;
use thiserror::Error;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 4;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema version {found} is newer than supported {supported}")]
    VersionTooNew { found: i32, supported: i32 },

    #[error("Migration to version {version} ({description}) failed: {source}")]
    MigrationFailed {
        version: i32,
        description: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, description: "base tables", sql: V1_BASE },
    Migration { version: 2, description: "full-text shadow index", sql: V2_FTS },
    Migration { version: 3, description: "standards fields", sql: V3_STANDARDS },
    Migration { version: 4, description: "note revision counter", sql: V4_REVISION },
];

const V1_BASE: &str = r#"
    CREATE TABLE schema_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL
    );

    CREATE TABLE notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        type TEXT NOT NULL DEFAULT 'note',
        created TEXT,
        modified TEXT,
        source TEXT,
        confidence REAL,
        verified INTEGER NOT NULL DEFAULT 0,
        content TEXT NOT NULL DEFAULT '',
        content_hash TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        tags TEXT NOT NULL DEFAULT '[]',
        related TEXT NOT NULL DEFAULT '[]',
        aliases TEXT NOT NULL DEFAULT '[]',
        domain TEXT NOT NULL DEFAULT '[]'
    );

    CREATE INDEX idx_notes_type ON notes(type);
    CREATE INDEX idx_notes_status ON notes(status);
    CREATE INDEX idx_notes_modified ON notes(modified);

    -- Tag edges: lowercased, unique per note
    CREATE TABLE note_tags (
        note_id INTEGER NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
        tag TEXT NOT NULL,
        UNIQUE(note_id, tag)
    );

    CREATE INDEX idx_note_tags_tag ON note_tags(tag);

    -- Link edges: raw wiki-link target text, deliberately not a foreign key
    CREATE TABLE links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_id INTEGER NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
        target_path TEXT NOT NULL
    );

    CREATE INDEX idx_links_source ON links(source_id);
    CREATE INDEX idx_links_target ON links(target_path);
"#;

const V2_FTS: &str = r#"
    CREATE VIRTUAL TABLE notes_fts USING fts5(
        title,
        content,
        content='notes',
        content_rowid='id'
    );

    CREATE TRIGGER notes_fts_insert AFTER INSERT ON notes BEGIN
        INSERT INTO notes_fts(rowid, title, content)
        VALUES (new.id, new.title, new.content);
    END;

    CREATE TRIGGER notes_fts_delete AFTER DELETE ON notes BEGIN
        INSERT INTO notes_fts(notes_fts, rowid, title, content)
        VALUES ('delete', old.id, old.title, old.content);
    END;

    CREATE TRIGGER notes_fts_update AFTER UPDATE OF title, content ON notes BEGIN
        INSERT INTO notes_fts(notes_fts, rowid, title, content)
        VALUES ('delete', old.id, old.title, old.content);
        INSERT INTO notes_fts(rowid, title, content)
        VALUES (new.id, new.title, new.content);
    END;

    INSERT INTO notes_fts(notes_fts) VALUES ('rebuild');
"#;

const V3_STANDARDS: &str = r#"
    ALTER TABLE notes ADD COLUMN applies_to TEXT NOT NULL DEFAULT '[]';
    ALTER TABLE notes ADD COLUMN ai_binding TEXT;
"#;

const V4_REVISION: &str = r#"
    ALTER TABLE notes ADD COLUMN palace_version INTEGER NOT NULL DEFAULT 1;
"#;

/// Initialize or migrate the database schema to [`SCHEMA_VERSION`].
pub fn migrate(conn: &Connection) -> Result<(), SchemaError> {
    migrate_to(conn, SCHEMA_VERSION)
}

/// Migrate up to `target`, one transaction per step.
pub(crate) fn migrate_to(conn: &Connection, target: i32) -> Result<(), SchemaError> {
    let version = get_schema_version(conn)?;

    if version > SCHEMA_VERSION {
        return Err(SchemaError::VersionTooNew { found: version, supported: SCHEMA_VERSION });
    }

    for step in MIGRATIONS.iter().filter(|m| m.version > version && m.version <= target) {
        apply_step(conn, step).map_err(|source| SchemaError::MigrationFailed {
            version: step.version,
            description: step.description,
            source,
        })?;
        tracing::info!("index schema migrated to v{} ({})", step.version, step.description);
    }

    Ok(())
}

fn apply_step(conn: &Connection, step: &Migration) -> Result<(), rusqlite::Error> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(step.sql)?;
    tx.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
        [step.version],
    )?;
    tx.commit()
}

/// Read the stored schema version (0 for a fresh database).
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        conn.prepare(&format!("PRAGMA table_info({})", table))
            .unwrap()
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_init_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in ["notes", "note_tags", "links", "schema_version", "notes_fts"] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }

        let columns = column_names(&conn, "notes");
        for column in ["ai_binding", "applies_to", "palace_version", "content_hash"] {
            assert!(columns.contains(&column.to_string()), "missing column {column}");
        }
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_upgrade_from_v1_keeps_rows_and_fills_fts() {
        let conn = Connection::open_in_memory().unwrap();
        migrate_to(&conn, 1).unwrap();
        conn.execute(
            "INSERT INTO notes (path, title, content, content_hash)
             VALUES ('a.md', 'Alpha', 'kubernetes cluster', 'h1')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT palace_version FROM notes WHERE path = 'a.md'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);

        let hits: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM notes_fts WHERE notes_fts MATCH 'kubernetes'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_failed_step_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        migrate_to(&conn, 2).unwrap();

        // Make step 3 collide halfway through.
        conn.execute_batch("ALTER TABLE notes ADD COLUMN ai_binding TEXT").unwrap();

        let err = migrate(&conn).unwrap_err();
        assert!(matches!(err, SchemaError::MigrationFailed { version: 3, .. }));

        assert_eq!(get_schema_version(&conn).unwrap(), 2);
        assert!(!column_names(&conn, "notes").contains(&"applies_to".to_string()));
    }

    #[test]
    fn test_rejects_newer_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute("UPDATE schema_version SET version = 99", []).unwrap();

        assert!(matches!(
            migrate(&conn),
            Err(SchemaError::VersionTooNew { found: 99, supported: SCHEMA_VERSION })
        ));
    }
}
