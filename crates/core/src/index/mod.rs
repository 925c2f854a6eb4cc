//! Vault index for fast queries on notes and links.
//!
//! This module provides SQLite-based indexing for:
//! - Note metadata (path, type, title, typed frontmatter fields)
//! - Tag edges and raw wiki-link edges between notes
//! - Full-text search over title and content (FTS5, trigger-maintained)
//!
//! # Example
//!
//! ```no_run
//! use palace_core::index::{IndexBuilder, IndexDb, NoteQuery};
//! use std::path::Path;
//!
//! let vault = Path::new("/path/to/vault");
//! let db = IndexDb::open(vault).unwrap();
//! IndexBuilder::new(&db, vault).sync(None).unwrap();
//!
//! let tagged = db
//!     .query_notes(&NoteQuery { tag: Some("docker".into()), ..Default::default() })
//!     .unwrap();
//! ```

pub mod builder;
pub mod db;
pub mod schema;
pub mod sync;
pub mod types;

pub use builder::{BuilderError, IndexBuilder, ProgressCallback, SyncReport};
pub use db::{INDEX_DIR, INDEX_FILE, IndexDb, IndexError};
pub use schema::{SCHEMA_VERSION, SchemaError, migrate};
pub use types::{
    IndexStats, IndexedNote, NoteQuery, NoteStatus, SearchHit, SyncOutcome,
};
