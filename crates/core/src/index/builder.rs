//! Vault-wide index synchronization.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::db::{IndexDb, IndexError};
use super::types::SyncOutcome;
use crate::vault::{VaultWalker, VaultWalkerError, read_note};

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Vault walker error: {0}")]
    Walker(#[from] VaultWalkerError),

    #[error("Index database error: {0}")]
    Index(#[from] IndexError),
}

/// Statistics from a sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Number of note files discovered.
    pub files_found: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Index rows whose backing file no longer exists.
    pub removed: usize,
    /// Files that failed to read or index.
    pub skipped: usize,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Progress callback for sync operations.
/// Parameters: (current, total, current_path)
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str)>;

/// Reconciles a vault's index with the files on disk.
pub struct IndexBuilder<'a> {
    db: &'a IndexDb,
    vault_root: &'a Path,
    excluded_folders: Vec<PathBuf>,
}

impl<'a> IndexBuilder<'a> {
    /// Create a new index builder.
    pub fn new(db: &'a IndexDb, vault_root: &'a Path) -> Self {
        Self { db, vault_root, excluded_folders: Vec::new() }
    }

    /// Skip these folders (relative to the vault root) when walking.
    pub fn with_exclusions(mut self, excluded_folders: Vec<PathBuf>) -> Self {
        self.excluded_folders = excluded_folders;
        self
    }

    /// Incrementally sync the vault: index new and changed notes, drop rows
    /// for deleted files. Unchanged notes cost one hash comparison.
    pub fn sync(&self, progress: Option<ProgressCallback>) -> Result<SyncReport, BuilderError> {
        let start = std::time::Instant::now();
        let mut report = SyncReport::default();

        let walker = VaultWalker::new(self.vault_root, &self.excluded_folders)?;
        let files = walker.walk()?;
        report.files_found = files.len();

        let mut seen: HashSet<PathBuf> = HashSet::with_capacity(files.len());

        for (i, file) in files.iter().enumerate() {
            if let Some(ref cb) = progress {
                cb(i + 1, files.len(), &file.relative_path.to_string_lossy());
            }
            seen.insert(file.relative_path.clone());

            let result = read_note(walker.root(), &file.relative_path)
                .map_err(|e| e.to_string())
                .and_then(|note| self.db.index_note(&note).map_err(|e| e.to_string()));

            match result {
                Ok(SyncOutcome::Inserted) => report.inserted += 1,
                Ok(SyncOutcome::Updated) => report.updated += 1,
                Ok(SyncOutcome::Unchanged) => report.unchanged += 1,
                Err(e) => {
                    // Log error but continue indexing
                    tracing::warn!("Failed to index {}: {}", file.relative_path.display(), e);
                    report.skipped += 1;
                }
            }
        }

        for path in self.db.get_indexed_paths()? {
            if !seen.contains(&path) && self.db.remove_from_index(&path)? {
                report.removed += 1;
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "synced {}: {} new, {} updated, {} unchanged, {} removed, {} skipped",
            self.vault_root.display(),
            report.inserted,
            report.updated,
            report.unchanged,
            report.removed,
            report.skipped
        );
        Ok(report)
    }

    /// Clear the index and rebuild it from scratch.
    pub fn full_reindex(
        &self,
        progress: Option<ProgressCallback>,
    ) -> Result<SyncReport, BuilderError> {
        self.db.clear_index()?;
        self.sync(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(
            root.join("note1.md"),
            "---\ntitle: Note One\ntype: zettel\n---\n# Note One\n\n\
             This links to [[note2]] and [[missing-note]].\n",
        )
        .unwrap();

        fs::write(
            root.join("note2.md"),
            "---\ntitle: Note Two\ntype: task\n---\n# Note Two\n\nBack to [[note1]].\n",
        )
        .unwrap();

        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/note3.md"), "# Note Three\n\nNo links.\n").unwrap();

        dir
    }

    #[test]
    fn test_initial_sync_inserts_everything() {
        let vault = create_test_vault();
        let db = IndexDb::open(vault.path()).unwrap();

        let report = IndexBuilder::new(&db, vault.path()).sync(None).unwrap();

        assert_eq!(report.files_found, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(db.get_index_stats().unwrap().links, 3);

        let note1 = db.get_note_by_path(Path::new("note1.md")).unwrap().unwrap();
        assert_eq!(note1.title, "Note One");
        assert_eq!(note1.note_type, "zettel");
    }

    #[test]
    fn test_resync_detects_changes_and_deletions() {
        let vault = create_test_vault();
        let db = IndexDb::open(vault.path()).unwrap();
        let builder = IndexBuilder::new(&db, vault.path());
        builder.sync(None).unwrap();

        fs::write(vault.path().join("note2.md"), "# Note Two\n\nEdited.\n").unwrap();
        fs::remove_file(vault.path().join("subdir/note3.md")).unwrap();

        let report = builder.sync(None).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.removed, 1);
        assert!(db.get_note_by_path(Path::new("subdir/note3.md")).unwrap().is_none());
    }

    #[test]
    fn test_full_reindex_does_not_duplicate() {
        let vault = create_test_vault();
        let db = IndexDb::open_in_memory().unwrap();
        let builder = IndexBuilder::new(&db, vault.path());

        builder.full_reindex(None).unwrap();
        let report = builder.full_reindex(None).unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(db.get_index_stats().unwrap().notes, 3);
    }

    #[test]
    fn test_exclusions_and_progress() {
        let vault = create_test_vault();
        let db = IndexDb::open_in_memory().unwrap();

        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = calls.clone();
        let progress: ProgressCallback = Box::new(move |_, _, _| counter.set(counter.get() + 1));

        let report = IndexBuilder::new(&db, vault.path())
            .with_exclusions(vec![PathBuf::from("subdir")])
            .sync(Some(progress))
            .unwrap();

        assert_eq!(report.files_found, 2);
        assert_eq!(calls.get(), 2);
    }
}
