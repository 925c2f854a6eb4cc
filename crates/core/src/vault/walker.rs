//! Vault directory walker.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum VaultWalkerError {
    #[error("vault root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to walk vault directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),
}

/// A markdown file discovered in a vault.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Path relative to vault root.
    pub relative_path: PathBuf,
    /// File modification time.
    pub modified: SystemTime,
}

/// Walker for discovering notes in a vault.
///
/// Hidden entries (anything starting with `.`, which covers the `.palace`
/// index directory) and configured folders are never visited.
#[derive(Debug)]
pub struct VaultWalker {
    root: PathBuf,
    excluded_folders: Vec<PathBuf>,
}

impl VaultWalker {
    /// Create a walker over `root`, skipping `excluded_folders` (relative to
    /// the root, or absolute paths inside it).
    pub fn new(root: &Path, excluded_folders: &[PathBuf]) -> Result<Self, VaultWalkerError> {
        let root = root
            .canonicalize()
            .map_err(|_| VaultWalkerError::MissingRoot(root.display().to_string()))?;

        let excluded_folders = excluded_folders
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap_or(p).to_path_buf())
            .collect();

        Ok(Self { root, excluded_folders })
    }

    /// Walk the vault and return all notes, sorted by relative path.
    pub fn walk(&self) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        let mut files = Vec::new();

        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded(e));

        for entry in entries {
            let entry = entry.map_err(|e| {
                VaultWalkerError::WalkError(self.root.display().to_string(), e)
            })?;

            if !entry.file_type().is_file() || !is_note_file(entry.path()) {
                continue;
            }

            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            files.push(WalkedFile {
                relative_path: entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or(entry.path())
                    .to_path_buf(),
                modified,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        if entry.file_name().to_string_lossy().starts_with('.') {
            return true;
        }

        entry
            .path()
            .strip_prefix(&self.root)
            .is_ok_and(|rel| self.excluded_folders.iter().any(|ex| rel.starts_with(ex)))
    }

    /// Get the (canonicalized) vault root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Notes are `.md` files.
pub fn is_note_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("md"))
}
