//! One index connection per configured vault.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::aggregate::{
    VaultResult, add_vault_attribution, aggregate_query_results, aggregate_search_results,
    deduplicate_results, vault_selected,
};
use crate::config::{ResolvedConfig, VaultAccess, VaultConfig};
use crate::index::{
    BuilderError, IndexBuilder, IndexDb, IndexError, NoteQuery, ProgressCallback, SyncReport,
};
use crate::retro::{self, ApplyOptions, ApplyOutcome, RetroError, RetroPreview, RetroTarget};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown vault '{0}'")]
    UnknownVault(String),

    #[error("vault '{0}' is read-only")]
    ReadOnly(String),

    #[error("vault '{alias}': {source}")]
    Index {
        alias: String,
        #[source]
        source: IndexError,
    },

    #[error("vault '{alias}': {source}")]
    Sync {
        alias: String,
        #[source]
        source: BuilderError,
    },

    #[error("vault '{alias}': {source}")]
    Retro {
        alias: String,
        #[source]
        source: RetroError,
    },
}

/// Owns the index connection of every configured vault.
///
/// Connections open on first use and stay open until [`close`](Self::close)
/// or [`close_all`](Self::close_all). Methods take `&mut self`, so callers
/// sharing a registry across threads must wrap it in their own lock.
pub struct VaultRegistry {
    vaults: BTreeMap<String, VaultConfig>,
    default_vault: Option<String>,
    open: HashMap<String, IndexDb>,
}

impl VaultRegistry {
    pub fn new(vaults: impl IntoIterator<Item = VaultConfig>) -> Self {
        Self {
            vaults: vaults.into_iter().map(|v| (v.alias.clone(), v)).collect(),
            default_vault: None,
            open: HashMap::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut registry = Self::new(config.vaults.values().cloned());
        registry.default_vault = Some(config.default_vault.clone());
        registry
    }

    /// Configured aliases, sorted.
    pub fn aliases(&self) -> Vec<String> {
        self.vaults.keys().cloned().collect()
    }

    pub fn default_alias(&self) -> Option<&str> {
        self.default_vault.as_deref()
    }

    pub fn vault(&self, alias: &str) -> Result<&VaultConfig, RegistryError> {
        self.vaults.get(alias).ok_or_else(|| RegistryError::UnknownVault(alias.to_string()))
    }

    pub fn is_open(&self, alias: &str) -> bool {
        self.open.contains_key(alias)
    }

    /// Index of `alias`, opened (and migrated) on first use.
    pub fn db(&mut self, alias: &str) -> Result<&IndexDb, RegistryError> {
        let root = self.vault(alias)?.root.clone();

        if !self.open.contains_key(alias) {
            let db = IndexDb::open(&root)
                .map_err(|source| RegistryError::Index { alias: alias.to_string(), source })?;
            tracing::debug!("opened index for vault '{}'", alias);
            self.open.insert(alias.to_string(), db);
        }

        self.open.get(alias).ok_or_else(|| RegistryError::UnknownVault(alias.to_string()))
    }

    /// Close the index of `alias`. Returns `false` if it was not open.
    pub fn close(&mut self, alias: &str) -> Result<bool, RegistryError> {
        match self.open.remove(alias) {
            Some(db) => {
                db.close()
                    .map_err(|source| RegistryError::Index { alias: alias.to_string(), source })?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close every open index. All are attempted; the first error is returned.
    pub fn close_all(&mut self) -> Result<(), RegistryError> {
        let mut first_err = None;
        for (alias, db) in self.open.drain() {
            if let Err(source) = db.close() {
                tracing::warn!("failed to close index for vault '{}': {}", alias, source);
                first_err.get_or_insert(RegistryError::Index { alias, source });
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn writable(&self, alias: &str) -> Result<&VaultConfig, RegistryError> {
        let vault = self.vault(alias)?;
        if vault.mode == VaultAccess::ReadOnly {
            return Err(RegistryError::ReadOnly(alias.to_string()));
        }
        Ok(vault)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Reconcile the index of `alias` with its files. `full` clears it first.
    ///
    /// Allowed on read-only vaults: only the index under `.palace` is
    /// written, never a note.
    pub fn sync_vault(
        &mut self,
        alias: &str,
        full: bool,
        progress: Option<ProgressCallback>,
    ) -> Result<SyncReport, RegistryError> {
        let vault = self.vault(alias)?.clone();
        let db = self.db(alias)?;

        let builder = IndexBuilder::new(db, &vault.root).with_exclusions(vault.excluded_folders);
        let result = if full { builder.full_reindex(progress) } else { builder.sync(progress) };
        result.map_err(|source| RegistryError::Sync { alias: alias.to_string(), source })
    }

    /// Retroactive linking in `alias`. Only confirmed calls write, so only
    /// those are refused on read-only vaults.
    pub fn apply_retroactive_links(
        &mut self,
        alias: &str,
        target: &RetroTarget,
        options: &ApplyOptions,
    ) -> Result<ApplyOutcome, RegistryError> {
        let root = if options.confirm {
            self.writable(alias)?.root.clone()
        } else {
            self.vault(alias)?.root.clone()
        };
        let db = self.db(alias)?;

        retro::apply_retroactive_links_with_confirmation(db, &root, target, options)
            .map_err(|source| RegistryError::Retro { alias: alias.to_string(), source })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn preview_retroactive_links(
        &mut self,
        alias: &str,
        target: &RetroTarget,
    ) -> Result<RetroPreview, RegistryError> {
        let db = self.db(alias)?;
        retro::preview_retroactive_links(db, target)
            .map_err(|source| RegistryError::Retro { alias: alias.to_string(), source })
    }

    /// Query one vault, attributing every note to it.
    pub fn query_notes_in_vault(
        &mut self,
        alias: &str,
        query: &NoteQuery,
    ) -> Result<Vec<VaultResult>, RegistryError> {
        let db = self.db(alias)?;
        let notes = db
            .query_notes(query)
            .map_err(|source| RegistryError::Index { alias: alias.to_string(), source })?;

        Ok(notes.into_iter().map(|n| add_vault_attribution(n, None, alias)).collect())
    }

    /// Query every selected vault, in alias order. A vault that fails is
    /// skipped with a warning.
    pub fn query_all_vaults(
        &mut self,
        query: &NoteQuery,
        include: Option<&[String]>,
        exclude: Option<&[String]>,
        limit: usize,
    ) -> Vec<VaultResult> {
        let mut results = Vec::new();

        for alias in self.selected(include, exclude) {
            match self.query_notes_in_vault(&alias, query) {
                Ok(found) => results.extend(found),
                Err(e) => tracing::warn!("skipping vault in query: {}", e),
            }
        }

        aggregate_query_results(deduplicate_results(results), limit)
    }

    /// Full-text search over every selected vault, merged by score.
    pub fn search_all_vaults(
        &mut self,
        text: &str,
        include: Option<&[String]>,
        exclude: Option<&[String]>,
        limit: usize,
    ) -> Vec<VaultResult> {
        let mut results = Vec::new();

        for alias in self.selected(include, exclude) {
            let hits = self.db(&alias).and_then(|db| {
                db.search(text, limit)
                    .map_err(|source| RegistryError::Index { alias: alias.clone(), source })
            });
            match hits {
                Ok(hits) => results.extend(
                    hits.into_iter().map(|h| add_vault_attribution(h.note, Some(h.score), &alias)),
                ),
                Err(e) => tracing::warn!("skipping vault in search: {}", e),
            }
        }

        aggregate_search_results(deduplicate_results(results), limit)
    }

    fn selected(&self, include: Option<&[String]>, exclude: Option<&[String]>) -> Vec<String> {
        self.vaults.keys().filter(|a| vault_selected(a, include, exclude)).cloned().collect()
    }
}

impl Drop for VaultRegistry {
    fn drop(&mut self) {
        if !self.open.is_empty() {
            let _ = self.close_all();
        }
    }
}
