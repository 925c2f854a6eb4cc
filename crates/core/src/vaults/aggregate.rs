//! Merging results across vaults.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::index::IndexedNote;

/// A note attributed to the vault it came from.
#[derive(Debug, Clone, Serialize)]
pub struct VaultResult {
    /// Vault alias.
    pub vault: String,
    /// Path within the vault.
    pub path: PathBuf,
    /// `alias:path`, unique across vaults.
    pub display_path: String,
    /// Relevance for search results; `None` for plain queries.
    pub score: Option<f64>,
    pub note: IndexedNote,
}

/// Wrap a single-vault result with its vault identity.
pub fn add_vault_attribution(note: IndexedNote, score: Option<f64>, vault: &str) -> VaultResult {
    VaultResult {
        vault: vault.to_string(),
        path: note.path.clone(),
        display_path: format!("{}:{}", vault, note.path.display()),
        score,
        note,
    }
}

/// Best score first, then truncate. Equal scores keep their input order.
pub fn aggregate_search_results(mut results: Vec<VaultResult>, limit: usize) -> Vec<VaultResult> {
    let score = |r: &VaultResult| r.score.unwrap_or(f64::NEG_INFINITY);
    results.sort_by(|a, b| score(b).total_cmp(&score(a)));
    results.truncate(limit);
    results
}

/// Truncate without reordering.
pub fn aggregate_query_results(mut results: Vec<VaultResult>, limit: usize) -> Vec<VaultResult> {
    results.truncate(limit);
    results
}

/// Drop repeats of the same (vault, path), keeping the first.
pub fn deduplicate_results(results: Vec<VaultResult>) -> Vec<VaultResult> {
    let mut seen: HashSet<(String, PathBuf)> = HashSet::new();
    results.into_iter().filter(|r| seen.insert((r.vault.clone(), r.path.clone()))).collect()
}

/// Keep results whose vault is in `include` (when given), then drop those
/// whose vault is in `exclude`. A vault in both lists is excluded.
pub fn filter_by_vaults(
    results: Vec<VaultResult>,
    include: Option<&[String]>,
    exclude: Option<&[String]>,
) -> Vec<VaultResult> {
    results
        .into_iter()
        .filter(|r| include.is_none_or(|inc| inc.contains(&r.vault)))
        .filter(|r| !exclude.is_some_and(|exc| exc.contains(&r.vault)))
        .collect()
}

/// Whether `alias` survives the same include/exclude rules.
pub(crate) fn vault_selected(
    alias: &str,
    include: Option<&[String]>,
    exclude: Option<&[String]>,
) -> bool {
    include.is_none_or(|inc| inc.iter().any(|a| a == alias))
        && !exclude.is_some_and(|exc| exc.iter().any(|a| a == alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::NoteStatus;

    fn note(path: &str) -> IndexedNote {
        IndexedNote {
            id: 1,
            path: PathBuf::from(path),
            title: path.trim_end_matches(".md").to_string(),
            note_type: "note".into(),
            created: None,
            modified: None,
            source: None,
            confidence: None,
            verified: false,
            content: String::new(),
            content_hash: String::new(),
            status: NoteStatus::Active,
            tags: vec![],
            related: vec![],
            aliases: vec![],
            domain: vec![],
            ai_binding: None,
            applies_to: vec![],
            palace_version: 1,
        }
    }

    fn result(vault: &str, path: &str, score: Option<f64>) -> VaultResult {
        add_vault_attribution(note(path), score, vault)
    }

    fn keys(results: &[VaultResult]) -> Vec<&str> {
        results.iter().map(|r| r.display_path.as_str()).collect()
    }

    #[test]
    fn test_attribution_display_path() {
        let r = result("work", "projects/x.md", None);
        assert_eq!(r.display_path, "work:projects/x.md");
        assert_eq!(r.path, PathBuf::from("projects/x.md"));
    }

    #[test]
    fn test_search_sort_is_stable() {
        let results = vec![
            result("a", "1.md", Some(1.0)),
            result("b", "2.md", Some(3.0)),
            result("a", "3.md", Some(1.0)),
            result("b", "4.md", Some(2.0)),
        ];
        let merged = aggregate_search_results(results, 3);
        assert_eq!(keys(&merged), vec!["b:2.md", "b:4.md", "a:1.md"]);
    }

    #[test]
    fn test_query_results_keep_order() {
        let results = vec![result("b", "z.md", None), result("a", "a.md", None)];
        assert_eq!(keys(&aggregate_query_results(results, 5)), vec!["b:z.md", "a:a.md"]);
    }

    #[test]
    fn test_deduplicate_by_vault_and_path() {
        let results = vec![
            result("work", "x.md", Some(2.0)),
            result("work", "x.md", Some(9.0)),
            result("personal", "x.md", None),
        ];
        let deduped = deduplicate_results(results);
        assert_eq!(keys(&deduped), vec!["work:x.md", "personal:x.md"]);
        assert_eq!(deduped[0].score, Some(2.0));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let results = vec![result("work", "x.md", None), result("personal", "y.md", None)];
        let both = vec!["work".to_string()];
        assert!(filter_by_vaults(results, Some(both.as_slice()), Some(both.as_slice())).is_empty());
    }

    #[test]
    fn test_include_and_exclude_separately() {
        let results = vec![result("work", "x.md", None), result("personal", "y.md", None)];
        let work = vec!["work".to_string()];

        let included = filter_by_vaults(results.clone(), Some(work.as_slice()), None);
        assert_eq!(keys(&included), vec!["work:x.md"]);

        let excluded = filter_by_vaults(results.clone(), None, Some(work.as_slice()));
        assert_eq!(keys(&excluded), vec!["personal:y.md"]);

        assert_eq!(filter_by_vaults(results, None, None).len(), 2);
        assert!(!vault_selected("work", Some(work.as_slice()), Some(work.as_slice())));
    }
}
