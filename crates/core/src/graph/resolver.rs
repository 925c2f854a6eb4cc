//! Wiki-link target resolution against the indexed notes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::types::NoteRef;
use crate::index::{IndexDb, IndexError};
use crate::vault::normalize_target;

/// In-memory snapshot of notes and link edges for one vault.
///
/// Notes are loaded in path order, so the first note registered under a
/// name is the lexicographically first path carrying it.
pub(crate) struct GraphSnapshot {
    notes: HashMap<i64, NoteRef>,
    by_path: HashMap<String, i64>,
    by_title: HashMap<String, i64>,
    by_stem: HashMap<String, i64>,
    by_alias: HashMap<String, i64>,
    /// Reference names of each note (title, stem, path, aliases).
    names: HashMap<i64, Vec<String>>,
    /// Edges in (source id, link order).
    edges: Vec<(i64, String)>,
    /// Source id -> indexes into `edges`, in link order.
    edges_by_source: HashMap<i64, Vec<usize>>,
    /// Normalized target -> indexes into `edges`.
    edges_by_target: HashMap<String, Vec<usize>>,
    /// Exact relative path -> note id.
    by_exact_path: HashMap<PathBuf, i64>,
}

impl GraphSnapshot {
    pub(crate) fn load(db: &IndexDb) -> Result<Self, IndexError> {
        let conn = db.connection();

        let mut stmt = conn.prepare("SELECT id, path, title, aliases FROM notes ORDER BY path")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut snapshot = Self {
            notes: HashMap::with_capacity(rows.len()),
            by_path: HashMap::new(),
            by_title: HashMap::new(),
            by_stem: HashMap::new(),
            by_alias: HashMap::new(),
            names: HashMap::with_capacity(rows.len()),
            edges: Vec::new(),
            edges_by_source: HashMap::new(),
            edges_by_target: HashMap::new(),
            by_exact_path: HashMap::with_capacity(rows.len()),
        };

        for (id, path, title, aliases) in rows {
            let aliases: Vec<String> =
                aliases.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default();
            let path = Path::new(&path);

            snapshot.by_path.entry(normalize_target(&path.to_string_lossy())).or_insert(id);
            snapshot.by_title.entry(normalize_target(&title)).or_insert(id);
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                snapshot.by_stem.entry(normalize_target(stem)).or_insert(id);
            }
            for alias in &aliases {
                snapshot.by_alias.entry(normalize_target(alias)).or_insert(id);
            }

            snapshot
                .names
                .insert(id, crate::vault::reference_names(&title, path, &aliases));
            snapshot.by_exact_path.insert(path.to_path_buf(), id);
            snapshot.notes.insert(id, NoteRef { id, path: path.to_path_buf(), title });
        }

        let mut stmt = conn.prepare("SELECT source_id, target_path FROM links ORDER BY source_id, id")?;
        snapshot.edges = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        for (idx, (source, raw)) in snapshot.edges.iter().enumerate() {
            snapshot.edges_by_source.entry(*source).or_default().push(idx);
            snapshot.edges_by_target.entry(normalize_target(raw)).or_default().push(idx);
        }

        Ok(snapshot)
    }

    pub(crate) fn note(&self, id: i64) -> Option<&NoteRef> {
        self.notes.get(&id)
    }

    pub(crate) fn note_by_path(&self, path: &Path) -> Option<&NoteRef> {
        self.by_exact_path.get(path).and_then(|id| self.notes.get(id))
    }

    /// Resolve a raw target: exact path, then title, stem, alias.
    pub(crate) fn resolve(&self, raw: &str) -> Option<&NoteRef> {
        let key = normalize_target(raw);
        if key.is_empty() {
            return None;
        }

        [&self.by_path, &self.by_title, &self.by_stem, &self.by_alias]
            .iter()
            .find_map(|table| table.get(&key))
            .and_then(|id| self.notes.get(id))
    }

    /// Raw targets written in `source`, in link order.
    pub(crate) fn outgoing(&self, source: i64) -> impl Iterator<Item = &str> {
        self.edges_by_source
            .get(&source)
            .into_iter()
            .flatten()
            .map(|&idx| self.edges[idx].1.as_str())
    }

    /// Edges whose normalized target names `target`, as (source id, raw target).
    pub(crate) fn incoming(&self, target: i64) -> Vec<(i64, &str)> {
        let Some(names) = self.names.get(&target) else {
            return Vec::new();
        };

        // Names are deduplicated, so each edge is collected at most once.
        let mut hits: Vec<usize> = names
            .iter()
            .filter_map(|name| self.edges_by_target.get(name))
            .flatten()
            .copied()
            .collect();

        // Group by source path, keeping link order within a source.
        hits.sort_by_cached_key(|&idx| {
            let source = self.edges[idx].0;
            (self.notes.get(&source).map(|n| n.path.clone()), idx)
        });
        hits.into_iter()
            .map(|idx| {
                let (source, raw) = &self.edges[idx];
                (*source, raw.as_str())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::Note;

    fn index(db: &IndexDb, path: &str, raw: &str) {
        db.index_note(&Note::from_raw(path, raw.to_string(), None)).unwrap();
    }

    #[test]
    fn test_resolution_order() {
        let db = IndexDb::open_in_memory().unwrap();
        // Title "alpha" collides with the stem of b/alpha.md; title wins.
        index(&db, "a/first.md", "---\ntitle: Alpha\n---\n");
        index(&db, "b/alpha.md", "---\ntitle: Other\naliases: [k8s]\n---\n");

        let snap = GraphSnapshot::load(&db).unwrap();
        assert_eq!(snap.resolve("Alpha").unwrap().path, Path::new("a/first.md"));
        assert_eq!(snap.resolve("b/alpha").unwrap().path, Path::new("b/alpha.md"));
        assert_eq!(snap.resolve("B/Alpha.md#Intro").unwrap().path, Path::new("b/alpha.md"));
        assert_eq!(snap.resolve("K8S").unwrap().title, "Other");
        assert!(snap.resolve("nowhere").is_none());
        assert!(snap.resolve("#only-anchor").is_none());
    }

    #[test]
    fn test_incoming_edges_indexed_by_name() {
        let db = IndexDb::open_in_memory().unwrap();
        index(&db, "tech/docker.md", "---\ntitle: Docker\naliases: [moby]\n---\n");
        index(&db, "b.md", "[[Moby]] then [[docker#Setup]]\n");
        index(&db, "a.md", "[[tech/docker.md]] and [[Other]]\n");

        let snap = GraphSnapshot::load(&db).unwrap();
        let docker = snap.note_by_path(Path::new("tech/docker.md")).unwrap().id;
        let b = snap.note_by_path(Path::new("b.md")).unwrap().id;
        let a = snap.note_by_path(Path::new("a.md")).unwrap().id;

        assert_eq!(
            snap.incoming(docker),
            vec![(a, "tech/docker.md"), (b, "Moby"), (b, "docker#Setup")]
        );
        assert!(snap.incoming(a).is_empty());
        assert!(snap.note_by_path(Path::new("docker.md")).is_none());
    }

    #[test]
    fn test_ties_resolve_to_first_path() {
        let db = IndexDb::open_in_memory().unwrap();
        index(&db, "z/docker.md", "# Z\n");
        index(&db, "m/docker.md", "# M\n");

        let snap = GraphSnapshot::load(&db).unwrap();
        assert_eq!(snap.resolve("docker").unwrap().path, Path::new("m/docker.md"));
    }
}
