//! Link graph queries over the vault index.
//!
//! Edges are stored as raw wiki-link text. Outgoing links are resolved to
//! notes at query time (exact path, then title, file stem, alias). Incoming
//! links match any edge whose normalized target equals one of the note's
//! reference names, so two notes sharing a stem in different folders both
//! see the edge.

mod resolver;
pub mod types;

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use crate::index::{IndexDb, IndexError};
use resolver::GraphSnapshot;

pub use types::{GraphLink, LinkDirection, NoteRef, TraversalNode};

/// Read-only view of the link graph of one vault.
pub struct LinkGraph<'a> {
    db: &'a IndexDb,
}

impl<'a> LinkGraph<'a> {
    pub fn new(db: &'a IndexDb) -> Self {
        Self { db }
    }

    /// All links written in the note at `path`, duplicates included.
    pub fn outgoing_links(&self, path: &Path) -> Result<Vec<GraphLink>, IndexError> {
        let snapshot = GraphSnapshot::load(self.db)?;
        let Some(source) = snapshot.note_by_path(path) else {
            return Ok(Vec::new());
        };

        Ok(snapshot
            .outgoing(source.id)
            .map(|target| GraphLink {
                source: source.clone(),
                target: target.to_string(),
                resolved: snapshot.resolve(target).cloned(),
            })
            .collect())
    }

    /// All links pointing at the note at `path`.
    pub fn incoming_links(&self, path: &Path) -> Result<Vec<GraphLink>, IndexError> {
        let snapshot = GraphSnapshot::load(self.db)?;
        let Some(target) = snapshot.note_by_path(path) else {
            return Ok(Vec::new());
        };

        Ok(snapshot
            .incoming(target.id)
            .into_iter()
            .filter_map(|(source_id, raw)| {
                snapshot.note(source_id).map(|source| GraphLink {
                    source: source.clone(),
                    target: raw.to_string(),
                    resolved: Some(target.clone()),
                })
            })
            .collect())
    }

    /// Resolve a raw link target to an indexed note.
    pub fn resolve_target(&self, raw: &str) -> Result<Option<NoteRef>, IndexError> {
        Ok(GraphSnapshot::load(self.db)?.resolve(raw).cloned())
    }

    /// Breadth-first traversal from `start`, up to `max_depth` hops.
    ///
    /// Each reachable note is returned once, at the depth and direction of
    /// its first discovery. The start note itself is excluded. With
    /// [`LinkDirection::Both`], outgoing edges are explored before incoming
    /// ones at each note.
    pub fn traverse(
        &self,
        start: &Path,
        direction: LinkDirection,
        max_depth: usize,
    ) -> Result<Vec<TraversalNode>, IndexError> {
        let snapshot = GraphSnapshot::load(self.db)?;
        let Some(start) = snapshot.note_by_path(start) else {
            return Ok(Vec::new());
        };

        let mut visited: HashSet<i64> = HashSet::from([start.id]);
        let mut queue: VecDeque<(i64, usize)> = VecDeque::from([(start.id, 0)]);
        let mut reached = Vec::new();

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            let mut neighbours: Vec<(i64, LinkDirection)> = Vec::new();
            if direction.follows_outgoing() {
                neighbours.extend(
                    snapshot
                        .outgoing(current)
                        .filter_map(|raw| snapshot.resolve(raw))
                        .map(|n| (n.id, LinkDirection::Outgoing)),
                );
            }
            if direction.follows_incoming() {
                neighbours.extend(
                    snapshot
                        .incoming(current)
                        .into_iter()
                        .map(|(source, _)| (source, LinkDirection::Incoming)),
                );
            }

            for (id, via) in neighbours {
                if !visited.insert(id) {
                    continue;
                }
                if let Some(note) = snapshot.note(id) {
                    reached.push(TraversalNode { note: note.clone(), depth: depth + 1, direction: via });
                    queue.push_back((id, depth + 1));
                }
            }
        }

        tracing::debug!("traversal from {} reached {} notes", start.path.display(), reached.len());
        Ok(reached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::Note;
    use std::path::PathBuf;

    fn index(db: &IndexDb, path: &str, raw: &str) {
        db.index_note(&Note::from_raw(path, raw.to_string(), None)).unwrap();
    }

    /// a -> b -> c, d -> a, plus a dangling link from c.
    fn chain_db() -> IndexDb {
        let db = IndexDb::open_in_memory().unwrap();
        index(&db, "a.md", "# A\n\n[[b]] and again [[B|bee]]\n");
        index(&db, "notes/b.md", "---\ntitle: B\n---\nSee [[c#Details]].\n");
        index(&db, "c.md", "---\naliases: [Sea]\n---\n[[missing]]\n");
        index(&db, "d.md", "Back to [[a.md]].\n");
        db
    }

    fn paths(nodes: &[TraversalNode]) -> Vec<(PathBuf, usize)> {
        nodes.iter().map(|n| (n.note.path.clone(), n.depth)).collect()
    }

    #[test]
    fn test_outgoing_links_keep_duplicates_and_resolve() {
        let db = chain_db();
        let graph = LinkGraph::new(&db);

        let links = graph.outgoing_links(Path::new("a.md")).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.resolved.as_ref().unwrap().path == Path::new("notes/b.md")));

        let dangling = graph.outgoing_links(Path::new("c.md")).unwrap();
        assert_eq!(dangling.len(), 1);
        assert!(dangling[0].resolved.is_none());
    }

    #[test]
    fn test_incoming_links_match_reference_names() {
        let db = chain_db();
        let graph = LinkGraph::new(&db);

        let incoming = graph.incoming_links(Path::new("notes/b.md")).unwrap();
        assert_eq!(incoming.len(), 2);
        assert!(incoming.iter().all(|l| l.source.path == Path::new("a.md")));

        // Section anchors are ignored.
        let incoming = graph.incoming_links(Path::new("c.md")).unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].target, "c#Details");

        // Path with extension.
        assert_eq!(graph.incoming_links(Path::new("a.md")).unwrap().len(), 1);
        assert!(graph.incoming_links(Path::new("unknown.md")).unwrap().is_empty());
    }

    #[test]
    fn test_alias_links_count_as_incoming() {
        let db = chain_db();
        index(&db, "e.md", "Sailing on the [[sea]].\n");
        let graph = LinkGraph::new(&db);

        let sources: Vec<_> = graph
            .incoming_links(Path::new("c.md"))
            .unwrap()
            .into_iter()
            .map(|l| l.source.path)
            .collect();
        assert_eq!(sources, vec![PathBuf::from("e.md"), PathBuf::from("notes/b.md")]);
    }

    #[test]
    fn test_traverse_outgoing() {
        let db = chain_db();
        let graph = LinkGraph::new(&db);

        let nodes = graph.traverse(Path::new("a.md"), LinkDirection::Outgoing, 5).unwrap();
        assert_eq!(
            paths(&nodes),
            vec![(PathBuf::from("notes/b.md"), 1), (PathBuf::from("c.md"), 2)]
        );
        assert!(nodes.iter().all(|n| n.direction == LinkDirection::Outgoing));
    }

    #[test]
    fn test_traverse_respects_depth_and_direction() {
        let db = chain_db();
        let graph = LinkGraph::new(&db);

        let nodes = graph.traverse(Path::new("a.md"), LinkDirection::Outgoing, 1).unwrap();
        assert_eq!(paths(&nodes), vec![(PathBuf::from("notes/b.md"), 1)]);

        let nodes = graph.traverse(Path::new("c.md"), LinkDirection::Incoming, 10).unwrap();
        assert_eq!(
            paths(&nodes),
            vec![
                (PathBuf::from("notes/b.md"), 1),
                (PathBuf::from("a.md"), 2),
                (PathBuf::from("d.md"), 3)
            ]
        );

        assert!(graph.traverse(Path::new("a.md"), LinkDirection::Both, 0).unwrap().is_empty());
    }

    #[test]
    fn test_traverse_both_visits_each_note_once() {
        let db = chain_db();
        let graph = LinkGraph::new(&db);

        let nodes = graph.traverse(Path::new("a.md"), LinkDirection::Both, 3).unwrap();
        let mut seen: Vec<_> = nodes.iter().map(|n| n.note.path.clone()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), nodes.len());
        assert_eq!(nodes.len(), 3);

        let d = nodes.iter().find(|n| n.note.path == Path::new("d.md")).unwrap();
        assert_eq!((d.depth, d.direction), (1, LinkDirection::Incoming));
    }

    #[test]
    fn test_traverse_unknown_start_is_empty() {
        let db = chain_db();
        let graph = LinkGraph::new(&db);
        assert!(graph.traverse(Path::new("nope.md"), LinkDirection::Both, 3).unwrap().is_empty());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(LinkDirection::parse("IN"), Some(LinkDirection::Incoming));
        assert_eq!(LinkDirection::parse("both"), Some(LinkDirection::Both));
        assert_eq!(LinkDirection::parse("sideways"), None);
    }
}
