//! Link graph data types.

use serde::Serialize;
use std::path::PathBuf;

/// Lightweight reference to an indexed note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRef {
    pub id: i64,
    pub path: PathBuf,
    pub title: String,
}

/// A single wiki-link edge between two notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    /// Note containing the link.
    pub source: NoteRef,
    /// Raw target text as written in the source note.
    pub target: String,
    /// Indexed note the target refers to, if any.
    pub resolved: Option<NoteRef>,
}

/// Edge direction followed during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// From a note to the notes linking to it.
    Incoming,
    /// From a note to the notes it links to.
    Outgoing,
    Both,
}

impl LinkDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "incoming" | "in" | "backlinks" => Some(Self::Incoming),
            "outgoing" | "out" => Some(Self::Outgoing),
            "both" | "all" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn follows_outgoing(self) -> bool {
        matches!(self, Self::Outgoing | Self::Both)
    }

    pub fn follows_incoming(self) -> bool {
        matches!(self, Self::Incoming | Self::Both)
    }
}

/// A note reached during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalNode {
    pub note: NoteRef,
    /// Hop distance from the start note (>= 1).
    pub depth: usize,
    /// Edge direction through which the note was first reached.
    pub direction: LinkDirection,
}
