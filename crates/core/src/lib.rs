//! Vault index and link-graph engine for markdown knowledge bases.
//!
//! A vault is a directory tree of markdown notes. Each vault gets its own
//! SQLite index under `.palace/index.db` which mirrors note metadata, tags and
//! wiki-link edges, and carries an FTS5 table for content search.

pub mod config;
pub mod frontmatter;
pub mod graph;
pub mod index;
pub mod retro;
pub mod vault;
pub mod vaults;
