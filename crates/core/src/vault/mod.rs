//! Vault file discovery, reading and content extraction.
//!
//! This module provides utilities for walking vault directories, reading
//! notes into [`Note`] values, extracting titles and wiki-links, and
//! computing content hashes.

pub mod extractor;
pub mod hasher;
pub mod reader;
pub mod walker;

pub use extractor::{
    WikiLink, extract_title, extract_wiki_links, normalize_target, reference_names,
    wikilink_regex,
};
pub use hasher::content_hash;
pub use reader::{Note, NoteReadError, read_note, write_document};
pub use walker::{VaultWalker, VaultWalkerError, WalkedFile, is_note_file};
