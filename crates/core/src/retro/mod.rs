//! Retroactive linking.
//!
//! Finds plain-text mentions of a note's title or aliases elsewhere in the
//! vault and, once confirmed, turns them into `[[wiki-links]]`. Applying is
//! two-phase: an unconfirmed call only previews, a confirmed one rewrites
//! files one at a time and reindexes each.

mod applier;
mod scanner;
mod types;

pub use applier::{apply_retroactive_links_with_confirmation, preview_retroactive_links};
pub use scanner::{MentionScanner, find_unlinked_mentions, scan_content};
pub use types::*;
