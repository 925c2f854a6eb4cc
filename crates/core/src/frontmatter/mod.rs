//! Frontmatter parsing and serialization.
//!
//! Notes carry YAML frontmatter delimited by `---`. The engine only ever sees
//! the typed [`Frontmatter`] struct produced here.

pub mod parser;
pub mod serializer;
pub mod types;

pub use parser::{FrontmatterParseError, parse, parse_lenient};
pub use serializer::{frontmatter_to_yaml, serialize};
pub use types::{Frontmatter, ParsedDocument};
