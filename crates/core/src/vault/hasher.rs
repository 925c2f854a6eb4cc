//! Content hashing for change detection.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Compute a hash of the raw note text for change detection.
/// Uses DefaultHasher for speed (non-cryptographic, fast).
/// Returns hex-encoded hash string.
pub fn content_hash(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_consistent() {
        let content = "# Hello\n\nThis is a test.";
        assert_eq!(content_hash(content), content_hash(content));
    }

    #[test]
    fn test_content_hash_different_content() {
        assert_ne!(content_hash("# Hello"), content_hash("# World"));
    }

    #[test]
    fn test_content_hash_sees_line_endings() {
        assert_ne!(content_hash("Docker"), content_hash("Docker\n"));
        assert_ne!(content_hash("Docker\n"), content_hash("Docker\r\n"));
    }

    #[test]
    fn test_content_hash_width() {
        assert_eq!(content_hash("# Test\n\nContent here.").len(), 16);
    }
}
