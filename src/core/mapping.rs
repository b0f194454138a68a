//! The unit of output of the discovery pipeline.

use serde::Serialize;

/// A discovered (short path -> permalink) pair.
///
/// Mappings are immutable value records with no identity beyond their
/// fields. The registry keys on `short_path` and overwrites, so a later
/// mapping for the same path supersedes any earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    /// Decoded URL path component of the short link. Never the bare root
    /// path; extraction drops candidates whose path is "/" or shorter.
    pub short_path: String,

    /// Destination URL, verbatim from the document's canonical link.
    pub permalink: String,
}

impl Mapping {
    pub fn new(short_path: impl Into<String>, permalink: impl Into<String>) -> Self {
        Self {
            short_path: short_path.into(),
            permalink: permalink.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_for_scan_output() {
        let mapping = Mapping::new("/x", "https://example.com/a/b");
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(
            json,
            r#"{"short_path":"/x","permalink":"https://example.com/a/b"}"#
        );
    }
}
