//! Resolved dependency records.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::parser::ManifestError;

/// A dependency pinned to a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepRecord {
    /// Manifest key; `/` separates nested target directories.
    pub path: String,

    /// Remote repository location
    pub location: String,

    /// Commit the checkout must be at
    pub revision: String,
}

impl DepRecord {
    pub fn new(
        path: impl Into<String>,
        location: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        DepRecord {
            path: path.into(),
            location: location.into(),
            revision: revision.into(),
        }
    }

    /// Split a `location@revision` value on its last `@`.
    pub fn from_pinned(path: &str, value: &str) -> Result<Self, ManifestError> {
        let (location, revision) =
            value
                .rsplit_once('@')
                .ok_or_else(|| ManifestError::MissingRevision {
                    path: path.to_string(),
                    value: value.to_string(),
                })?;

        Ok(DepRecord::new(path, location, revision))
    }

    /// The directory holding the checkout and the checkout's own name.
    ///
    /// A path without `/` lives directly in the working root.
    pub fn parent_and_leaf(&self) -> (Option<&str>, &str) {
        match self.path.rsplit_once('/') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, self.path.as_str()),
        }
    }
}

impl fmt::Display for DepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.location, self.revision)
    }
}

/// Dependencies keyed by manifest path.
pub type DepSet = BTreeMap<String, DepRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_last_at() {
        let rec = DepRecord::from_pinned("src/a", "git@host.example:a.git@abc123").unwrap();
        assert_eq!(rec.location, "git@host.example:a.git");
        assert_eq!(rec.revision, "abc123");
        assert_eq!(rec.to_string(), "git@host.example:a.git@abc123");
    }

    #[test]
    fn test_missing_revision() {
        let err = DepRecord::from_pinned("src/a", "https://host.example/a.git").unwrap_err();
        assert!(matches!(err, ManifestError::MissingRevision { ref path, .. } if path == "src/a"));
    }

    #[test]
    fn test_parent_and_leaf() {
        let nested = DepRecord::new("src/third_party/zlib", "loc", "1");
        assert_eq!(nested.parent_and_leaf(), (Some("src/third_party"), "zlib"));

        let top = DepRecord::new("zlib", "loc", "1");
        assert_eq!(top.parent_and_leaf(), (None, "zlib"));
    }
}
