//! Resource paths
//!
//! A path is an ordered sequence of name segments. The virtual root has the
//! empty path; top-level resources have one segment.

use crate::error::{LibraryError, LibraryResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// The empty path of the virtual root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-delimited reference. A leading `/` is stripped.
    pub fn parse(reference: &str) -> LibraryResult<Self> {
        let trimmed = reference.strip_prefix('/').unwrap_or(reference);
        if trimmed.is_empty() {
            return Err(LibraryError::invalid_path(reference, "empty reference"));
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(LibraryError::invalid_path(reference, "empty path segment"));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Path of the enclosing module, or `None` for the root itself
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Last segment; empty for the root
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment-wise prefix test
    pub fn starts_with(&self, other: &ResourcePath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for ResourcePath {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_segments() {
        let path = ResourcePath::parse("acme/util/core").unwrap();
        assert_eq!(path.segments(), &["acme", "util", "core"]);
        assert_eq!(path.name(), "core");
        assert_eq!(path.to_string(), "acme/util/core");
    }

    #[test]
    fn test_leading_slash_is_root_relative() {
        assert_eq!(
            ResourcePath::parse("/acme/core").unwrap(),
            ResourcePath::parse("acme/core").unwrap()
        );
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("acme//core")]
    #[case("acme/")]
    fn test_invalid_paths(#[case] input: &str) {
        assert!(matches!(
            ResourcePath::parse(input),
            Err(LibraryError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_join_and_parent() {
        let acme = ResourcePath::root().join("acme");
        let core = acme.join("core");
        assert_eq!(core.parent(), Some(acme.clone()));
        assert_eq!(acme.parent(), Some(ResourcePath::root()));
        assert_eq!(ResourcePath::root().parent(), None);
    }

    #[test]
    fn test_starts_with_is_segment_wise() {
        let acme = ResourcePath::parse("acme").unwrap();
        let ext = ResourcePath::parse("acme-ext/core").unwrap();
        let nested = ResourcePath::parse("acme/core").unwrap();
        assert!(!ext.starts_with(&acme));
        assert!(nested.starts_with(&acme));
        assert!(nested.starts_with(&ResourcePath::root()));
    }
}
