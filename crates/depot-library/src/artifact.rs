//! Artifact coordinates of the form `scheme:type:group/name#version`

use crate::error::{LibraryError, LibraryResult};
use std::fmt;
use std::str::FromStr;

/// Schemes an artifact coordinate may use
pub const SCHEMES: [&str; 3] = ["artifact", "link", "local"];

const ILLEGAL_VERSION_CHARS: &[char] = &[
    '/', '%', '\\', '*', '!', '(', '@', ')', '+', '\'', '{', '}', '[', ']', '?', ',', '#', '=',
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Artifact {
    scheme: String,
    type_id: String,
    group: String,
    name: String,
    version: Option<String>,
}

impl Artifact {
    /// Build a coordinate from its parts. An empty group renders as `type:name`.
    pub fn new(
        scheme: impl Into<String>,
        type_id: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            type_id: type_id.into(),
            group: group.into(),
            name: name.into(),
            version: version.filter(|v| !v.is_empty()),
        }
    }

    /// Parse a coordinate whose scheme is one of [`SCHEMES`]
    pub fn parse(urn: &str) -> LibraryResult<Self> {
        let artifact = Self::parse_coordinate(urn)?;
        if !Self::is_recognized_scheme(&artifact.scheme) {
            return Err(LibraryError::invalid_artifact(
                urn,
                format!("unrecognized scheme '{}'", artifact.scheme),
            ));
        }
        Ok(artifact)
    }

    /// Parse the `type:group/name#version` grammar under any scheme
    pub(crate) fn parse_coordinate(urn: &str) -> LibraryResult<Self> {
        let urn = strip_entry(urn);
        let (scheme, rest) = urn
            .split_once(':')
            .filter(|(scheme, _)| !scheme.is_empty())
            .ok_or_else(|| LibraryError::invalid_artifact(&urn, "missing scheme"))?;

        let (ssp, version) = match rest.split_once('#') {
            Some((ssp, version)) => (ssp, Some(version)),
            None => (rest, None),
        };

        if ssp.contains("//") || ssp.contains(":/") || ssp.ends_with('/') {
            return Err(LibraryError::invalid_artifact(
                &urn,
                "invalid character sequence",
            ));
        }

        let (head, name) = ssp
            .rsplit_once('/')
            .ok_or_else(|| LibraryError::invalid_artifact(&urn, "missing group"))?;
        let (type_id, group) = head
            .split_once(':')
            .ok_or_else(|| LibraryError::invalid_artifact(&urn, "missing type"))?;

        if let Some(version) = version {
            if version.contains(ILLEGAL_VERSION_CHARS) {
                return Err(LibraryError::invalid_artifact(
                    &urn,
                    "illegal characters in the version",
                ));
            }
        }

        Ok(Self::new(
            scheme,
            type_id,
            group,
            name,
            version.map(str::to_string),
        ))
    }

    pub fn is_recognized_scheme(scheme: &str) -> bool {
        SCHEMES.contains(&scheme)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `group/name`
    pub fn path(&self) -> String {
        if self.group.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.group, self.name)
        }
    }
}

/// Drop an embedded entry (`!...`) while keeping any version fragment
fn strip_entry(urn: &str) -> String {
    match urn.find('!') {
        Some(bang) => match urn.find('#') {
            Some(hash) if hash > bang => format!("{}{}", &urn[..bang], &urn[hash..]),
            _ => urn[..bang].to_string(),
        },
        None => urn.to_string(),
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.type_id, self.path())?;
        if let Some(version) = &self.version {
            write!(f, "#{}", version)?;
        }
        Ok(())
    }
}

impl FromStr for Artifact {
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
    fn test_parse_full_coordinate() {
        let artifact = Artifact::parse("artifact:jar:org/acme/util/acme-util#1.2.0").unwrap();
        assert_eq!(artifact.scheme(), "artifact");
        assert_eq!(artifact.type_id(), "jar");
        assert_eq!(artifact.group(), "org/acme/util");
        assert_eq!(artifact.name(), "acme-util");
        assert_eq!(artifact.version(), Some("1.2.0"));
        assert_eq!(artifact.to_string(), "artifact:jar:org/acme/util/acme-util#1.2.0");
    }

    #[test]
    fn test_empty_version_is_none() {
        let artifact = Artifact::parse("link:jar:acme/core#").unwrap();
        assert_eq!(artifact.version(), None);
        assert_eq!(artifact.to_string(), "link:jar:acme/core");
    }

    #[test]
    fn test_embedded_entry_is_ignored() {
        let artifact = Artifact::parse("artifact:jar:acme/core!/META-INF/x.xml#2.0").unwrap();
        assert_eq!(artifact.name(), "core");
        assert_eq!(artifact.version(), Some("2.0"));
    }

    #[rstest]
    #[case("jar:acme/core")]
    #[case(":jar:acme/core")]
    #[case("http:jar:acme/core")]
    #[case("artifact:jar:acme//core")]
    #[case("artifact:jar:/acme/core")]
    #[case("artifact:jar:acme/core/")]
    #[case("artifact:jar:core")]
    #[case("artifact:acme/core")]
    #[case("artifact:jar:acme/core#1.0+build")]
    #[case("artifact:jar:acme/core#1,0")]
    #[case("artifact:jar:acme/core#[1.0]")]
    fn test_rejected_coordinates(#[case] urn: &str) {
        assert!(
            matches!(Artifact::parse(urn), Err(LibraryError::InvalidArtifact { .. })),
            "{} should be rejected",
            urn
        );
    }

    #[test]
    fn test_coordinate_accepts_resource_scheme() {
        let artifact = Artifact::parse_coordinate("resource:jar:acme/core").unwrap();
        assert_eq!(artifact.scheme(), "resource");
        assert_eq!(artifact.path(), "acme/core");
        assert!(Artifact::parse("resource:jar:acme/core").is_err());
    }
}
