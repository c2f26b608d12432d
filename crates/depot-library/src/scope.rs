//! Dependency scopes, classloader categories and resource classifiers

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Dependency tier. Aggregation at a scope includes every lower scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Build,
    #[default]
    Runtime,
    Test,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Build, Scope::Runtime, Scope::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Build => "build",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "build" => Ok(Scope::Build),
            "runtime" => Ok(Scope::Runtime),
            "test" => Ok(Scope::Test),
            _ => Err(format!("unknown scope '{}'", s)),
        }
    }
}

/// Classloader visibility category of a runtime dependency.
///
/// Only the classpath tiers (`System < Public < Protected < Private`) are
/// ordered; `Undefined` and the native categories compare as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Undefined,
    System,
    Public,
    Protected,
    Private,
    W32,
    Nix,
}

impl Category {
    /// Classpath tiers, lowest first
    pub const TIERS: [Category; 4] = [
        Category::System,
        Category::Public,
        Category::Protected,
        Category::Private,
    ];

    /// Position among the classpath tiers, if this category is one
    pub fn tier(&self) -> Option<usize> {
        Self::TIERS.iter().position(|c| c == self)
    }

    /// Classpath tiers strictly below this category
    pub fn lower_tiers(&self) -> &'static [Category] {
        match self.tier() {
            Some(index) => &Self::TIERS[..index],
            None => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Undefined => "undefined",
            Category::System => "system",
            Category::Public => "public",
            Category::Protected => "protected",
            Category::Private => "private",
            Category::W32 => "w32",
            Category::Nix => "nix",
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self.tier(), other.tier()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "undefined" => Ok(Category::Undefined),
            "system" => Ok(Category::System),
            "public" => Ok(Category::Public),
            "protected" => Ok(Category::Protected),
            "private" => Ok(Category::Private),
            "w32" => Ok(Category::W32),
            "nix" => Ok(Category::Nix),
            _ => Err(format!("unknown category '{}'", s)),
        }
    }
}

/// How a resource came to be part of the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Classifier {
    /// Has a basedir and is buildable
    Local,
    /// Declared elsewhere, referenced here
    #[default]
    External,
    /// Synthesized from a bare artifact coordinate
    Anonymous,
}

impl Classifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classifier::Local => "local",
            Classifier::External => "external",
            Classifier::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Classifier::Local),
            "external" => Ok(Classifier::External),
            "anonymous" => Ok(Classifier::Anonymous),
            _ => Err(format!("unknown classifier '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_scope_total_order() {
        assert!(Scope::Build < Scope::Runtime);
        assert!(Scope::Runtime < Scope::Test);
        let mut scopes = vec![Scope::Test, Scope::Build, Scope::Runtime];
        scopes.sort();
        assert_eq!(scopes, Scope::ALL.to_vec());
    }

    #[test]
    fn test_category_tiers_ordered() {
        assert!(Category::System < Category::Public);
        assert!(Category::Public < Category::Protected);
        assert!(Category::Protected < Category::Private);
    }

    #[rstest]
    #[case(Category::Undefined, Category::Public)]
    #[case(Category::W32, Category::System)]
    #[case(Category::Nix, Category::W32)]
    fn test_category_unordered(#[case] a: Category, #[case] b: Category) {
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn test_lower_tiers() {
        assert_eq!(
            Category::Protected.lower_tiers(),
            &[Category::System, Category::Public]
        );
        assert!(Category::System.lower_tiers().is_empty());
        assert!(Category::Nix.lower_tiers().is_empty());
    }

    #[rstest]
    #[case("BUILD", Scope::Build)]
    #[case("Runtime", Scope::Runtime)]
    #[case("test", Scope::Test)]
    fn test_scope_from_str(#[case] input: &str, #[case] expected: Scope) {
        assert_eq!(input.parse::<Scope>().unwrap(), expected);
    }

    #[test]
    fn test_classifier_round_trip() {
        for classifier in [Classifier::Local, Classifier::External, Classifier::Anonymous] {
            assert_eq!(
                classifier.to_string().parse::<Classifier>().unwrap(),
                classifier
            );
        }
        assert!("remote".parse::<Classifier>().is_err());
    }
}
