//! Resource address and namespace prefix types.
//!
//! Addresses are treated as opaque dot-segmented strings. The only structure
//! this crate relies on is the segment boundary that follows a namespace
//! prefix.

use serde::{Deserialize, Serialize};

/// Segment separator used in resource addresses.
pub const SEGMENT_SEPARATOR: char = '.';

/// Opening bracket of an index key (`module.app["blue"]`).
const INDEX_OPEN: char = '[';

/// Identifier of a tracked resource in the state store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAddress(String);

impl ResourceAddress {
    /// Creates a new resource address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the address is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Leading segment(s) grouping related resources.
///
/// Trailing separators are stripped on construction, so `module.app.` and
/// `module.app` name the same namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespacePrefix(String);

impl NamespacePrefix {
    /// Creates a namespace prefix, stripping trailing separators.
    #[must_use]
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self(
            prefix
                .as_ref()
                .trim()
                .trim_end_matches(SEGMENT_SEPARATOR)
                .to_string(),
        )
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the prefix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the part of `address` that follows this prefix.
    ///
    /// Matching happens on a segment boundary only: the remainder is empty
    /// (the prefix names the address exactly), starts with `.` (a child
    /// address) or starts with `[` (an index key on the prefix). `app` does
    /// not match `application.web`.
    #[must_use]
    pub fn strip_from<'a>(&self, address: &'a str) -> Option<&'a str> {
        if self.is_empty() {
            return None;
        }

        let remainder = address.strip_prefix(self.0.as_str())?;
        if remainder.is_empty()
            || remainder.starts_with(SEGMENT_SEPARATOR)
            || remainder.starts_with(INDEX_OPEN)
        {
            Some(remainder)
        } else {
            None
        }
    }

    /// Joins a remainder produced by [`Self::strip_from`] onto this prefix.
    ///
    /// With an empty prefix the remainder is re-rooted by dropping its
    /// leading separator. Returns `None` when that leaves no usable address.
    #[must_use]
    pub fn join(&self, remainder: &str) -> Option<ResourceAddress> {
        if !self.is_empty() {
            return Some(ResourceAddress::new(format!("{}{remainder}", self.0)));
        }

        remainder
            .strip_prefix(SEGMENT_SEPARATOR)
            .filter(|rest| !rest.is_empty())
            .map(ResourceAddress::from)
    }
}

impl std::fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_strips_trailing_separator() {
        assert_eq!(NamespacePrefix::new("module.app.").as_str(), "module.app");
        assert_eq!(NamespacePrefix::new("module.app").as_str(), "module.app");
        assert!(NamespacePrefix::new(".").is_empty());
    }

    #[test]
    fn test_strip_from_segment_boundary() {
        let prefix = NamespacePrefix::new("app");

        assert_eq!(prefix.strip_from("app.foo"), Some(".foo"));
        assert_eq!(prefix.strip_from("app[\"blue\"].foo"), Some("[\"blue\"].foo"));
        assert_eq!(prefix.strip_from("app"), Some(""));
        assert_eq!(prefix.strip_from("application.foo"), None);
        assert_eq!(prefix.strip_from("other.app.foo"), None);
    }

    #[test]
    fn test_empty_prefix_matches_nothing() {
        assert_eq!(NamespacePrefix::default().strip_from("app.foo"), None);
    }

    #[test]
    fn test_join_with_prefix() {
        let prefix = NamespacePrefix::new("module.new");

        assert_eq!(
            prefix.join(".aws_instance.web"),
            Some(ResourceAddress::from("module.new.aws_instance.web"))
        );
        assert_eq!(
            prefix.join("[0].aws_instance.web"),
            Some(ResourceAddress::from("module.new[0].aws_instance.web"))
        );
        assert_eq!(prefix.join(""), Some(ResourceAddress::from("module.new")));
    }

    #[test]
    fn test_join_without_prefix() {
        let prefix = NamespacePrefix::default();

        assert_eq!(
            prefix.join(".aws_instance.web"),
            Some(ResourceAddress::from("aws_instance.web"))
        );
        assert_eq!(prefix.join(""), None);
        assert_eq!(prefix.join("[0].aws_instance.web"), None);
    }
}
