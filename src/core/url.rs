//! Stored path type for type-safe path handling.
//!
//! Internal representation: the exact string persisted in the path
//! registry, with no leading or trailing `/`.

use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A stored route path.
///
/// Invariants:
/// - No leading or trailing `/`
/// - No surrounding whitespace
/// - Interior segments are kept verbatim (segments are assumed
///   pre-normalized by the slug generator)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Create a path, trimming whitespace and surrounding slashes.
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw.trim().trim_matches('/')))
    }

    /// Get the stored path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the path is empty.
    ///
    /// Empty paths are never persisted; the registry refuses them.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if the path starts with the given prefix.
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Check if the path contains the given substring.
    #[inline]
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    /// Iterate over `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Get the parent path.
    ///
    /// `posts/hello` -> `posts`, `posts` -> `None`
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(Arc::from(&self.0[..idx])))
    }

    /// Replace the first occurrence of `from` with `to`.
    ///
    /// Used by the cascade updater to re-root a descendant path.
    pub fn replace_first(&self, from: &str, to: &str) -> Self {
        Self(Arc::from(self.0.replacen(from, to, 1)))
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UrlPath {
    fn default() -> Self {
        Self::new("")
    }
}

impl AsRef<str> for UrlPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UrlPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for UrlPath {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for UrlPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for UrlPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UrlPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_slashes() {
        assert_eq!(UrlPath::new("/posts/hello/").as_str(), "posts/hello");
        assert_eq!(UrlPath::new("posts/hello").as_str(), "posts/hello");
        assert_eq!(UrlPath::new("  /about/  ").as_str(), "about");
    }

    #[test]
    fn test_empty() {
        assert!(UrlPath::new("").is_empty());
        assert!(UrlPath::new("/").is_empty());
        assert!(!UrlPath::new("a").is_empty());
    }

    #[test]
    fn test_segments() {
        let path = UrlPath::new("blog/posts/hello");
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments, ["blog", "posts", "hello"]);
    }

    #[test]
    fn test_parent() {
        assert_eq!(
            UrlPath::new("posts/hello").parent(),
            Some(UrlPath::new("posts"))
        );
        assert_eq!(UrlPath::new("posts").parent(), None);
    }

    #[test]
    fn test_replace_first() {
        let path = UrlPath::new("a/a/child");
        assert_eq!(path.replace_first("a/", "b/"), UrlPath::new("b/a/child"));
    }

    #[test]
    fn test_equality_with_str() {
        let path = UrlPath::new("/posts/hello/");
        assert_eq!(path, "posts/hello");
    }

    #[test]
    fn test_hash_lookup_by_str() {
        use rustc_hash::FxHashMap;

        let mut map = FxHashMap::default();
        map.insert(UrlPath::new("posts/hello"), 1u32);
        assert_eq!(map.get("posts/hello"), Some(&1));
    }

    #[test]
    fn test_serialize_deserialize() {
        let path = UrlPath::new("posts/hello");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#""posts/hello""#);

        let parsed: UrlPath = serde_json::from_str(r#""/posts/hello/""#).unwrap();
        assert_eq!(parsed, path);
    }
}
