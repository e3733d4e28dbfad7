//! Cascading rename propagation.
//!
//! When an entity's slug changes from `old` to `new`, every descendant
//! path that embeds `old` as a segment prefix must be re-rooted under
//! `new`. This is a string-substitution cascade, not a structural tree
//! rewrite.
//!
//! The historical [`CascadeMode::Substring`] matching can misfire on two
//! unrelated entities whose paths coincidentally share a `/{old}/`
//! pattern. [`CascadeMode::Prefix`] is the stricter structural
//! alternative; it only matches paths that start with `old/`.

use serde::{Deserialize, Serialize};

use crate::core::UrlPath;

/// How descendant paths are matched during a cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeMode {
    /// Match `old/...` prefixes and `/old/` substrings anywhere in the
    /// path. Compatible with the historical behavior; can collide on
    /// coincidental substring matches.
    #[default]
    Substring,
    /// Match only paths that start with `old/`.
    Prefix,
}

/// Check whether a stored path is a descendant of the renamed slug.
///
/// `old` must already be trimmed of surrounding slashes. A path equal to
/// `old` itself is not a descendant.
pub fn matches_descendant(path: &UrlPath, old: &str, mode: CascadeMode) -> bool {
    if old.is_empty() {
        return false;
    }
    let head = format!("{old}/");
    match mode {
        CascadeMode::Prefix => path.starts_with(&head),
        CascadeMode::Substring => path.starts_with(&head) || path.contains(&format!("/{head}")),
    }
}

/// Re-root a matched descendant path from `old` to `new`.
///
/// Replaces the first occurrence of `old/` with `new/`.
pub fn rewrite_descendant(path: &UrlPath, old: &str, new: &str) -> UrlPath {
    path.replace_first(&format!("{old}/"), &format!("{new}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_direct_child() {
        let path = UrlPath::new("a/child");
        assert!(matches_descendant(&path, "a", CascadeMode::Substring));
        assert!(matches_descendant(&path, "a", CascadeMode::Prefix));
    }

    #[test]
    fn test_matches_deep_descendant() {
        let path = UrlPath::new("a/child/grandchild");
        assert!(matches_descendant(&path, "a", CascadeMode::Substring));
        assert!(matches_descendant(&path, "a", CascadeMode::Prefix));
    }

    #[test]
    fn test_matches_interior_segment() {
        let path = UrlPath::new("blog/a/child");
        assert!(matches_descendant(&path, "a", CascadeMode::Substring));
        // Prefix mode only matches from the first segment.
        assert!(!matches_descendant(&path, "a", CascadeMode::Prefix));
    }

    #[test]
    fn test_non_segment_substring_unaffected() {
        // `abacus` contains `a` but not as a segment.
        let path = UrlPath::new("abacus");
        assert!(!matches_descendant(&path, "a", CascadeMode::Substring));

        let path = UrlPath::new("abacus/child");
        assert!(!matches_descendant(&path, "a", CascadeMode::Substring));
    }

    #[test]
    fn test_self_is_not_descendant() {
        let path = UrlPath::new("a");
        assert!(!matches_descendant(&path, "a", CascadeMode::Substring));
    }

    #[test]
    fn test_empty_old_never_matches() {
        let path = UrlPath::new("a/child");
        assert!(!matches_descendant(&path, "", CascadeMode::Substring));
    }

    #[test]
    fn test_rewrite_child() {
        let path = UrlPath::new("a/child");
        assert_eq!(rewrite_descendant(&path, "a", "b"), "b/child");
    }

    #[test]
    fn test_rewrite_interior() {
        let path = UrlPath::new("blog/a/child");
        assert_eq!(rewrite_descendant(&path, "a", "b"), "blog/b/child");
    }

    #[test]
    fn test_rewrite_only_first_occurrence() {
        let path = UrlPath::new("a/a/child");
        assert_eq!(rewrite_descendant(&path, "a", "b"), "b/a/child");
    }

    #[test]
    fn test_rewrite_multi_segment_slug() {
        // Slug values may themselves contain separators.
        let path = UrlPath::new("docs/v1/guide/intro");
        assert!(matches_descendant(&path, "docs/v1", CascadeMode::Prefix));
        assert_eq!(
            rewrite_descendant(&path, "docs/v1", "docs/v2"),
            "docs/v2/guide/intro"
        );
    }
}
