//! Path composition - assembling the stored path from slug, prefix and
//! suffix, and propagating renames to descendant paths.
//!
//! - [`build`]: final path assembly (`prefix glue slug glue suffix`)
//! - [`cascade`]: descendant matching and rewriting on rename
//!
//! A [`PathPolicy`] is the per-entity-type configuration. It owns the
//! [`SlugPolicy`](crate::slug::SlugPolicy) for its type: path management
//! composes slug generation explicitly rather than layering traits.

mod build;
pub mod cascade;

pub use build::build_path;
pub use cascade::CascadeMode;

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, UrlError};
use crate::repo::Entity;
use crate::slug::SlugPolicy;

/// Callback deriving a prefix or suffix segment.
///
/// Invoked with the current segment value (empty on first resolution)
/// and the entity.
pub type SegmentFn = Arc<dyn Fn(&str, &dyn Entity) -> String + Send + Sync>;

/// A prefix or suffix contribution to the final path.
///
/// The sentinel literal `/` means "no segment", distinguishing an
/// intentionally empty segment from an unset one.
#[derive(Clone, Default)]
pub enum Segment {
    /// No contribution.
    #[default]
    None,
    /// A literal string, used as-is.
    Literal(String),
    /// An ordered list, joined with the policy's glue.
    List(Vec<String>),
    /// A derivation callback.
    Derived(SegmentFn),
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_owned())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl<S: Into<String>> From<Vec<S>> for Segment {
    fn from(items: Vec<S>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Per-entity-type path configuration.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    /// Slug generation settings for this entity type.
    pub slug: SlugPolicy,
    /// Segment prepended to the slug.
    pub prefix: Segment,
    /// Segment appended to the slug.
    pub suffix: Segment,
    /// Character joining prefix, slug and suffix.
    pub glue: char,
    /// Rewrite descendant paths when the slug changes.
    pub cascade_on_rename: bool,
    /// How descendants are matched during a cascade.
    pub cascade_mode: CascadeMode,
    handler: Option<String>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            slug: SlugPolicy::default(),
            prefix: Segment::None,
            suffix: Segment::None,
            glue: '/',
            cascade_on_rename: true,
            cascade_mode: CascadeMode::default(),
            handler: None,
        }
    }
}

impl PathPolicy {
    /// Start building a policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the slug from a single source field.
    pub fn slug_from(mut self, field: &str) -> Self {
        self.slug = self.slug.from_field(field);
        self
    }

    /// Store the generated slug in this field.
    pub fn slug_to(mut self, field: &str) -> Self {
        self.slug = self.slug.save_to(field);
        self
    }

    /// Replace the whole slug policy.
    pub fn with_slug(mut self, slug: SlugPolicy) -> Self {
        self.slug = slug;
        self
    }

    /// Prepend a segment to the path.
    pub fn prefix(mut self, segment: impl Into<Segment>) -> Self {
        self.prefix = segment.into();
        self
    }

    /// Derive the prefix with a callback.
    pub fn prefix_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &dyn Entity) -> String + Send + Sync + 'static,
    {
        self.prefix = Segment::Derived(Arc::new(f));
        self
    }

    /// Append a segment to the path.
    pub fn suffix(mut self, segment: impl Into<Segment>) -> Self {
        self.suffix = segment.into();
        self
    }

    /// Derive the suffix with a callback.
    pub fn suffix_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &dyn Entity) -> String + Send + Sync + 'static,
    {
        self.suffix = Segment::Derived(Arc::new(f));
        self
    }

    /// Join segments with a custom glue character (default `/`).
    pub fn glue_with(mut self, glue: char) -> Self {
        self.glue = glue;
        self
    }

    /// Do not rewrite descendant paths on rename.
    pub fn without_cascade(mut self) -> Self {
        self.cascade_on_rename = false;
        self
    }

    /// Use a specific cascade matching mode.
    pub fn cascade_mode(mut self, mode: CascadeMode) -> Self {
        self.cascade_mode = mode;
        self
    }

    /// Set the opaque handler reference the router dispatches to.
    pub fn route_to(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// The handler reference, if set.
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    /// Validate mandatory settings: handler, slug source, slug target.
    ///
    /// The engine never fabricates a default route target.
    pub fn validate(&self, owner_type: &str) -> Result<()> {
        if self.handler.is_none() {
            return Err(UrlError::missing_handler(owner_type));
        }
        self.slug.validate(owner_type)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PathPolicy {
        PathPolicy::new()
            .route_to("posts@show")
            .slug_from("name")
            .slug_to("slug")
    }

    #[test]
    fn test_defaults() {
        let policy = PathPolicy::new();
        assert_eq!(policy.glue, '/');
        assert!(policy.cascade_on_rename);
        assert_eq!(policy.cascade_mode, CascadeMode::Substring);
        assert!(matches!(policy.prefix, Segment::None));
    }

    #[test]
    fn test_validate_requires_handler() {
        let policy = PathPolicy::new().slug_from("name").slug_to("slug");
        assert!(matches!(
            policy.validate("post"),
            Err(UrlError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_requires_slug_fields() {
        let policy = PathPolicy::new().route_to("posts@show");
        assert!(policy.validate("post").is_err());
        assert!(base().validate("post").is_ok());
    }

    #[test]
    fn test_segment_conversions() {
        assert!(matches!(Segment::from("blog"), Segment::Literal(s) if s == "blog"));
        assert!(matches!(
            Segment::from(vec!["a", "b"]),
            Segment::List(items) if items == ["a", "b"]
        ));
    }
}
