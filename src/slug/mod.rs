//! Slug generation - deriving a unique, URL-safe token from source fields.
//!
//! [`SlugPolicy`] is the per-entity-type configuration, built once and
//! immutable afterwards. [`generate_slug`] runs the per-mutation state
//! machine: gate on lifecycle, gate on supplied source, derive a
//! candidate, enforce uniqueness, write the target field.

mod generate;

pub use generate::{Lifecycle, SlugOutcome, bump_suffix, generate_slug};

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, UrlError};
use crate::normalize::LanguageProfile;
use crate::repo::Entity;

/// Callback deriving a slug fragment from the entity.
///
/// The result is used verbatim: the function is trusted to produce its
/// own URL-safe fragment.
pub type SourceFn = Arc<dyn Fn(&dyn Entity) -> String + Send + Sync>;

/// Where the slug's source text comes from.
#[derive(Clone)]
pub enum SlugSource {
    /// One or more literal field names, joined with the separator.
    Fields(Vec<String>),
    /// A derivation callback.
    Derived(SourceFn),
}

impl SlugSource {
    /// Convenience constructor for a single field.
    pub fn field(name: &str) -> Self {
        Self::Fields(vec![name.to_owned()])
    }
}

impl fmt::Debug for SlugSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Per-entity-type slug configuration.
///
/// `source` and `target` are mandatory; their absence is a configuration
/// error raised at first evaluation, not at construction, so policies
/// can be assembled incrementally.
#[derive(Debug, Clone)]
pub struct SlugPolicy {
    source: Option<SlugSource>,
    target: Option<String>,
    /// Separator inserted between tokens and before uniqueness suffixes.
    pub separator: char,
    /// Transliteration profile.
    pub language: LanguageProfile,
    /// Enforce slug uniqueness within the entity type.
    pub unique: bool,
    /// Generate when the entity is created.
    pub on_create: bool,
    /// Generate when the entity is updated.
    pub on_update: bool,
}

impl Default for SlugPolicy {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            separator: '-',
            language: LanguageProfile::Default,
            unique: true,
            on_create: true,
            on_update: true,
        }
    }
}

impl SlugPolicy {
    /// Start building a policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the slug from a single source field.
    pub fn from_field(mut self, field: &str) -> Self {
        self.source = Some(SlugSource::field(field));
        self
    }

    /// Generate the slug from several source fields, joined with the
    /// separator.
    pub fn from_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source = Some(SlugSource::Fields(
            fields.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Derive the slug with a callback; its result is used verbatim.
    pub fn derived_from<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Entity) -> String + Send + Sync + 'static,
    {
        self.source = Some(SlugSource::Derived(Arc::new(f)));
        self
    }

    /// Store the generated slug in this field.
    pub fn save_to(mut self, field: &str) -> Self {
        self.target = Some(field.to_owned());
        self
    }

    /// Use a custom separator (default `-`).
    pub fn separate_with(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Use a language transliteration profile.
    pub fn in_language(mut self, language: LanguageProfile) -> Self {
        self.language = language;
        self
    }

    /// Allow duplicate slugs within the entity type.
    pub fn allow_duplicates(mut self) -> Self {
        self.unique = false;
        self
    }

    /// Do not generate a slug when the entity is created.
    pub fn skip_on_create(mut self) -> Self {
        self.on_create = false;
        self
    }

    /// Do not generate a slug when the entity is updated.
    pub fn skip_on_update(mut self) -> Self {
        self.on_update = false;
        self
    }

    /// Validate that both mandatory settings are present.
    ///
    /// Hard precondition: a missing source or target is a configuration
    /// error, never a runtime default.
    pub fn validate(&self, owner_type: &str) -> Result<(&SlugSource, &str)> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| UrlError::missing_source_field(owner_type))?;
        let target = self
            .target
            .as_deref()
            .ok_or_else(|| UrlError::missing_target_field(owner_type))?;
        Ok((source, target))
    }

    /// The configured target field, if set.
    pub fn target_field(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = SlugPolicy::new();
        assert_eq!(policy.separator, '-');
        assert!(policy.unique);
        assert!(policy.on_create);
        assert!(policy.on_update);
    }

    #[test]
    fn test_validate_requires_source() {
        let policy = SlugPolicy::new().save_to("slug");
        let err = policy.validate("post").unwrap_err();
        assert!(matches!(err, UrlError::Configuration { .. }));
    }

    #[test]
    fn test_validate_requires_target() {
        let policy = SlugPolicy::new().from_field("name");
        let err = policy.validate("post").unwrap_err();
        assert!(matches!(err, UrlError::Configuration { .. }));
    }

    #[test]
    fn test_validate_complete() {
        let policy = SlugPolicy::new().from_field("name").save_to("slug");
        let (source, target) = policy.validate("post").unwrap();
        assert!(matches!(source, SlugSource::Fields(f) if f == &["name"]));
        assert_eq!(target, "slug");
    }

    #[test]
    fn test_builder_chain() {
        let policy = SlugPolicy::new()
            .from_fields(["first", "last"])
            .save_to("slug")
            .separate_with('_')
            .allow_duplicates()
            .skip_on_update();
        assert_eq!(policy.separator, '_');
        assert!(!policy.unique);
        assert!(!policy.on_update);
        assert!(policy.on_create);
    }
}
