//! Final path assembly.
//!
//! `prefix + glue + slug + glue + suffix`, omitting the glue beside an
//! empty segment. No normalization is reapplied here; segments are
//! assumed pre-normalized.

use super::{PathPolicy, Segment};
use crate::core::UrlPath;
use crate::error::Result;
use crate::normalize::SENTINEL;
use crate::repo::Entity;

/// Compose the full stored path for an entity.
///
/// The slug is read from the policy's target field; prefix and suffix
/// are resolved independently from their [`Segment`] variants.
pub fn build_path(entity: &dyn Entity, policy: &PathPolicy, owner_type: &str) -> Result<UrlPath> {
    let (_, target) = policy.slug.validate(owner_type)?;
    let slug = entity.get(target).unwrap_or_default();

    let prefix = resolve_segment(&policy.prefix, entity, policy.glue);
    let suffix = resolve_segment(&policy.suffix, entity, policy.glue);

    let mut full = String::with_capacity(prefix.len() + slug.len() + suffix.len() + 2);
    if !prefix.is_empty() {
        full.push_str(&prefix);
        full.push(policy.glue);
    }
    full.push_str(&slug);
    if !suffix.is_empty() {
        full.push(policy.glue);
        full.push_str(&suffix);
    }

    Ok(UrlPath::new(&full))
}

/// Resolve one prefix/suffix segment to its string contribution.
///
/// The sentinel `/` literal resolves to "no segment".
fn resolve_segment(segment: &Segment, entity: &dyn Entity, glue: char) -> String {
    let resolved = match segment {
        Segment::None => String::new(),
        Segment::Literal(s) => s.clone(),
        Segment::List(items) => items.join(&glue.to_string()),
        Segment::Derived(f) => f("", entity),
    };
    if resolved == SENTINEL {
        String::new()
    } else {
        resolved
    }
}
