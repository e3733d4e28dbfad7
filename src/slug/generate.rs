//! The per-mutation slug generation state machine.
//!
//! Evaluate -> Derive -> EnforceUniqueness -> write target field.
//! Skips are legitimate outcomes, not errors: a disabled lifecycle flag
//! or an unsupplied source leaves the target field untouched.

use log::{debug, trace};

use super::{SlugPolicy, SlugSource};
use crate::error::Result;
use crate::normalize::{SENTINEL, normalize};
use crate::repo::{Entity, EntityRepository};

/// Which lifecycle event triggered generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The entity is being created (gated by `on_create`).
    Create,
    /// The entity is being updated (gated by `on_update`).
    Update,
    /// Explicit call outside the lifecycle hooks; never gated.
    Manual,
}

/// Result of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugOutcome {
    /// The target field now holds this slug.
    Generated(String),
    /// Generation was skipped; the target field was left untouched.
    Skipped,
}

/// Run slug generation for one entity mutation.
///
/// The repository provides the uniqueness scope: the entity's own table,
/// unfiltered (soft-deleted rows included), excluding the entity's own
/// key.
pub fn generate_slug(
    entity: &mut dyn Entity,
    policy: &SlugPolicy,
    repo: &dyn EntityRepository,
    lifecycle: Lifecycle,
    owner_type: &str,
) -> Result<SlugOutcome> {
    let (source, target) = policy.validate(owner_type)?;

    let enabled = match lifecycle {
        Lifecycle::Create => policy.on_create,
        Lifecycle::Update => policy.on_update,
        Lifecycle::Manual => true,
    };
    if !enabled {
        trace!("slug generation disabled for {owner_type} on {lifecycle:?}");
        return Ok(SlugOutcome::Skipped);
    }

    if !source_supplied(entity, source) {
        trace!("no slug source supplied for {owner_type}; leaving target untouched");
        return Ok(SlugOutcome::Skipped);
    }

    let mut slug = derive_candidate(entity, policy, source, target);

    if policy.unique {
        slug = make_unique(&slug, policy, repo, target, entity.key());
    }

    debug!("generated slug `{slug}` for {owner_type}");
    entity.set(target, slug.clone());
    Ok(SlugOutcome::Generated(slug))
}

/// True if at least one configured source field holds a value.
///
/// Derived sources are always considered supplied; the callback decides
/// what to produce.
fn source_supplied(entity: &dyn Entity, source: &SlugSource) -> bool {
    match source {
        SlugSource::Fields(fields) => fields.iter().any(|f| entity.get(f).is_some()),
        SlugSource::Derived(_) => true,
    }
}

/// Derive the non-unique candidate slug.
///
/// A target field that differs from its previous persisted value is a
/// manual override and takes precedence over recomputation from source.
fn derive_candidate(
    entity: &dyn Entity,
    policy: &SlugPolicy,
    source: &SlugSource,
    target: &str,
) -> String {
    if let Some(supplied) = manual_override(entity, target) {
        if supplied == SENTINEL {
            return supplied;
        }
        return normalize(&supplied, policy.separator, policy.language);
    }

    match source {
        // Trusted to produce its own fragment; not re-normalized.
        SlugSource::Derived(f) => f(entity),
        SlugSource::Fields(fields) => {
            let joined = fields
                .iter()
                .map(|f| entity.get(f).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(&policy.separator.to_string());
            if joined == SENTINEL {
                joined
            } else {
                normalize(&joined, policy.separator, policy.language)
            }
        }
    }
}

/// The target value, if the caller supplied a custom slug directly.
fn manual_override(entity: &dyn Entity, target: &str) -> Option<String> {
    let original = entity.original(target)?;
    if original.is_empty() {
        return None;
    }
    let current = entity.get(target)?;
    (current != original).then_some(current)
}

/// Append `separator + N` until the candidate neither collides nor is
/// empty.
fn make_unique(
    candidate: &str,
    policy: &SlugPolicy,
    repo: &dyn EntityRepository,
    target: &str,
    own_key: Option<u64>,
) -> String {
    let mut slug = candidate.to_owned();
    let mut n = 1u64;
    while slug.is_empty() || repo.slug_exists(target, &slug, own_key) {
        slug = format!("{candidate}{}{n}", policy.separator);
        n += 1;
    }
    slug
}

/// Increment a slug's numeric uniqueness suffix.
///
/// `hello` -> `hello-1`, `hello-1` -> `hello-2`. Used by the manager to
/// retry after a path conflict surfaced at commit time.
pub fn bump_suffix(slug: &str, separator: char) -> String {
    if let Some((stem, tail)) = slug.rsplit_once(separator)
        && !tail.is_empty()
        && tail.chars().all(|c| c.is_ascii_digit())
        && let Ok(n) = tail.parse::<u64>()
    {
        return format!("{stem}{separator}{}", n + 1);
    }
    format!("{slug}{separator}1")
}
