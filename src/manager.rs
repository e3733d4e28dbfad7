//! Lifecycle operations - the path management component.
//!
//! [`UrlManager`] ties the pieces together: it holds the per-type
//! [`PathPolicy`] table and the shared [`PathRegistry`], and exposes the
//! explicit lifecycle calls (`create`, `update`, `save`, `delete`) that
//! an entity's repository-layer wrapper invokes. Slug generation is a
//! component it drives, not a trait it inherits.
//!
//! Every operation that touches both the owning entity and its path
//! record stages the registry mutations first, checks them, persists the
//! entity, then applies - so a failure at any point leaves no partial
//! state behind.
//!
//! Generation-time uniqueness checking is optimistic; the registry's
//! uniqueness constraint is the ultimate authority. On a surfaced
//! [`PathConflict`](crate::UrlError::PathConflict) the manager retries
//! with an incremented numeric suffix, a bounded number of times, before
//! giving up.

use std::borrow::Cow;

use log::{debug, warn};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::OwnerRef;
use crate::error::{Result, UrlError};
use crate::path::{PathPolicy, build_path};
use crate::registry::{PathRecord, PathRegistry, Transaction};
use crate::repo::{DeleteMode, Entity, EntityRepository};
use crate::slug::{Lifecycle, bump_suffix, generate_slug};

/// Maximum re-derivations after a commit-time path conflict.
const CONFLICT_RETRIES: usize = 8;

/// Per-call options for create/update/save.
///
/// Replaces the historical per-request global "skip generation" flag
/// with an explicit argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Persist the entity without generating a slug or touching its
    /// path record.
    pub skip_path_generation: bool,
}

impl SaveOptions {
    /// Options that skip slug and path generation for this call only.
    pub const fn skip_generation() -> Self {
        Self {
            skip_path_generation: true,
        }
    }
}

/// The slug/path consistency engine.
pub struct UrlManager {
    registry: RwLock<PathRegistry>,
    policies: FxHashMap<Cow<'static, str>, PathPolicy>,
    base_url: Option<String>,
}

impl Default for UrlManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlManager {
    /// Create a manager with an empty registry and no registered types.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(PathRegistry::new()),
            policies: FxHashMap::default(),
            base_url: None,
        }
    }

    /// Set the base URL used by [`url_for`](Self::url_for).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Register the path policy for an entity type.
    ///
    /// Policies are immutable after registration; register them all
    /// before handing the manager out.
    pub fn register(&mut self, owner_type: impl Into<Cow<'static, str>>, policy: PathPolicy) {
        self.policies.insert(owner_type.into(), policy);
    }

    /// Look up the policy for an entity type.
    pub fn policy(&self, owner_type: &str) -> Result<&PathPolicy> {
        self.policies
            .get(owner_type)
            .ok_or_else(|| UrlError::unregistered_type(owner_type))
    }

    /// Resolve a path to its owning entity.
    pub fn resolve(&self, path: &str) -> Option<OwnerRef> {
        self.registry.read().resolve(path)
    }

    /// The path record belonging to an owner, if any.
    pub fn record_for(&self, owner: &OwnerRef) -> Option<PathRecord> {
        self.registry.read().find_by_owner(owner).cloned()
    }

    /// The owner's stored relative path.
    pub fn uri_for(&self, owner: &OwnerRef) -> Option<String> {
        self.record_for(owner).map(|record| record.path.to_string())
    }

    /// The owner's absolute URL, if a base URL is configured.
    pub fn url_for(&self, owner: &OwnerRef) -> Option<String> {
        let uri = self.uri_for(owner)?;
        let base = self.base_url.as_deref()?;
        Some(format!("{}/{uri}", base.trim_end_matches('/')))
    }

    /// Run a closure against the registry (read lock).
    pub fn with_registry<T>(&self, f: impl FnOnce(&PathRegistry) -> T) -> T {
        f(&self.registry.read())
    }

    /// Create an entity and its path record in one atomic step.
    ///
    /// The slug is generated first (gated by the policy's `on_create`
    /// flag), the entity is inserted, and the record is registered once
    /// the slug value is non-empty. An entity whose source fields are
    /// all unset is persisted without a record; the record appears
    /// lazily on the first update that supplies one.
    pub fn create(
        &self,
        owner_type: &str,
        repo: &mut dyn EntityRepository,
        entity: &mut dyn Entity,
        opts: SaveOptions,
    ) -> Result<()> {
        let policy = self.policy(owner_type)?;
        if opts.skip_path_generation {
            repo.insert(entity).map_err(UrlError::CreateFailed)?;
            entity.mark_persisted();
            return Ok(());
        }
        policy.validate(owner_type)?;
        let (_, target) = policy.slug.validate(owner_type)?;

        generate_slug(entity, &policy.slug, repo, Lifecycle::Create, owner_type)?;
        let key = repo.insert(entity).map_err(UrlError::CreateFailed)?;

        let slug = entity.get(target).unwrap_or_default();
        if slug.is_empty() {
            entity.mark_persisted();
            return Ok(());
        }

        let owner = OwnerRef::new(owner_type.to_owned(), key);
        let mut registry = self.registry.write();
        let mut attempt = 0;
        loop {
            let path = build_path(entity, policy, owner_type)?;
            let mut txn = Transaction::new();
            txn.upsert(owner.clone(), path);

            match registry.check(&txn) {
                Ok(()) => {
                    registry.apply(txn);
                    entity.mark_persisted();
                    return Ok(());
                }
                Err(err) if err.is_conflict() && attempt < CONFLICT_RETRIES => {
                    attempt += 1;
                    self.bump_entity_slug(entity, policy, target, attempt);
                    repo.store(entity).map_err(UrlError::CreateFailed)?;
                }
                Err(err) => {
                    // Keep "entity without a path" from becoming visible.
                    if let Err(remove_err) = repo.remove(key, DeleteMode::Permanent) {
                        warn!("could not remove entity {owner} after failed create: {remove_err}");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Update an entity, upsert its path record and cascade the rename
    /// to descendant paths, all in one atomic step.
    ///
    /// The record is created lazily if the entity never had one
    /// (tolerating out-of-order initialization).
    pub fn update(
        &self,
        owner_type: &str,
        repo: &mut dyn EntityRepository,
        entity: &mut dyn Entity,
        opts: SaveOptions,
    ) -> Result<()> {
        let policy = self.policy(owner_type)?;
        if opts.skip_path_generation {
            repo.store(entity).map_err(UrlError::UpdateFailed)?;
            entity.mark_persisted();
            return Ok(());
        }
        policy.validate(owner_type)?;
        let (_, target) = policy.slug.validate(owner_type)?;

        let old_slug = entity.original(target);
        generate_slug(entity, &policy.slug, repo, Lifecycle::Update, owner_type)?;
        let key = entity
            .key()
            .ok_or_else(|| UrlError::UpdateFailed("entity was never inserted".into()))?;
        let owner = OwnerRef::new(owner_type.to_owned(), key);

        let mut registry = self.registry.write();
        let mut attempt = 0;
        loop {
            let new_slug = entity.get(target).unwrap_or_default();
            let mut txn = Transaction::new();
            if !new_slug.is_empty() {
                let path = build_path(entity, policy, owner_type)?;
                txn.upsert(owner.clone(), path);
                stage_cascade(&registry, &mut txn, policy, owner_type, old_slug.as_deref(), &new_slug);
            }

            match registry.check(&txn) {
                Ok(()) => {
                    repo.store(entity).map_err(UrlError::UpdateFailed)?;
                    registry.apply(txn);
                    entity.mark_persisted();
                    return Ok(());
                }
                Err(err) if err.is_conflict() && attempt < CONFLICT_RETRIES => {
                    attempt += 1;
                    self.bump_entity_slug(entity, policy, target, attempt);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Create or update, depending on whether the entity has been
    /// persisted before.
    pub fn save(
        &self,
        owner_type: &str,
        repo: &mut dyn EntityRepository,
        entity: &mut dyn Entity,
        opts: SaveOptions,
    ) -> Result<()> {
        match entity.key() {
            None => self.create(owner_type, repo, entity, opts),
            Some(_) => self.update(owner_type, repo, entity, opts),
        }
    }

    /// Delete an entity.
    ///
    /// Permanent removal deletes the path record in the same step;
    /// reversible (soft) deletion leaves the record intact so the path
    /// keeps resolving.
    pub fn delete(
        &self,
        owner_type: &str,
        repo: &mut dyn EntityRepository,
        entity: &dyn Entity,
        mode: DeleteMode,
    ) -> Result<()> {
        let key = entity
            .key()
            .ok_or_else(|| UrlError::DeleteFailed("entity was never inserted".into()))?;

        match mode {
            DeleteMode::Soft => repo.remove(key, mode).map_err(UrlError::DeleteFailed),
            DeleteMode::Permanent => {
                let mut registry = self.registry.write();
                repo.remove(key, mode).map_err(UrlError::DeleteFailed)?;
                let mut txn = Transaction::new();
                txn.delete(OwnerRef::new(owner_type.to_owned(), key));
                // Deletes cannot conflict; apply directly.
                registry.apply(txn);
                Ok(())
            }
        }
    }

    /// Increment the entity's slug suffix after a commit-time conflict.
    fn bump_entity_slug(
        &self,
        entity: &mut dyn Entity,
        policy: &PathPolicy,
        target: &str,
        attempt: usize,
    ) {
        let current = entity.get(target).unwrap_or_default();
        let bumped = bump_suffix(&current, policy.slug.separator);
        debug!("path conflict (attempt {attempt}): retrying `{current}` as `{bumped}`");
        entity.set(target, bumped);
    }
}

/// Stage descendant-path rewrites when the slug actually changed.
fn stage_cascade(
    registry: &PathRegistry,
    txn: &mut Transaction,
    policy: &PathPolicy,
    owner_type: &str,
    old_slug: Option<&str>,
    new_slug: &str,
) {
    if !policy.cascade_on_rename {
        return;
    }
    let Some(old) = old_slug else { return };
    if old.is_empty() || old == new_slug {
        return;
    }

    let old_trimmed = old.trim_matches('/');
    let new_trimmed = new_slug.trim_matches('/');
    let candidates =
        registry.cascade_candidates(owner_type, old_trimmed, new_trimmed, policy.cascade_mode);
    if !candidates.is_empty() {
        debug!(
            "cascading rename `{old_trimmed}` -> `{new_trimmed}`: {} descendant path(s)",
            candidates.len()
        );
    }
    for (owner, path) in candidates {
        txn.upsert(owner, path);
    }
}
