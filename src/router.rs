//! Router collaborator surface.
//!
//! The engine's side of the routing contract: resolve an incoming path
//! to an [`EntityHandle`] naming the owner and the handler reference the
//! external dispatch layer should invoke. Loading the entity and calling
//! the handler is the router host's job, not ours.

use crate::core::OwnerRef;
use crate::error::{Result, UrlError};
use crate::manager::UrlManager;
use crate::repo::RepositoryMap;

/// The resolved target of an incoming path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHandle {
    /// The entity owning the path.
    pub owner: OwnerRef,
    /// Opaque handler reference from the owner type's path policy.
    pub handler: String,
}

/// Path-to-entity resolution over the manager's registry and the typed
/// repository table.
pub struct Router<'a> {
    manager: &'a UrlManager,
    repos: &'a RepositoryMap,
}

impl<'a> Router<'a> {
    /// Create a router over a manager and its repositories.
    pub fn new(manager: &'a UrlManager, repos: &'a RepositoryMap) -> Self {
        Self { manager, repos }
    }

    /// Resolve a path, failing with [`UrlError::NotFound`] on a miss.
    ///
    /// A miss is a routing outcome, not a system fault: the path is
    /// unknown, or its owner's row no longer exists.
    pub fn resolve_path(&self, path: &str) -> Result<EntityHandle> {
        let miss = || UrlError::NotFound(path.to_owned());

        let owner = self.manager.resolve(path).ok_or_else(miss)?;
        let policy = self.manager.policy(&owner.owner_type)?;
        let handler = policy
            .handler()
            .ok_or_else(|| UrlError::missing_handler(&owner.owner_type))?
            .to_owned();

        let repo = self.repos.get(&owner.owner_type).ok_or_else(miss)?;
        if !repo.contains(owner.owner_id) {
            return Err(miss());
        }

        Ok(EntityHandle { owner, handler })
    }

    /// Resolve a path, returning `None` on any miss.
    pub fn try_resolve_path(&self, path: &str) -> Option<EntityHandle> {
        self.resolve_path(path).ok()
    }
}
