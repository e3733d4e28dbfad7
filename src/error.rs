//! Error taxonomy for slug and path operations.
//!
//! Two broad families:
//! - `Configuration` is fatal: a policy is missing a mandatory setting.
//!   Raised at first evaluation, never retried.
//! - Path mutation errors (`EmptyPath`, `PathConflict`, `CreateFailed`,
//!   `UpdateFailed`, `DeleteFailed`) abort the enclosing operation after
//!   the staged registry transaction has been discarded.
//!
//! `NotFound` is a routing miss, not a system fault.

use thiserror::Error;

use crate::core::{OwnerRef, UrlPath};

/// Boxed storage-layer error, produced by
/// [`EntityRepository`](crate::repo::EntityRepository) implementations.
pub type StorageError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, UrlError>;

/// Errors surfaced by slug generation, path building and registry mutation.
#[derive(Debug, Error)]
pub enum UrlError {
    /// A mandatory policy setting is missing for the given entity type.
    #[error("entity type `{owner_type}` {message}")]
    Configuration {
        /// Entity type tag whose policy is invalid.
        owner_type: String,
        /// What is missing and where to set it.
        message: String,
    },

    /// An empty path was staged for registration.
    ///
    /// Raised by the registry regardless of which lifecycle operation
    /// staged the transaction.
    #[error("refusing to register an empty path for `{owner}`")]
    EmptyPath {
        /// Owner whose record would have held the empty path.
        owner: OwnerRef,
    },

    /// The path is already registered to a different owner.
    #[error("path `{path}` is already registered to `{existing}`")]
    PathConflict {
        /// The conflicting path.
        path: UrlPath,
        /// Owner that already holds this path.
        existing: OwnerRef,
    },

    /// Creating the entity or its path record failed at the storage layer.
    #[error("failed creating the path record")]
    CreateFailed(#[source] StorageError),

    /// Updating the entity or its path record failed at the storage layer.
    #[error("failed updating the path record")]
    UpdateFailed(#[source] StorageError),

    /// Deleting the entity or its path record failed at the storage layer.
    #[error("failed deleting the path record")]
    DeleteFailed(#[source] StorageError),

    /// No entity resolves to the given path.
    #[error("no entity registered for path `{0}`")]
    NotFound(String),
}

impl UrlError {
    /// Missing source-field setting on a slug or path policy.
    pub fn missing_source_field(owner_type: &str) -> Self {
        Self::Configuration {
            owner_type: owner_type.to_owned(),
            message: "does not set the field to generate the slug from; \
                      set it when building the policy"
                .to_owned(),
        }
    }

    /// Missing target-field setting on a slug or path policy.
    pub fn missing_target_field(owner_type: &str) -> Self {
        Self::Configuration {
            owner_type: owner_type.to_owned(),
            message: "does not set the field to store the generated slug in; \
                      set it when building the policy"
                .to_owned(),
        }
    }

    /// Missing handler reference on a path policy.
    pub fn missing_handler(owner_type: &str) -> Self {
        Self::Configuration {
            owner_type: owner_type.to_owned(),
            message: "does not set the handler the router should dispatch to; \
                      set it when building the policy"
                .to_owned(),
        }
    }

    /// No policy registered for the entity type at all.
    pub fn unregistered_type(owner_type: &str) -> Self {
        Self::Configuration {
            owner_type: owner_type.to_owned(),
            message: "has no registered path policy".to_owned(),
        }
    }

    /// Whether this error is a recoverable path conflict.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::PathConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = UrlError::missing_source_field("post");
        let text = err.to_string();
        assert!(text.contains("`post`"));
        assert!(text.contains("generate the slug from"));
    }

    #[test]
    fn test_conflict_detection() {
        let err = UrlError::PathConflict {
            path: UrlPath::new("posts/hello"),
            existing: OwnerRef::new("post", 1),
        };
        assert!(err.is_conflict());
        assert!(!UrlError::NotFound("x".into()).is_conflict());
    }
}
