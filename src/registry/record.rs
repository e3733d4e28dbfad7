//! The persisted path record.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::core::{OwnerRef, UrlPath};

/// One row of the path table.
///
/// Invariants:
/// - `path` is globally unique across all records
/// - each owner holds at most one active record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Registry-assigned primary key.
    pub id: u64,
    /// The stored path, unique across every entity type.
    pub path: UrlPath,
    /// The owning entity.
    pub owner: OwnerRef,
    /// When the record was first created.
    pub created_at: SystemTime,
    /// When the path last changed.
    pub updated_at: SystemTime,
}

impl PathRecord {
    /// Create a fresh record with both timestamps set to now.
    pub fn new(id: u64, owner: OwnerRef, path: UrlPath) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            path,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point the record at a new path, refreshing `updated_at`.
    pub fn repoint(&mut self, path: UrlPath) {
        self.path = path;
        self.updated_at = SystemTime::now();
    }
}
