//! PathRegistry - the durable mapping of full paths to owning entities.
//!
//! This is the single source of truth for every stored path. Path
//! uniqueness is enforced here, at the storage layer; a violation
//! surfaces as [`UrlError::PathConflict`] and is the ultimate authority
//! over any generation-time uniqueness check.
//!
//! Mutations go through a buffered [`Transaction`]: stage operations,
//! [`check`](PathRegistry::check) them against the live table, then
//! [`apply`](PathRegistry::apply) them. `apply` cannot fail after a
//! successful `check`, which is what makes a multi-row mutation (rename
//! plus cascade) all-or-nothing.

use log::debug;
use rustc_hash::FxHashMap;

use super::record::PathRecord;
use crate::core::{OwnerRef, UrlPath};
use crate::error::{Result, UrlError};
use crate::path::cascade::{self, CascadeMode};

/// A staged registry mutation.
#[derive(Debug, Clone)]
pub enum Op {
    /// Create or repoint the owner's record.
    Upsert {
        /// The record's owner.
        owner: OwnerRef,
        /// The path the record should hold after commit.
        path: UrlPath,
    },
    /// Hard-delete the owner's record.
    Delete {
        /// The record's owner.
        owner: OwnerRef,
    },
}

/// A buffered, all-or-nothing set of registry mutations.
#[derive(Debug, Default)]
pub struct Transaction {
    ops: Vec<Op>,
}

impl Transaction {
    /// Start an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an upsert of the owner's record.
    pub fn upsert(&mut self, owner: OwnerRef, path: UrlPath) {
        self.ops.push(Op::Upsert { owner, path });
    }

    /// Stage a hard delete of the owner's record.
    pub fn delete(&mut self, owner: OwnerRef) {
        self.ops.push(Op::Delete { owner });
    }

    /// Staged operations, in order.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// In-memory path table with global path uniqueness.
#[derive(Debug, Default)]
pub struct PathRegistry {
    /// path -> owner (the unique index).
    by_path: FxHashMap<UrlPath, OwnerRef>,
    /// owner -> record (the composite `(owner_type, owner_id)` index).
    by_owner: FxHashMap<OwnerRef, PathRecord>,
    next_id: u64,
}

impl PathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a path to its owning entity.
    pub fn resolve(&self, path: &str) -> Option<OwnerRef> {
        let path = UrlPath::new(path);
        self.by_path.get(&path).cloned()
    }

    /// Find the record belonging to an owner.
    pub fn find_by_owner(&self, owner: &OwnerRef) -> Option<&PathRecord> {
        self.by_owner.get(owner)
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.by_owner.len()
    }

    /// Check if the registry holds no records.
    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }

    /// All records, in alphabetical path order.
    pub fn records(&self) -> Vec<&PathRecord> {
        let mut records: Vec<_> = self.by_owner.values().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }

    /// Descendant records of a renamed slug, with their rewritten paths.
    ///
    /// Scoped to the same entity type; the renamed owner's own record is
    /// never included (its path equals `old`, not `old/...`).
    pub fn cascade_candidates(
        &self,
        owner_type: &str,
        old: &str,
        new: &str,
        mode: CascadeMode,
    ) -> Vec<(OwnerRef, UrlPath)> {
        self.by_owner
            .values()
            .filter(|record| record.owner.is_type(owner_type))
            .filter(|record| cascade::matches_descendant(&record.path, old, mode))
            .map(|record| {
                let rewritten = cascade::rewrite_descendant(&record.path, old, new);
                (record.owner.clone(), rewritten)
            })
            .collect()
    }

    /// Validate a transaction against the live table.
    ///
    /// Simulates every staged operation in order, including paths freed
    /// by earlier operations in the same transaction, and fails with
    /// [`UrlError::PathConflict`] on the first path that would land on a
    /// different owner's record. Empty paths are refused outright.
    pub fn check(&self, txn: &Transaction) -> Result<()> {
        let mut simulated = self.by_path.clone();
        for op in txn.ops() {
            match op {
                Op::Upsert { owner, path } => {
                    if path.is_empty() {
                        return Err(UrlError::EmptyPath {
                            owner: owner.clone(),
                        });
                    }
                    if let Some(existing) = simulated.get(path)
                        && existing != owner
                    {
                        return Err(UrlError::PathConflict {
                            path: path.clone(),
                            existing: existing.clone(),
                        });
                    }
                    // Free the owner's previous path before claiming the new one.
                    if let Some(record) = self.by_owner.get(owner)
                        && simulated.get(&record.path) == Some(owner)
                    {
                        simulated.remove(&record.path);
                    }
                    simulated.insert(path.clone(), owner.clone());
                }
                Op::Delete { owner } => {
                    if let Some(record) = self.by_owner.get(owner) {
                        simulated.remove(&record.path);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a checked transaction.
    ///
    /// Infallible by construction: every failure mode was rejected by
    /// [`check`](Self::check), so a partial application can never be
    /// observed.
    pub fn apply(&mut self, txn: Transaction) {
        for op in txn.ops {
            match op {
                Op::Upsert { owner, path } => self.upsert_record(owner, path),
                Op::Delete { owner } => {
                    if let Some(record) = self.by_owner.remove(&owner) {
                        self.by_path.remove(&record.path);
                        debug!("deleted path record `{}` of {owner}", record.path);
                    }
                }
            }
        }
    }

    /// Check and apply in one step.
    pub fn commit(&mut self, txn: Transaction) -> Result<()> {
        self.check(&txn)?;
        self.apply(txn);
        Ok(())
    }

    /// Create the owner's record if none exists (lazily, tolerating
    /// out-of-order initialization), otherwise repoint the existing one.
    /// Never creates a duplicate record for the same owner.
    fn upsert_record(&mut self, owner: OwnerRef, path: UrlPath) {
        match self.by_owner.get_mut(&owner) {
            Some(record) => {
                if record.path == path {
                    return;
                }
                self.by_path.remove(&record.path);
                debug!("repointing {owner}: `{}` -> `{path}`", record.path);
                record.repoint(path.clone());
                self.by_path.insert(path, owner);
            }
            None => {
                self.next_id += 1;
                let record = PathRecord::new(self.next_id, owner.clone(), path.clone());
                debug!("created path record `{path}` for {owner}");
                self.by_owner.insert(owner.clone(), record);
                self.by_path.insert(path, owner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(registry: &mut PathRegistry, owner: OwnerRef, path: &str) -> Result<()> {
        let mut txn = Transaction::new();
        txn.upsert(owner, UrlPath::new(path));
        registry.commit(txn)
    }

    #[test]
    fn test_upsert_creates_once() {
        let mut registry = PathRegistry::new();
        let owner = OwnerRef::new("post", 1);

        upsert(&mut registry, owner.clone(), "test-name").unwrap();
        upsert(&mut registry, owner.clone(), "another-name").unwrap();

        // Updated in place, never duplicated.
        assert_eq!(registry.len(), 1);
        let record = registry.find_by_owner(&owner).unwrap();
        assert_eq!(record.path, "another-name");
        assert_eq!(record.id, 1);
        assert_eq!(registry.resolve("test-name"), None);
        assert_eq!(registry.resolve("another-name"), Some(owner));
    }

    #[test]
    fn test_path_conflict() {
        let mut registry = PathRegistry::new();
        upsert(&mut registry, OwnerRef::new("post", 1), "hello").unwrap();

        let err = upsert(&mut registry, OwnerRef::new("page", 9), "hello").unwrap_err();
        assert!(err.is_conflict());
        // The failed transaction left no trace.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_owner_reclaims_own_path() {
        let mut registry = PathRegistry::new();
        let owner = OwnerRef::new("post", 1);
        upsert(&mut registry, owner.clone(), "hello").unwrap();
        upsert(&mut registry, owner, "hello").unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_path_refused() {
        let mut registry = PathRegistry::new();
        let err = upsert(&mut registry, OwnerRef::new("post", 1), "/").unwrap_err();
        assert!(matches!(err, UrlError::EmptyPath { owner } if owner == OwnerRef::new("post", 1)));
    }

    #[test]
    fn test_delete() {
        let mut registry = PathRegistry::new();
        let owner = OwnerRef::new("post", 1);
        upsert(&mut registry, owner.clone(), "hello").unwrap();

        let mut txn = Transaction::new();
        txn.delete(owner.clone());
        registry.commit(txn).unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.resolve("hello"), None);
        assert!(registry.find_by_owner(&owner).is_none());
    }

    #[test]
    fn test_transaction_is_atomic() {
        let mut registry = PathRegistry::new();
        upsert(&mut registry, OwnerRef::new("post", 1), "taken").unwrap();

        // Second op conflicts, so the first op must not land either.
        let mut txn = Transaction::new();
        txn.upsert(OwnerRef::new("post", 2), UrlPath::new("fresh"));
        txn.upsert(OwnerRef::new("post", 3), UrlPath::new("taken"));
        assert!(registry.commit(txn).is_err());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("fresh"), None);
    }

    #[test]
    fn test_rename_frees_old_path_within_transaction() {
        let mut registry = PathRegistry::new();
        let a = OwnerRef::new("post", 1);
        let b = OwnerRef::new("post", 2);
        upsert(&mut registry, a.clone(), "first").unwrap();
        upsert(&mut registry, b.clone(), "second").unwrap();

        // a moves away from `first`, b claims it - in one transaction.
        let mut txn = Transaction::new();
        txn.upsert(a, UrlPath::new("moved"));
        txn.upsert(b, UrlPath::new("first"));
        registry.commit(txn).unwrap();

        assert_eq!(registry.resolve("moved"), Some(OwnerRef::new("post", 1)));
        assert_eq!(registry.resolve("first"), Some(OwnerRef::new("post", 2)));
    }

    #[test]
    fn test_records_alphabetical() {
        let mut registry = PathRegistry::new();
        upsert(&mut registry, OwnerRef::new("post", 1), "zebra").unwrap();
        upsert(&mut registry, OwnerRef::new("post", 2), "alpha").unwrap();

        let paths: Vec<_> = registry.records().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["alpha", "zebra"]);
    }

    #[test]
    fn test_cascade_candidates_scoped_to_type() {
        let mut registry = PathRegistry::new();
        upsert(&mut registry, OwnerRef::new("post", 1), "a").unwrap();
        upsert(&mut registry, OwnerRef::new("post", 2), "a/child").unwrap();
        upsert(&mut registry, OwnerRef::new("page", 3), "a/other").unwrap();
        upsert(&mut registry, OwnerRef::new("post", 4), "abacus").unwrap();

        let mut candidates =
            registry.cascade_candidates("post", "a", "b", CascadeMode::Substring);
        candidates.sort_by_key(|(owner, _)| owner.owner_id);

        // Same type only; `a` itself and `abacus` excluded.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].0, OwnerRef::new("post", 2));
        assert_eq!(candidates[0].1, "b/child");
    }

    #[test]
    fn test_resolve_normalizes_input() {
        let mut registry = PathRegistry::new();
        let owner = OwnerRef::new("post", 1);
        upsert(&mut registry, owner.clone(), "posts/hello").unwrap();
        assert_eq!(registry.resolve("/posts/hello/"), Some(owner));
    }
}
