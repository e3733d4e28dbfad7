//! Persistence collaborator contract.
//!
//! The engine never issues raw storage calls. Owning entities are
//! persisted through [`EntityRepository`], one implementation per entity
//! type, with a typed [`RepositoryMap`] from type tag to repository for
//! polymorphic lookup.
//!
//! [`MemoryRepository`] and [`FieldEntity`] are the in-process
//! implementations used by the tests; callers with real storage bring
//! their own.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// How an entity is being deleted.
///
/// Only permanent removal deletes the path record; reversible (soft)
/// deletion leaves it intact so the path keeps resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Hard delete. The path record is removed with the entity.
    Permanent,
    /// Reversible delete. The entity is flagged, the path record stays.
    Soft,
}

/// An owning entity: a record with named string fields and a numeric key.
///
/// `original` exposes the previous persisted value of a field, which is
/// how the slug generator tells a manual slug override apart from a
/// recomputation, and how the cascade updater finds the old path root.
pub trait Entity {
    /// Primary key, if the entity has been persisted.
    fn key(&self) -> Option<u64>;

    /// Set the primary key (called by the repository on insert).
    fn set_key(&mut self, key: u64);

    /// Current value of a field.
    fn get(&self, field: &str) -> Option<String>;

    /// Set a field's current value.
    fn set(&mut self, field: &str, value: String);

    /// Previous persisted value of a field.
    fn original(&self, field: &str) -> Option<String>;

    /// Snapshot of all current fields, for persistence.
    fn fields(&self) -> Vec<(String, String)>;

    /// Mark the current field values as persisted.
    ///
    /// Invoked by the manager after a successful create or update.
    /// Afterwards `original` must return the values just written, so the
    /// next mutation is diffed against the stored state, not a stale
    /// snapshot.
    fn mark_persisted(&mut self);
}

/// Transactional repository contract for one entity type.
///
/// Object-safe so repositories for different entity types can share a
/// [`RepositoryMap`].
pub trait EntityRepository {
    /// Persist a new entity row, assigning and returning its key.
    fn insert(&mut self, entity: &mut dyn Entity) -> Result<u64, StorageError>;

    /// Persist updated field values for an existing entity.
    fn store(&mut self, entity: &dyn Entity) -> Result<(), StorageError>;

    /// Remove an entity row, permanently or reversibly.
    fn remove(&mut self, key: u64, mode: DeleteMode) -> Result<(), StorageError>;

    /// Whether a row with this key exists (soft-deleted rows included).
    fn contains(&self, key: u64) -> bool;

    /// Whether any row other than `exclude` holds `value` in `field`.
    ///
    /// Checks the unfiltered table: soft-deleted rows count, so their
    /// slugs are never reused.
    fn slug_exists(&self, field: &str, value: &str, exclude: Option<u64>) -> bool;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// A generic field-map entity, sufficient for tests and simple callers.
#[derive(Debug, Clone, Default)]
pub struct FieldEntity {
    key: Option<u64>,
    fields: FxHashMap<String, String>,
    originals: FxHashMap<String, String>,
}

impl FieldEntity {
    /// Create an empty, unsaved entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }
}

impl Entity for FieldEntity {
    fn key(&self) -> Option<u64> {
        self.key
    }

    fn set_key(&mut self, key: u64) {
        self.key = Some(key);
    }

    fn get(&self, field: &str) -> Option<String> {
        self.fields.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: String) {
        self.fields.insert(field.to_owned(), value);
    }

    fn original(&self, field: &str) -> Option<String> {
        self.originals.get(field).cloned()
    }

    fn fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn mark_persisted(&mut self) {
        self.originals = self.fields.clone();
    }
}

/// One stored row in a [`MemoryRepository`].
#[derive(Debug, Clone, Default)]
struct StoredRow {
    fields: FxHashMap<String, String>,
    deleted: bool,
}

/// In-memory entity repository with soft-delete support.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    rows: FxHashMap<u64, StoredRow>,
    next_key: u64,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, soft-deleted included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the repository holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the row is present but flagged as soft-deleted.
    pub fn is_soft_deleted(&self, key: u64) -> bool {
        self.rows.get(&key).is_some_and(|row| row.deleted)
    }

    /// Read one field of a stored row.
    pub fn field(&self, key: u64, field: &str) -> Option<String> {
        self.rows.get(&key).and_then(|row| row.fields.get(field).cloned())
    }
}

impl EntityRepository for MemoryRepository {
    fn insert(&mut self, entity: &mut dyn Entity) -> Result<u64, StorageError> {
        self.next_key += 1;
        let key = self.next_key;
        let row = StoredRow {
            fields: entity.fields().into_iter().collect(),
            deleted: false,
        };
        self.rows.insert(key, row);
        entity.set_key(key);
        Ok(key)
    }

    fn store(&mut self, entity: &dyn Entity) -> Result<(), StorageError> {
        let key = entity
            .key()
            .ok_or("cannot update an entity that was never inserted")?;
        let row = self
            .rows
            .get_mut(&key)
            .ok_or_else(|| format!("no row with key {key}"))?;
        row.fields = entity.fields().into_iter().collect();
        Ok(())
    }

    fn remove(&mut self, key: u64, mode: DeleteMode) -> Result<(), StorageError> {
        match mode {
            DeleteMode::Permanent => {
                self.rows
                    .remove(&key)
                    .ok_or_else(|| format!("no row with key {key}"))?;
            }
            DeleteMode::Soft => {
                self.rows
                    .get_mut(&key)
                    .ok_or_else(|| format!("no row with key {key}"))?
                    .deleted = true;
            }
        }
        Ok(())
    }

    fn contains(&self, key: u64) -> bool {
        self.rows.contains_key(&key)
    }

    fn slug_exists(&self, field: &str, value: &str, exclude: Option<u64>) -> bool {
        self.rows.iter().any(|(key, row)| {
            Some(*key) != exclude && row.fields.get(field).is_some_and(|v| v == value)
        })
    }
}

// ============================================================================
// RepositoryMap
// ============================================================================

/// Typed lookup table from entity type tag to its repository.
#[derive(Default)]
pub struct RepositoryMap {
    repos: FxHashMap<Cow<'static, str>, Box<dyn EntityRepository>>,
}

impl RepositoryMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository for an entity type.
    pub fn insert(
        &mut self,
        owner_type: impl Into<Cow<'static, str>>,
        repo: Box<dyn EntityRepository>,
    ) {
        self.repos.insert(owner_type.into(), repo);
    }

    /// Look up the repository for an entity type.
    pub fn get(&self, owner_type: &str) -> Option<&dyn EntityRepository> {
        self.repos.get(owner_type).map(|b| b.as_ref())
    }

    /// Mutable lookup, for lifecycle operations.
    pub fn get_mut(&mut self, owner_type: &str) -> Option<&mut (dyn EntityRepository + 'static)> {
        self.repos.get_mut(owner_type).map(|b| b.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_key() {
        let mut repo = MemoryRepository::new();
        let mut entity = FieldEntity::new().with("name", "Test name");
        let key = repo.insert(&mut entity).unwrap();

        assert_eq!(entity.key(), Some(key));
        assert!(repo.contains(key));
        assert_eq!(repo.field(key, "name").as_deref(), Some("Test name"));
    }

    #[test]
    fn test_store_updates_fields() {
        let mut repo = MemoryRepository::new();
        let mut entity = FieldEntity::new().with("name", "Before");
        let key = repo.insert(&mut entity).unwrap();

        entity.set("name", "After".into());
        repo.store(&entity).unwrap();
        assert_eq!(repo.field(key, "name").as_deref(), Some("After"));
    }

    #[test]
    fn test_store_unsaved_fails() {
        let mut repo = MemoryRepository::new();
        let entity = FieldEntity::new().with("name", "X");
        assert!(repo.store(&entity).is_err());
    }

    #[test]
    fn test_soft_delete_keeps_row() {
        let mut repo = MemoryRepository::new();
        let mut entity = FieldEntity::new().with("slug", "hello");
        let key = repo.insert(&mut entity).unwrap();

        repo.remove(key, DeleteMode::Soft).unwrap();
        assert!(repo.contains(key));
        assert!(repo.is_soft_deleted(key));

        repo.remove(key, DeleteMode::Permanent).unwrap();
        assert!(!repo.contains(key));
    }

    #[test]
    fn test_slug_exists_includes_soft_deleted() {
        let mut repo = MemoryRepository::new();
        let mut entity = FieldEntity::new().with("slug", "hello");
        let key = repo.insert(&mut entity).unwrap();
        repo.remove(key, DeleteMode::Soft).unwrap();

        // A soft-deleted row still blocks slug reuse.
        assert!(repo.slug_exists("slug", "hello", None));
        assert!(!repo.slug_exists("slug", "hello", Some(key)));
        assert!(!repo.slug_exists("slug", "other", None));
    }

    #[test]
    fn test_field_entity_originals() {
        let mut entity = FieldEntity::new().with("slug", "a");
        assert_eq!(entity.original("slug"), None);

        entity.mark_persisted();
        entity.set("slug", "b".into());
        assert_eq!(entity.original("slug").as_deref(), Some("a"));
        assert_eq!(entity.get("slug").as_deref(), Some("b"));
    }

    #[test]
    fn test_repository_map() {
        let mut map = RepositoryMap::new();
        map.insert("post", Box::new(MemoryRepository::new()));

        assert!(map.get("post").is_some());
        assert!(map.get("page").is_none());

        let repo = map.get_mut("post").unwrap();
        let mut entity = FieldEntity::new().with("name", "n");
        repo.insert(&mut entity).unwrap();
        assert!(map.get("post").unwrap().contains(1));
    }
}
