//! Polymorphic owner reference.
//!
//! One path table serves many owning entity types; records are
//! disambiguated by an explicit `(owner_type, owner_id)` pair rather
//! than any dynamic type resolution.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Reference to the entity that owns a path record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Entity type tag (e.g., `"post"`, `"page"`).
    pub owner_type: Cow<'static, str>,
    /// Primary key of the owning entity within its own table.
    pub owner_id: u64,
}

impl OwnerRef {
    /// Create an owner reference.
    pub fn new(owner_type: impl Into<Cow<'static, str>>, owner_id: u64) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id,
        }
    }

    /// Check if this owner belongs to the given entity type.
    pub fn is_type(&self, owner_type: &str) -> bool {
        self.owner_type == owner_type
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.owner_type, self.owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let owner = OwnerRef::new("post", 42);
        assert_eq!(owner.to_string(), "post#42");
    }

    #[test]
    fn test_is_type() {
        let owner = OwnerRef::new("post", 1);
        assert!(owner.is_type("post"));
        assert!(!owner.is_type("page"));
    }

    #[test]
    fn test_equality() {
        assert_eq!(OwnerRef::new("post", 1), OwnerRef::new("post", 1));
        assert_ne!(OwnerRef::new("post", 1), OwnerRef::new("page", 1));
        assert_ne!(OwnerRef::new("post", 1), OwnerRef::new("post", 2));
    }
}
