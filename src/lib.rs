//! urlable - slug and path consistency engine.
//!
//! Maintains a unique, human-readable path for arbitrary entities and
//! keeps it consistent as entities are created, renamed and deleted,
//! including cascading renames to descendant paths.
//!
//! # Architecture
//!
//! ```text
//! entity mutation
//!     -> slug generation        (normalize source fields, enforce uniqueness)
//!     -> path assembly          (prefix + glue + slug + glue + suffix)
//!     -> path registry commit   (atomic, globally unique paths)
//!     -> cascade on rename      (descendant paths re-rooted)
//! ```
//!
//! # Example
//!
//! ```
//! use urlable::{FieldEntity, MemoryRepository, PathPolicy, SaveOptions, UrlManager};
//!
//! let mut manager = UrlManager::new();
//! manager.register(
//!     "post",
//!     PathPolicy::new()
//!         .route_to("posts@show")
//!         .slug_from("name")
//!         .slug_to("slug")
//!         .prefix("blog"),
//! );
//!
//! let mut repo = MemoryRepository::new();
//! let mut post = FieldEntity::new().with("name", "Hello World");
//! manager.create("post", &mut repo, &mut post, SaveOptions::default()).unwrap();
//!
//! assert_eq!(manager.resolve("blog/hello-world").unwrap().owner_id, 1);
//! ```

pub mod core;
pub mod error;
pub mod manager;
pub mod normalize;
pub mod path;
pub mod registry;
pub mod repo;
pub mod router;
pub mod slug;

pub use crate::core::{OwnerRef, UrlPath};
pub use error::{Result, StorageError, UrlError};
pub use manager::{SaveOptions, UrlManager};
pub use normalize::LanguageProfile;
pub use path::{CascadeMode, PathPolicy, Segment};
pub use registry::{PathRecord, PathRegistry};
pub use repo::{DeleteMode, Entity, EntityRepository, FieldEntity, MemoryRepository, RepositoryMap};
pub use router::{EntityHandle, Router};
pub use slug::{Lifecycle, SlugOutcome, SlugPolicy, SlugSource, generate_slug};
