//! Core data types shared by every component.
//!
//! - [`url`]: [`UrlPath`], the stored route path
//! - [`owner`]: [`OwnerRef`], the polymorphic owner reference

mod owner;
mod url;

pub use owner::OwnerRef;
pub use url::UrlPath;
