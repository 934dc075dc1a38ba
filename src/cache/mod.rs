//! Client-side cache over the remote collections.
//!
//! One [`ResourceStore`] exists per resource kind. Each keeps the last
//! fetched snapshot of its collection together with the invalidation token
//! it was fetched under:
//!
//! - `list()` serves the snapshot while its token is current and otherwise
//!   refetches, sharing one in-flight request between concurrent callers.
//! - Every successful create, update or delete bumps the token.
//! - A failed fetch leaves the previous snapshot in place (`cached()`).

mod error;
pub(crate) mod lock;
mod resources;
mod store;

pub use error::StoreError;
pub use store::ResourceStore;
