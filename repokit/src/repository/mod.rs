//! Repository capabilities and the façade over them
//!
//! Storage backends implement [`Repository`] or [`AsyncRepository`] (and
//! optionally [`UnitOfWork`] / [`AsyncUnitOfWork`]). Callers then use the
//! façade operations, either as free functions in [`facade`] and
//! [`facade_async`] or as methods through [`RepositoryExt`] and
//! [`AsyncRepositoryExt`].
//!
//! # Features
//!
//! - **By identifier**: `get_by_id`, `exists_by_id`, `delete_by_id`, `delete_by_ids`
//! - **By predicate**: `get_by`, `get_list_by`, `exists_by`, `count_by`
//! - **By specification**: `get_matching`, `get_list_matching`,
//!   `get_paged_list_matching`, `exists_matching`, `count_matching`
//! - **Projection**: `get_as`, `get_list_as`
//!
//! # Example
//!
//! ```rust,ignore
//! use repokit::prelude::*;
//!
//! let active = ExpressionSpecification::new(
//!     "active",
//!     Predicate::<User>::new("u", |u| u.member("active", |u| u.active).eq(true)),
//! );
//!
//! let user = users.get_by_id(user_id).await?;
//! let admins = users.count_matching(&active.and(is_admin)).await?;
//! users.delete_by_ids(stale_ids).await?;
//! ```

mod error;
pub mod facade;
pub mod facade_async;
mod traits;

pub use error::{StorageError, StorageErrorKind, StorageOperation};
pub use facade::RepositoryExt;
pub use facade_async::AsyncRepositoryExt;
pub use traits::{AsyncRepository, AsyncUnitOfWork, Projection, Repository, UnitOfWork};
