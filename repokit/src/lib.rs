//! # repokit
//!
//! Generic repository contract with composable query specifications.
//!
//! Callers describe *which* entities they want as inspectable predicates,
//! combine them into reusable specifications, and hand the resulting query
//! descriptor to whatever storage backend implements the repository traits.
//!
//! ## Features
//!
//! - **Predicates**: expression trees that evaluate in memory and export as a
//!   serializable tree for translation into a store's query language
//! - **Specifications**: `and`, `or`, `and_not`, `or_not`, `not` composition
//!   with parameter unification
//! - **Query descriptors**: filter, sort and page rules plus paged results
//! - **Façade**: by-id, by-predicate and by-specification operations over
//!   sync and async repositories
//! - **Configuration**: figment-based layering of defaults, TOML and environment
//!
//! ## Example
//!
//! ```rust
//! use repokit::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! struct Book {
//!     id: u32,
//!     pages: u32,
//!     in_print: bool,
//! }
//!
//! impl Entity for Book {
//!     type Key = u32;
//!
//!     fn id(&self) -> &u32 {
//!         &self.id
//!     }
//!
//!     fn set_id(&mut self, id: u32) {
//!         self.id = id;
//!     }
//! }
//!
//! let long = ExpressionSpecification::new(
//!     "long",
//!     Predicate::<Book>::new("b", |b| b.member("pages", |b| b.pages).gt(500)),
//! );
//! let in_print = ExpressionSpecification::new(
//!     "in print",
//!     Predicate::<Book>::new("b", |b| b.member("in_print", |b| b.in_print).eq(true)),
//! );
//!
//! let query = QueryParameters::from_specification(Some(&long.and(in_print))).unwrap();
//! let shelf = vec![
//!     Book { id: 1, pages: 900, in_print: true },
//!     Book { id: 2, pages: 900, in_print: false },
//!     Book { id: 3, pages: 120, in_print: true },
//! ];
//! let (hits, total) = query.apply(shelf).unwrap();
//! assert_eq!(total, 1);
//! assert_eq!(hits[0].id, 1);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod expression;
pub mod observability;
pub mod query;
pub mod repository;
pub mod specification;

pub use entity::{Entity, EntityKey};
pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, LoggingConfig, QueryDefaults};
    pub use crate::entity::{Entity, EntityKey};
    pub use crate::error::{Error, Result};
    pub use crate::expression::{Expr, KeySelector, Lambda, Predicate, Value};
    pub use crate::observability::init_tracing;
    pub use crate::query::{
        identity, FilterRule, PageRule, PagedResult, QueryParameters, SortDirection, SortRule,
    };
    pub use crate::repository::{
        AsyncRepository, AsyncRepositoryExt, AsyncUnitOfWork, Projection, Repository,
        RepositoryExt, StorageError, StorageErrorKind, StorageOperation, UnitOfWork,
    };
    pub use crate::specification::{
        BoxedSpecification, ExpressionSpecification, Specification, SpecificationExt,
    };

    // Re-export async-trait for unit-of-work implementations
    pub use async_trait::async_trait;

    // Re-export tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};
}
