//! Repository capability traits
//!
//! These are the capabilities the façade consumes; storage backends implement
//! them. Queries arrive as [`QueryParameters`] and an implementation decides
//! whether to translate the filter (via [`Lambda::to_tree`]) or evaluate it in
//! memory (via [`QueryParameters::apply`]).
//!
//! The async traits use RPITIT (Return Position Impl Trait In Traits),
//! available since Rust 1.75, so implementations can write plain `async fn`.
//!
//! # Overview
//!
//! - [`Repository`] / [`AsyncRepository`]: query and mutate one entity type
//! - [`UnitOfWork`] / [`AsyncUnitOfWork`]: commit or roll back pending changes
//! - [`Projection`]: reshape fetched entities into another model
//!
//! [`Lambda::to_tree`]: crate::expression::Lambda::to_tree

use std::future::Future;

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::Result;
use crate::query::{PagedResult, QueryParameters};

/// Blocking repository for one entity type
///
/// Every query method takes an optional descriptor; `None` means "all
/// entities, unsorted, unpaged". Mutations take `&self` so that one
/// repository can be shared; implementations use interior mutability.
pub trait Repository<E: Entity>: Send + Sync {
    /// First entity matching `query`, or `None`
    fn get(&self, query: Option<&QueryParameters<E>>) -> Result<Option<E>>;

    /// Every entity matching `query`, in the order the sort rule gives
    fn get_list(&self, query: Option<&QueryParameters<E>>) -> Result<Vec<E>>;

    /// One page of the entities matching `query`
    fn get_paged_list(&self, query: Option<&QueryParameters<E>>) -> Result<PagedResult<E>>;

    /// Whether any entity matches `query`
    fn exists(&self, query: Option<&QueryParameters<E>>) -> Result<bool>;

    /// Number of entities matching `query`
    fn count(&self, query: Option<&QueryParameters<E>>) -> Result<u64>;

    /// Store a new entity, returning it as stored
    fn insert(&self, entity: E) -> Result<E>;

    /// Store several new entities
    fn insert_many(&self, entities: Vec<E>) -> Result<Vec<E>>;

    /// Replace a stored entity, returning it as stored
    fn update(&self, entity: E) -> Result<E>;

    /// Replace several stored entities
    fn update_many(&self, entities: Vec<E>) -> Result<Vec<E>>;

    /// Remove a stored entity
    fn delete(&self, entity: E) -> Result<()>;

    /// Remove several stored entities
    fn delete_many(&self, entities: Vec<E>) -> Result<()>;
}

/// Non-blocking repository for one entity type
///
/// Same contract as [`Repository`]. The returned futures are `Send` so that
/// callers can drive them from a multi-threaded runtime; dropping a future
/// cancels the operation.
///
/// # Example
///
/// ```rust,ignore
/// impl AsyncRepository<Order> for OrderStore {
///     async fn get(&self, query: Option<&QueryParameters<Order>>) -> Result<Option<Order>> {
///         let tree = query.and_then(|q| q.predicate()).map(|p| p.to_tree()).transpose()?;
///         self.client.find_one(tree).await.map_err(into_storage_error)
///     }
///     // ... other methods
/// }
/// ```
pub trait AsyncRepository<E: Entity>: Send + Sync {
    /// First entity matching `query`, or `None`
    fn get(
        &self,
        query: Option<&QueryParameters<E>>,
    ) -> impl Future<Output = Result<Option<E>>> + Send;

    /// Every entity matching `query`
    fn get_list(
        &self,
        query: Option<&QueryParameters<E>>,
    ) -> impl Future<Output = Result<Vec<E>>> + Send;

    /// One page of the entities matching `query`
    fn get_paged_list(
        &self,
        query: Option<&QueryParameters<E>>,
    ) -> impl Future<Output = Result<PagedResult<E>>> + Send;

    /// Whether any entity matches `query`
    fn exists(&self, query: Option<&QueryParameters<E>>)
        -> impl Future<Output = Result<bool>> + Send;

    /// Number of entities matching `query`
    fn count(&self, query: Option<&QueryParameters<E>>) -> impl Future<Output = Result<u64>> + Send;

    /// Store a new entity
    fn insert(&self, entity: E) -> impl Future<Output = Result<E>> + Send;

    /// Store several new entities
    fn insert_many(&self, entities: Vec<E>) -> impl Future<Output = Result<Vec<E>>> + Send;

    /// Replace a stored entity
    fn update(&self, entity: E) -> impl Future<Output = Result<E>> + Send;

    /// Replace several stored entities
    fn update_many(&self, entities: Vec<E>) -> impl Future<Output = Result<Vec<E>>> + Send;

    /// Remove a stored entity
    fn delete(&self, entity: E) -> impl Future<Output = Result<()>> + Send;

    /// Remove several stored entities
    fn delete_many(&self, entities: Vec<E>) -> impl Future<Output = Result<()>> + Send;
}

/// A batch of pending changes
///
/// Implementations that hold a connection or transaction release it in
/// `Drop`; dropping an uncommitted unit of work discards its changes.
pub trait UnitOfWork: Send {
    /// Persist pending changes, returning how many records were affected
    fn commit(&mut self) -> Result<u64>;

    /// Discard pending changes
    fn rollback(&mut self) -> Result<()>;
}

/// Non-blocking [`UnitOfWork`]
///
/// Object safe, so a `Box<dyn AsyncUnitOfWork>` can be handed around.
#[async_trait]
pub trait AsyncUnitOfWork: Send {
    /// Persist pending changes, returning how many records were affected
    async fn commit(&mut self) -> Result<u64>;

    /// Discard pending changes
    async fn rollback(&mut self) -> Result<()>;
}

/// Maps fetched entities into another model
///
/// Any `Fn(E) -> M` closure is a projection.
///
/// ```rust
/// use repokit::repository::Projection;
///
/// let lengths = |s: String| s.len();
/// assert_eq!(lengths.project(vec!["ab".to_string(), "c".to_string()]), vec![2, 1]);
/// ```
pub trait Projection<E, M>: Send + Sync {
    /// Map every entity, preserving order
    fn project(&self, entities: Vec<E>) -> Vec<M>;
}

impl<E, M, F> Projection<E, M> for F
where
    F: Fn(E) -> M + Send + Sync,
{
    fn project(&self, entities: Vec<E>) -> Vec<M> {
        entities.into_iter().map(self).collect()
    }
}
