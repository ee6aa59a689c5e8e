//! Entity identity abstraction
//!
//! Every type stored behind a repository exposes an identifier of a
//! caller-chosen key type. Identifier equality is what "by id" operations
//! filter on, so the key must be comparable by value and convertible into a
//! [`Value`] constant that an expression can capture.

use std::fmt::Debug;

use crate::expression::Value;

/// Identifier type usable as an entity key
///
/// Blanket-implemented for every cloneable, comparable type that converts into
/// a [`Value`]: integers, strings, [`uuid::Uuid`], and any caller type that
/// provides `From<Key> for Value`.
pub trait EntityKey: Clone + PartialEq + Debug + Send + Sync + Into<Value> + 'static {}

impl<K> EntityKey for K where K: Clone + PartialEq + Debug + Send + Sync + Into<Value> + 'static {}

/// A record with a unique identifier
///
/// # Example
///
/// ```rust
/// use repokit::Entity;
///
/// #[derive(Debug, Clone)]
/// struct Customer {
///     id: u64,
///     name: String,
/// }
///
/// impl Entity for Customer {
///     type Key = u64;
///
///     fn id(&self) -> &u64 {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: u64) {
///         self.id = id;
///     }
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    /// The identifier type
    type Key: EntityKey;

    /// The entity's identifier
    fn id(&self) -> &Self::Key;

    /// Replace the identifier
    ///
    /// By convention only called before the entity is first persisted.
    fn set_id(&mut self, id: Self::Key);
}
