//! Identity predicates
//!
//! The key is captured as a constant, so matching is by value: two distinct
//! key instances that compare equal select the same entity.

use crate::entity::Entity;
use crate::expression::Predicate;

const ENTITY: &str = "entity";
const ID: &str = "id";

/// `entity => entity.id == key`
///
/// # Example
///
/// ```rust
/// use repokit::query::identity;
/// use repokit::Entity;
///
/// struct Note {
///     id: i64,
/// }
///
/// impl Entity for Note {
///     type Key = i64;
///
///     fn id(&self) -> &i64 {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: i64) {
///         self.id = id;
///     }
/// }
///
/// let predicate = identity::has_id::<Note>(2);
/// assert_eq!(predicate.to_string(), "entity => (entity.id == 2)");
/// assert!(predicate.is_satisfied_by(&Note { id: 2 }).unwrap());
/// ```
pub fn has_id<E: Entity>(key: E::Key) -> Predicate<E> {
    Predicate::new(ENTITY, |entity| {
        entity.member(ID, |e: &E| e.id().clone()).eq(key)
    })
}

/// `entity => entity.id in keys`
pub fn has_any_id<E, I>(keys: I) -> Predicate<E>
where
    E: Entity,
    I: IntoIterator<Item = E::Key>,
{
    Predicate::new(ENTITY, |entity| {
        entity.member(ID, |e: &E| e.id().clone()).is_in(keys)
    })
}
