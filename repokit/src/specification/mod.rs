//! Reusable, composable query specifications
//!
//! A [`Specification`] wraps exactly one [`Predicate`]. Specifications are
//! combined with [`SpecificationExt::and`], [`or`](SpecificationExt::or),
//! [`and_not`](SpecificationExt::and_not), [`or_not`](SpecificationExt::or_not)
//! and [`not`](SpecificationExt::not); each combinator returns a new composite
//! that owns its operands.
//!
//! When a composite is turned into an expression, both operand bodies are
//! rewritten onto one fresh parameter before being joined, so the result is a
//! single closed lambda that evaluates (or translates) as a unit.
//!
//! # Example
//!
//! ```rust
//! use repokit::expression::Predicate;
//! use repokit::specification::{ExpressionSpecification, Specification, SpecificationExt};
//!
//! struct Order {
//!     total: u32,
//!     shipped: bool,
//! }
//!
//! let large = ExpressionSpecification::new(
//!     "large",
//!     Predicate::<Order>::new("o", |o| o.member("total", |o| o.total).gte(1000)),
//! );
//! let shipped = ExpressionSpecification::new(
//!     "shipped",
//!     Predicate::<Order>::new("o", |o| o.member("shipped", |o| o.shipped).eq(true)),
//! );
//!
//! let pending_large = large.and_not(shipped);
//! assert_eq!(pending_large.name(), "(large AND NOT shipped)");
//! assert!(pending_large.is_satisfied_by(&Order { total: 1500, shipped: false }).unwrap());
//! assert!(!pending_large.is_satisfied_by(&Order { total: 1500, shipped: true }).unwrap());
//! ```

mod composite;

use std::sync::Arc;

use crate::error::Result;
use crate::expression::Predicate;

pub use composite::{
    and, and_not, not, or, or_not, AndNotSpecification, AndSpecification, NotSpecification,
    OrNotSpecification, OrSpecification,
};

/// A named predicate over one entity type
pub trait Specification: Send + Sync {
    /// The entity type the predicate ranges over
    type Entity;

    /// The predicate, or `None` when this specification places no constraint
    ///
    /// Must be pure: repeated calls return equivalent predicates.
    fn as_expression(&self) -> Option<Predicate<Self::Entity>>;

    /// Name used in logs and composite names
    fn name(&self) -> String;

    /// Evaluate the predicate against `candidate`
    ///
    /// A specification without an expression is satisfied by every candidate.
    fn is_satisfied_by(&self, candidate: &Self::Entity) -> Result<bool> {
        match self.as_expression() {
            Some(predicate) => predicate.is_satisfied_by(candidate),
            None => Ok(true),
        }
    }
}

/// Combinators available on every [`Specification`]
pub trait SpecificationExt: Specification + Sized {
    /// Satisfied when both `self` and `other` are
    fn and<R>(self, other: R) -> AndSpecification<Self, R>
    where
        R: Specification<Entity = Self::Entity>,
    {
        AndSpecification::new(self, other)
    }

    /// Satisfied when either `self` or `other` is
    fn or<R>(self, other: R) -> OrSpecification<Self, R>
    where
        R: Specification<Entity = Self::Entity>,
    {
        OrSpecification::new(self, other)
    }

    /// Satisfied when `self` is and `other` is not
    fn and_not<R>(self, other: R) -> AndNotSpecification<Self, R>
    where
        R: Specification<Entity = Self::Entity>,
    {
        AndNotSpecification::new(self, other)
    }

    /// Satisfied when `self` is or `other` is not
    fn or_not<R>(self, other: R) -> OrNotSpecification<Self, R>
    where
        R: Specification<Entity = Self::Entity>,
    {
        OrNotSpecification::new(self, other)
    }

    /// Satisfied when `self` is not
    fn not(self) -> NotSpecification<Self> {
        NotSpecification::new(self)
    }

    /// Erase the concrete type
    fn boxed(self) -> BoxedSpecification<Self::Entity>
    where
        Self: 'static,
    {
        BoxedSpecification(Arc::new(self))
    }
}

impl<S: Specification> SpecificationExt for S {}

/// A leaf specification wrapping one predicate under a name
pub struct ExpressionSpecification<E> {
    name: String,
    predicate: Option<Predicate<E>>,
}

impl<E> ExpressionSpecification<E> {
    /// Wrap `predicate` under `name`
    pub fn new(name: impl Into<String>, predicate: Predicate<E>) -> Self {
        Self {
            name: name.into(),
            predicate: Some(predicate),
        }
    }

    /// A specification with no expression at all
    ///
    /// Composites containing it also have no expression.
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: None,
        }
    }
}

impl<E> Clone for ExpressionSpecification<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<E> std::fmt::Debug for ExpressionSpecification<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionSpecification")
            .field("name", &self.name)
            .field("predicate", &self.predicate)
            .finish()
    }
}

impl<E> Specification for ExpressionSpecification<E> {
    type Entity = E;

    fn as_expression(&self) -> Option<Predicate<E>> {
        self.predicate.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// A type-erased, cheaply cloneable specification
pub struct BoxedSpecification<E>(Arc<dyn Specification<Entity = E>>);

impl<E> Clone for BoxedSpecification<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Specification for BoxedSpecification<E> {
    type Entity = E;

    fn as_expression(&self) -> Option<Predicate<E>> {
        self.0.as_expression()
    }

    fn name(&self) -> String {
        self.0.name()
    }
}

impl<S: Specification + ?Sized> Specification for &S {
    type Entity = S::Entity;

    fn as_expression(&self) -> Option<Predicate<S::Entity>> {
        (**self).as_expression()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<S: Specification + ?Sized> Specification for Arc<S> {
    type Entity = S::Entity;

    fn as_expression(&self) -> Option<Predicate<S::Entity>> {
        (**self).as_expression()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}
