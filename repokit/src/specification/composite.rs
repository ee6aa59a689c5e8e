//! Composite specifications
//!
//! Every composite turns its operands into one closed predicate the same way:
//! a fresh candidate parameter is created, each operand body is rewritten to
//! read from it, and the rewritten bodies are joined under the connective.

use super::Specification;
use crate::error::{require, Result};
use crate::expression::{Expr, Lambda, Parameter, Predicate};

const CANDIDATE: &str = "candidate";

/// Join two operand predicates under `connective` over a shared fresh parameter
///
/// `None` when either operand has no expression.
fn compose<L, R>(
    left: &L,
    right: &R,
    connective: fn(Expr<L::Entity>, Expr<L::Entity>) -> Expr<L::Entity>,
) -> Option<Predicate<L::Entity>>
where
    L: Specification,
    R: Specification<Entity = L::Entity>,
{
    let Some(left_predicate) = left.as_expression() else {
        tracing::trace!(operand = %left.name(), "left operand has no expression");
        return None;
    };
    let Some(right_predicate) = right.as_expression() else {
        tracing::trace!(operand = %right.name(), "right operand has no expression");
        return None;
    };

    let candidate = Parameter::fresh(CANDIDATE);
    let body = connective(
        left_predicate.body_for(&candidate),
        right_predicate.body_for(&candidate),
    );
    Some(Lambda::from_parts(candidate, body))
}

macro_rules! binary_specification {
    (
        $(#[$meta:meta])*
        $name:ident, $keyword:literal, |$l:ident, $r:ident| $connective:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<L, R> {
            left: L,
            right: R,
        }

        impl<L, R> $name<L, R> {
            /// Compose `left` and `right`
            pub fn new(left: L, right: R) -> Self {
                Self { left, right }
            }

            /// Compose possibly-absent operands
            ///
            /// # Errors
            ///
            /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) naming
            /// `left` or `right` when that operand is `None`.
            pub fn try_new(left: Option<L>, right: Option<R>) -> Result<Self> {
                let left = require(left, "left")?;
                let right = require(right, "right")?;
                Ok(Self { left, right })
            }

            /// The left operand
            pub fn left(&self) -> &L {
                &self.left
            }

            /// The right operand
            pub fn right(&self) -> &R {
                &self.right
            }
        }

        impl<L, R> Specification for $name<L, R>
        where
            L: Specification,
            R: Specification<Entity = L::Entity>,
        {
            type Entity = L::Entity;

            fn as_expression(&self) -> Option<Predicate<L::Entity>> {
                compose(&self.left, &self.right, |$l, $r| $connective)
            }

            fn name(&self) -> String {
                format!(concat!("({} ", $keyword, " {})"), self.left.name(), self.right.name())
            }
        }
    };
}

binary_specification!(
    /// Satisfied when both operands are
    AndSpecification, "AND", |l, r| l.and(r)
);

binary_specification!(
    /// Satisfied when at least one operand is
    OrSpecification, "OR", |l, r| l.or(r)
);

binary_specification!(
    /// Satisfied when the left operand is and the right one is not
    AndNotSpecification, "AND NOT", |l, r| l.and(!r)
);

binary_specification!(
    /// Satisfied when the left operand is or the right one is not
    OrNotSpecification, "OR NOT", |l, r| l.or(!r)
);

/// Satisfied when the operand is not
#[derive(Debug, Clone)]
pub struct NotSpecification<S> {
    operand: S,
}

impl<S> NotSpecification<S> {
    /// Negate `operand`
    pub fn new(operand: S) -> Self {
        Self { operand }
    }

    /// Negate a possibly-absent operand
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) naming
    /// `specification` when the operand is `None`.
    pub fn try_new(operand: Option<S>) -> Result<Self> {
        Ok(Self {
            operand: require(operand, "specification")?,
        })
    }

    /// The negated operand
    pub fn operand(&self) -> &S {
        &self.operand
    }
}

impl<S: Specification> Specification for NotSpecification<S> {
    type Entity = S::Entity;

    fn as_expression(&self) -> Option<Predicate<S::Entity>> {
        let predicate = self.operand.as_expression()?;
        let candidate = Parameter::fresh(CANDIDATE);
        let body = !predicate.body_for(&candidate);
        Some(Lambda::from_parts(candidate, body))
    }

    fn name(&self) -> String {
        format!("NOT {}", self.operand.name())
    }
}

/// `left AND right`
pub fn and<L, R>(left: L, right: R) -> AndSpecification<L, R> {
    AndSpecification::new(left, right)
}

/// `left OR right`
pub fn or<L, R>(left: L, right: R) -> OrSpecification<L, R> {
    OrSpecification::new(left, right)
}

/// `left AND NOT right`
pub fn and_not<L, R>(left: L, right: R) -> AndNotSpecification<L, R> {
    AndNotSpecification::new(left, right)
}

/// `left OR NOT right`
pub fn or_not<L, R>(left: L, right: R) -> OrNotSpecification<L, R> {
    OrNotSpecification::new(left, right)
}

/// `NOT operand`
pub fn not<S>(operand: S) -> NotSpecification<S> {
    NotSpecification::new(operand)
}
