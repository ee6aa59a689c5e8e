//! Single-parameter lambdas over an entity

use std::fmt;

use super::expr::{Expr, Param, Parameter};
use super::tree::ExpressionTree;
use super::value::Value;
use crate::error::{Error, Result};

/// An expression body bound to exactly one parameter
///
/// Lambdas are immutable: combining or rewriting always yields a new value.
pub struct Lambda<E> {
    parameter: Parameter,
    body: Expr<E>,
}

/// A lambda whose body evaluates to a boolean
pub type Predicate<E> = Lambda<E>;

/// A lambda whose body evaluates to a sort key
pub type KeySelector<E> = Lambda<E>;

impl<E> Lambda<E> {
    /// Build a lambda with a fresh parameter named `name`
    ///
    /// # Example
    ///
    /// ```rust
    /// use repokit::expression::Predicate;
    ///
    /// let short = Predicate::<String>::new("s", |s| s.member("len", |s| s.len()).lt(4));
    /// assert!(short.is_satisfied_by(&"abc".to_string()).unwrap());
    /// assert_eq!(short.to_string(), "s => (s.len < 4)");
    /// ```
    pub fn new<F>(name: &str, build: F) -> Self
    where
        F: FnOnce(&Param<E>) -> Expr<E>,
    {
        let param = Param::new(Parameter::fresh(name));
        let body = build(&param);
        Self {
            parameter: param.parameter().clone(),
            body,
        }
    }

    /// Assemble a lambda from an existing parameter and body
    ///
    /// No check is made that `body` only references `parameter`; see
    /// [`Lambda::is_closed`].
    pub fn from_parts(parameter: Parameter, body: Expr<E>) -> Self {
        Self { parameter, body }
    }

    /// A key selector reading a single member
    pub fn member<V, F>(name: &str, read: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&E) -> V + Send + Sync + 'static,
    {
        Self::new("x", |x| x.member(name, read))
    }

    /// A predicate that is constant for every candidate
    pub fn constant(value: bool) -> Self {
        Self::new("x", |_| Expr::constant(value))
    }

    /// The bound parameter
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The body
    pub fn body(&self) -> &Expr<E> {
        &self.body
    }

    /// Split into parameter and body
    pub fn into_parts(self) -> (Parameter, Expr<E>) {
        (self.parameter, self.body)
    }

    /// Body rewritten so that it reads its candidate from `parameter`
    pub fn body_for(&self, parameter: &Parameter) -> Expr<E> {
        self.body.rebind(&self.parameter, parameter)
    }

    /// Whether the body references no parameter other than this lambda's own
    pub fn is_closed(&self) -> bool {
        self.body
            .parameters()
            .iter()
            .all(|parameter| *parameter == self.parameter)
    }

    /// Evaluate the body against `candidate`
    ///
    /// # Errors
    ///
    /// [`Error::UnboundParameter`] if the body reads from a parameter other
    /// than this lambda's own.
    pub fn evaluate(&self, candidate: &E) -> Result<Value> {
        self.ensure_closed()?;
        self.body.evaluate(&self.parameter, candidate)
    }

    fn ensure_closed(&self) -> Result<()> {
        match self
            .body
            .parameters()
            .into_iter()
            .find(|parameter| *parameter != self.parameter)
        {
            Some(foreign) => Err(Error::UnboundParameter {
                name: foreign.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Evaluate as a predicate
    ///
    /// # Errors
    ///
    /// As [`Lambda::evaluate`], plus [`Error::TypeMismatch`] when the body does
    /// not produce a boolean.
    pub fn is_satisfied_by(&self, candidate: &E) -> Result<bool> {
        let value = self.evaluate(candidate)?;
        value.as_bool().ok_or(Error::TypeMismatch {
            expected: "bool",
            found: value.kind(),
        })
    }

    /// Structural equality up to the choice of parameter symbol
    ///
    /// # Example
    ///
    /// ```rust
    /// use repokit::expression::Predicate;
    ///
    /// let a = Predicate::<u32>::new("a", |a| a.member("value", |v| *v).eq(1));
    /// let b = Predicate::<u32>::new("b", |b| b.member("value", |v| *v).eq(1));
    /// assert!(a.equivalent(&b));
    /// ```
    pub fn equivalent(&self, other: &Lambda<E>) -> bool {
        self.body
            .equivalent(&other.body, &self.parameter, &other.parameter)
    }

    /// Closure-free, serializable view of this lambda
    ///
    /// The tree names parameters by display name only, so a lambda that is
    /// not closed is refused rather than exported ambiguously.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundParameter`] if the body reads from a parameter other
    /// than this lambda's own.
    pub fn to_tree(&self) -> Result<ExpressionTree> {
        self.ensure_closed()?;
        Ok(ExpressionTree::from_lambda(self))
    }
}

impl<E> Clone for Lambda<E> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            body: self.body.clone(),
        }
    }
}

impl<E> fmt::Display for Lambda<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.parameter, self.body)
    }
}

impl<E> fmt::Debug for Lambda<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Reading {
        sensor: String,
        celsius: f64,
    }

    fn reading(sensor: &str, celsius: f64) -> Reading {
        Reading {
            sensor: sensor.to_string(),
            celsius,
        }
    }

    #[test]
    fn test_predicate_evaluation() {
        let hot = Predicate::<Reading>::new("r", |r| r.member("celsius", |r| r.celsius).gt(30.0));
        assert!(hot.is_satisfied_by(&reading("a", 31.5)).unwrap());
        assert!(!hot.is_satisfied_by(&reading("a", 12.0)).unwrap());
    }

    #[test]
    fn test_key_selector_evaluates_to_value() {
        let by_sensor = KeySelector::<Reading>::member("sensor", |r| r.sensor.clone());
        let key = by_sensor.evaluate(&reading("north", 0.0)).unwrap();
        assert_eq!(key, Value::from("north"));
    }

    #[test]
    fn test_key_selector_is_not_a_predicate() {
        let by_sensor = KeySelector::<Reading>::member("sensor", |r| r.sensor.clone());
        let error = by_sensor.is_satisfied_by(&reading("north", 0.0)).unwrap_err();
        assert!(matches!(error, Error::TypeMismatch { found: "string", .. }));
    }

    #[test]
    fn test_constant_predicate() {
        assert!(Predicate::<Reading>::constant(true)
            .is_satisfied_by(&reading("a", 0.0))
            .unwrap());
        assert!(!Predicate::<Reading>::constant(false)
            .is_satisfied_by(&reading("a", 0.0))
            .unwrap());
    }

    #[test]
    fn test_foreign_body_is_rejected_even_behind_short_circuit() {
        let left = Predicate::<Reading>::constant(false);
        let right = Predicate::<Reading>::new("r", |r| r.member("celsius", |r| r.celsius).gt(0.0));

        // Combine bodies without rewriting `right` onto `left`'s parameter.
        let (parameter, body) = left.into_parts();
        let naive = Lambda::from_parts(parameter, body.and(right.body().clone()));

        assert!(!naive.is_closed());
        let error = naive.is_satisfied_by(&reading("a", 1.0)).unwrap_err();
        assert!(matches!(error, Error::UnboundParameter { ref name } if name == "r"));
    }

    #[test]
    fn test_body_for_rebinds_onto_new_parameter() {
        let warm = Predicate::<Reading>::new("r", |r| r.member("celsius", |r| r.celsius).gte(20.0));
        let shared = Parameter::fresh("c");
        let rebound = Lambda::from_parts(shared.clone(), warm.body_for(&shared));

        assert!(rebound.is_closed());
        assert!(rebound.is_satisfied_by(&reading("a", 25.0)).unwrap());
        assert!(rebound.equivalent(&warm));
    }

    #[test]
    fn test_equivalence_distinguishes_structure() {
        let a = Predicate::<Reading>::new("r", |r| r.member("celsius", |r| r.celsius).gt(1.0));
        let b = Predicate::<Reading>::new("r", |r| r.member("celsius", |r| r.celsius).gte(1.0));
        let c = Predicate::<Reading>::new("r", |r| {
            r.member("sensor", |r| r.sensor.clone()).gt(1.0)
        });
        assert!(!a.equivalent(&b));
        assert!(!a.equivalent(&c));
        assert!(a.equivalent(&a.clone()));
    }

    #[test]
    fn test_display() {
        let p = Predicate::<Reading>::new("r", |r| {
            r.member("sensor", |r| r.sensor.clone()).is_in(["a", "b"])
        });
        assert_eq!(p.to_string(), "r => (r.sensor in [\"a\", \"b\"])");
    }
}
