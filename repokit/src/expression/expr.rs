//! Expression tree nodes
//!
//! An [`Expr`] is the body of a lambda: a tree of constants, member accesses on
//! a [`Parameter`], opaque boolean tests, comparisons and logical connectives.
//! Leaves that read the candidate name the parameter they read from, which is
//! what makes parameter rewriting ([`Expr::rebind`]) possible.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Not;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::error::{Error, Result};

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(1);

/// A lambda parameter symbol
///
/// Identity is the process-unique id assigned at creation. Two parameters
/// sharing a display name are still distinct symbols.
#[derive(Debug, Clone)]
pub struct Parameter {
    id: u64,
    name: Arc<str>,
}

impl Parameter {
    /// Create a parameter with a fresh identity
    pub fn fresh(name: &str) -> Self {
        Self {
            id: NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    /// Unique identity of this symbol
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named, shareable function of the candidate entity
pub struct Accessor<E, T> {
    name: Arc<str>,
    read: Arc<dyn Fn(&E) -> T + Send + Sync>,
}

impl<E, T> Accessor<E, T> {
    /// Wrap `read` under `name`
    pub fn new<F>(name: &str, read: F) -> Self
    where
        F: Fn(&E) -> T + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            read: Arc::new(read),
        }
    }

    /// Name used for display and structural comparison
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the accessor to a candidate
    pub fn read(&self, candidate: &E) -> T {
        (self.read)(candidate)
    }
}

impl<E, T> Clone for Accessor<E, T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            read: Arc::clone(&self.read),
        }
    }
}

impl<E, T> fmt::Debug for Accessor<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").field("name", &self.name).finish()
    }
}

/// Typed handle to a lambda's parameter, used while building its body
///
/// # Example
///
/// ```rust
/// use repokit::expression::Predicate;
///
/// struct Account {
///     balance: i64,
///     frozen: bool,
/// }
///
/// let solvent = Predicate::<Account>::new("a", |a| {
///     a.member("balance", |acc| acc.balance).gte(0) & !a.test("frozen", |acc| acc.frozen)
/// });
/// assert!(solvent.is_satisfied_by(&Account { balance: 10, frozen: false }).unwrap());
/// ```
pub struct Param<E> {
    parameter: Parameter,
    _entity: PhantomData<fn(&E)>,
}

impl<E> Param<E> {
    pub(crate) fn new(parameter: Parameter) -> Self {
        Self {
            parameter,
            _entity: PhantomData,
        }
    }

    /// The untyped parameter symbol
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Read a field of the candidate
    pub fn member<V, F>(&self, name: &str, read: F) -> Expr<E>
    where
        V: Into<Value>,
        F: Fn(&E) -> V + Send + Sync + 'static,
    {
        Expr::Member {
            parameter: self.parameter.clone(),
            accessor: Accessor::new(name, move |candidate: &E| read(candidate).into()),
        }
    }

    /// Evaluate an opaque boolean test against the candidate
    ///
    /// Tests evaluate fine but cannot be translated by a store that only
    /// understands the structural nodes.
    pub fn test<F>(&self, name: &str, test: F) -> Expr<E>
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Expr::Test {
            parameter: self.parameter.clone(),
            accessor: Accessor::new(name, test),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equal to (==)
    Eq,
    /// Not equal to (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal to (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal to (<=)
    Lte,
    /// Left value is an element of the right list (IN)
    In,
}

impl CompareOp {
    /// Apply the operator to two evaluated operands
    ///
    /// Ordering operators are `false` for operands without an ordering.
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Gt => left.compare(right) == Some(Greater),
            Self::Gte => matches!(left.compare(right), Some(Greater | Equal)),
            Self::Lt => left.compare(right) == Some(Less),
            Self::Lte => matches!(left.compare(right), Some(Less | Equal)),
            Self::In => right.contains(left),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "=="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::In => write!(f, "in"),
        }
    }
}

/// Expression body over a candidate of type `E`
pub enum Expr<E> {
    /// A captured constant
    Constant(Value),
    /// A field read from the candidate bound to `parameter`
    Member {
        parameter: Parameter,
        accessor: Accessor<E, Value>,
    },
    /// An opaque boolean test of the candidate bound to `parameter`
    Test {
        parameter: Parameter,
        accessor: Accessor<E, bool>,
    },
    /// Binary comparison
    Compare {
        op: CompareOp,
        left: Box<Expr<E>>,
        right: Box<Expr<E>>,
    },
    /// Short-circuiting conjunction
    And(Box<Expr<E>>, Box<Expr<E>>),
    /// Short-circuiting disjunction
    Or(Box<Expr<E>>, Box<Expr<E>>),
    /// Negation
    Not(Box<Expr<E>>),
}

impl<E> Expr<E> {
    /// A constant node
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(Self::Constant(value.into())),
        }
    }

    /// `self == value`
    pub fn eq(self, value: impl Into<Value>) -> Self {
        self.compare(CompareOp::Eq, value)
    }

    /// `self != value`
    pub fn ne(self, value: impl Into<Value>) -> Self {
        self.compare(CompareOp::Ne, value)
    }

    /// `self > value`
    pub fn gt(self, value: impl Into<Value>) -> Self {
        self.compare(CompareOp::Gt, value)
    }

    /// `self >= value`
    pub fn gte(self, value: impl Into<Value>) -> Self {
        self.compare(CompareOp::Gte, value)
    }

    /// `self < value`
    pub fn lt(self, value: impl Into<Value>) -> Self {
        self.compare(CompareOp::Lt, value)
    }

    /// `self <= value`
    pub fn lte(self, value: impl Into<Value>) -> Self {
        self.compare(CompareOp::Lte, value)
    }

    /// `self in values`
    pub fn is_in<V, I>(self, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let list = Value::List(values.into_iter().map(Into::into).collect());
        self.compare(CompareOp::In, list)
    }

    /// Compare against another expression instead of a constant
    pub fn compare_with(self, op: CompareOp, other: Expr<E>) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// `self && other`
    pub fn and(self, other: Expr<E>) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// `self || other`
    pub fn or(self, other: Expr<E>) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Copy of this tree with every reference to `from` replaced by `to`
    ///
    /// References to any other parameter are left untouched.
    pub fn rebind(&self, from: &Parameter, to: &Parameter) -> Self {
        let swap = |parameter: &Parameter| {
            if parameter == from {
                to.clone()
            } else {
                parameter.clone()
            }
        };

        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Member {
                parameter,
                accessor,
            } => Self::Member {
                parameter: swap(parameter),
                accessor: accessor.clone(),
            },
            Self::Test {
                parameter,
                accessor,
            } => Self::Test {
                parameter: swap(parameter),
                accessor: accessor.clone(),
            },
            Self::Compare { op, left, right } => Self::Compare {
                op: *op,
                left: Box::new(left.rebind(from, to)),
                right: Box::new(right.rebind(from, to)),
            },
            Self::And(left, right) => {
                Self::And(Box::new(left.rebind(from, to)), Box::new(right.rebind(from, to)))
            }
            Self::Or(left, right) => {
                Self::Or(Box::new(left.rebind(from, to)), Box::new(right.rebind(from, to)))
            }
            Self::Not(operand) => Self::Not(Box::new(operand.rebind(from, to))),
        }
    }

    /// Distinct parameters referenced anywhere in this tree, in first-seen order
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut found = Vec::new();
        self.collect_parameters(&mut found);
        found
    }

    fn collect_parameters(&self, found: &mut Vec<Parameter>) {
        match self {
            Self::Constant(_) => {}
            Self::Member { parameter, .. } | Self::Test { parameter, .. } => {
                if !found.contains(parameter) {
                    found.push(parameter.clone());
                }
            }
            Self::Compare { left, right, .. } | Self::And(left, right) | Self::Or(left, right) => {
                left.collect_parameters(found);
                right.collect_parameters(found);
            }
            Self::Not(operand) => operand.collect_parameters(found),
        }
    }

    /// Whether any leaf is an opaque [`Expr::Test`]
    pub fn has_opaque_tests(&self) -> bool {
        match self {
            Self::Test { .. } => true,
            Self::Constant(_) | Self::Member { .. } => false,
            Self::Compare { left, right, .. } | Self::And(left, right) | Self::Or(left, right) => {
                left.has_opaque_tests() || right.has_opaque_tests()
            }
            Self::Not(operand) => operand.has_opaque_tests(),
        }
    }

    /// Evaluate with `parameter` bound to `candidate`
    pub(crate) fn evaluate(&self, parameter: &Parameter, candidate: &E) -> Result<Value> {
        let bound = |p: &Parameter| {
            if p == parameter {
                Ok(())
            } else {
                Err(Error::UnboundParameter {
                    name: p.name().to_string(),
                })
            }
        };

        match self {
            Self::Constant(value) => Ok(value.clone()),
            Self::Member {
                parameter: p,
                accessor,
            } => {
                bound(p)?;
                Ok(accessor.read(candidate))
            }
            Self::Test {
                parameter: p,
                accessor,
            } => {
                bound(p)?;
                Ok(Value::Bool(accessor.read(candidate)))
            }
            Self::Compare { op, left, right } => {
                let left = left.evaluate(parameter, candidate)?;
                let right = right.evaluate(parameter, candidate)?;
                Ok(Value::Bool(op.apply(&left, &right)))
            }
            Self::And(left, right) => {
                if !left.evaluate_bool(parameter, candidate)? {
                    return Ok(Value::Bool(false));
                }
                right.evaluate(parameter, candidate).and_then(expect_bool).map(Value::Bool)
            }
            Self::Or(left, right) => {
                if left.evaluate_bool(parameter, candidate)? {
                    return Ok(Value::Bool(true));
                }
                right.evaluate(parameter, candidate).and_then(expect_bool).map(Value::Bool)
            }
            Self::Not(operand) => Ok(Value::Bool(!operand.evaluate_bool(parameter, candidate)?)),
        }
    }

    pub(crate) fn evaluate_bool(&self, parameter: &Parameter, candidate: &E) -> Result<bool> {
        self.evaluate(parameter, candidate).and_then(expect_bool)
    }

    /// Structural equality modulo the renaming `mine -> theirs`
    ///
    /// Accessors compare by name; closures are never called.
    pub(crate) fn equivalent(
        &self,
        other: &Expr<E>,
        mine: &Parameter,
        theirs: &Parameter,
    ) -> bool {
        let same_parameter = |a: &Parameter, b: &Parameter| {
            if a == mine || b == theirs {
                a == mine && b == theirs
            } else {
                a == b
            }
        };

        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (
                Self::Member {
                    parameter: pa,
                    accessor: aa,
                },
                Self::Member {
                    parameter: pb,
                    accessor: ab,
                },
            ) => same_parameter(pa, pb) && aa.name() == ab.name(),
            (
                Self::Test {
                    parameter: pa,
                    accessor: aa,
                },
                Self::Test {
                    parameter: pb,
                    accessor: ab,
                },
            ) => same_parameter(pa, pb) && aa.name() == ab.name(),
            (
                Self::Compare {
                    op: oa,
                    left: la,
                    right: ra,
                },
                Self::Compare {
                    op: ob,
                    left: lb,
                    right: rb,
                },
            ) => oa == ob && la.equivalent(lb, mine, theirs) && ra.equivalent(rb, mine, theirs),
            (Self::And(la, ra), Self::And(lb, rb)) | (Self::Or(la, ra), Self::Or(lb, rb)) => {
                la.equivalent(lb, mine, theirs) && ra.equivalent(rb, mine, theirs)
            }
            (Self::Not(a), Self::Not(b)) => a.equivalent(b, mine, theirs),
            _ => false,
        }
    }
}

fn expect_bool(value: Value) -> Result<bool> {
    value.as_bool().ok_or(Error::TypeMismatch {
        expected: "bool",
        found: value.kind(),
    })
}

impl<E> Clone for Expr<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Member {
                parameter,
                accessor,
            } => Self::Member {
                parameter: parameter.clone(),
                accessor: accessor.clone(),
            },
            Self::Test {
                parameter,
                accessor,
            } => Self::Test {
                parameter: parameter.clone(),
                accessor: accessor.clone(),
            },
            Self::Compare { op, left, right } => Self::Compare {
                op: *op,
                left: left.clone(),
                right: right.clone(),
            },
            Self::And(left, right) => Self::And(left.clone(), right.clone()),
            Self::Or(left, right) => Self::Or(left.clone(), right.clone()),
            Self::Not(operand) => Self::Not(operand.clone()),
        }
    }
}

impl<E> Not for Expr<E> {
    type Output = Expr<E>;

    fn not(self) -> Self::Output {
        Expr::Not(Box::new(self))
    }
}

impl<E> std::ops::BitAnd for Expr<E> {
    type Output = Expr<E>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<E> std::ops::BitOr for Expr<E> {
    type Output = Expr<E>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<E> fmt::Display for Expr<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{value}"),
            Self::Member {
                parameter,
                accessor,
            } => write!(f, "{}.{}", parameter, accessor.name()),
            Self::Test {
                parameter,
                accessor,
            } => write!(f, "{}({})", accessor.name(), parameter),
            Self::Compare { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::And(left, right) => write!(f, "({left} && {right})"),
            Self::Or(left, right) => write!(f, "({left} || {right})"),
            Self::Not(operand) => write!(f, "!{operand}"),
        }
    }
}

impl<E> fmt::Debug for Expr<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}
