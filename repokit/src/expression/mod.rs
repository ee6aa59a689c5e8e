//! Inspectable predicates over entities
//!
//! Predicates are expression trees rather than plain closures so that they can
//! be combined structurally, compared in tests, and translated by a store into
//! its own query language.
//!
//! - [`Value`]: dynamic scalar produced by constants and member reads
//! - [`Expr`]: expression body (constants, members, tests, comparisons, logic)
//! - [`Lambda`] / [`Predicate`] / [`KeySelector`]: a body bound to one [`Parameter`]
//! - [`ExpressionTree`]: closure-free serializable view
//!
//! # Example
//!
//! ```rust
//! use repokit::expression::Predicate;
//!
//! struct User {
//!     age: u32,
//!     country: String,
//! }
//!
//! let eligible = Predicate::<User>::new("u", |u| {
//!     u.member("age", |u| u.age).gte(18)
//!         & u.member("country", |u| u.country.clone()).is_in(["NZ", "AU"])
//! });
//!
//! let user = User { age: 30, country: "NZ".to_string() };
//! assert!(eligible.is_satisfied_by(&user).unwrap());
//! ```

mod expr;
mod lambda;
mod tree;
mod value;

pub use expr::{Accessor, CompareOp, Expr, Param, Parameter};
pub use lambda::{KeySelector, Lambda, Predicate};
pub use tree::{ExpressionTree, TreeNode};
pub use value::Value;
