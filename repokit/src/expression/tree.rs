//! Serializable view of an expression
//!
//! [`ExpressionTree`] drops the accessor closures and keeps only names,
//! operators and constants, so a store can translate a filter into its own
//! query language or ship it over the wire.
//!
//! # Example
//!
//! ```rust
//! use repokit::expression::{Predicate, TreeNode};
//!
//! let adult = Predicate::<u8>::new("p", |p| p.member("age", |age| *age).gte(18));
//! let tree = adult.to_tree().unwrap();
//! assert_eq!(tree.parameter, "p");
//! assert!(matches!(tree.body, TreeNode::Compare { .. }));
//! ```

use serde::{Deserialize, Serialize};

use super::expr::{CompareOp, Expr};
use super::lambda::Lambda;
use super::value::Value;

/// A lambda without closures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionTree {
    /// Display name of the bound parameter
    pub parameter: String,
    /// The body
    pub body: TreeNode,
}

/// A node of an [`ExpressionTree`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Constant {
        value: Value,
    },
    Member {
        parameter: String,
        name: String,
    },
    /// Opaque test; only its name survives
    Test {
        parameter: String,
        name: String,
    },
    Compare {
        op: CompareOp,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    And {
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Or {
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Not {
        operand: Box<TreeNode>,
    },
}

impl ExpressionTree {
    pub(crate) fn from_lambda<E>(lambda: &Lambda<E>) -> Self {
        Self {
            parameter: lambda.parameter().name().to_string(),
            body: TreeNode::from_expr(lambda.body()),
        }
    }
}

impl TreeNode {
    fn from_expr<E>(expr: &Expr<E>) -> Self {
        let boxed = |e: &Expr<E>| Box::new(Self::from_expr(e));

        match expr {
            Expr::Constant(value) => Self::Constant {
                value: value.clone(),
            },
            Expr::Member {
                parameter,
                accessor,
            } => Self::Member {
                parameter: parameter.name().to_string(),
                name: accessor.name().to_string(),
            },
            Expr::Test {
                parameter,
                accessor,
            } => Self::Test {
                parameter: parameter.name().to_string(),
                name: accessor.name().to_string(),
            },
            Expr::Compare { op, left, right } => Self::Compare {
                op: *op,
                left: boxed(left),
                right: boxed(right),
            },
            Expr::And(left, right) => Self::And {
                left: boxed(left),
                right: boxed(right),
            },
            Expr::Or(left, right) => Self::Or {
                left: boxed(left),
                right: boxed(right),
            },
            Expr::Not(operand) => Self::Not {
                operand: boxed(operand),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Predicate;
    use crate::specification::{ExpressionSpecification, Specification, SpecificationExt};
    use crate::Error;
    use serde_json::json;

    struct Ticket {
        priority: u8,
        open: bool,
    }

    #[test]
    fn test_tree_json_shape() {
        let urgent = Predicate::<Ticket>::new("t", |t| {
            t.member("priority", |t| t.priority).lte(1) & t.test("open", |t| t.open)
        });

        let json = serde_json::to_value(urgent.to_tree().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "parameter": "t",
                "body": {
                    "node": "and",
                    "left": {
                        "node": "compare",
                        "op": "lte",
                        "left": { "node": "member", "parameter": "t", "name": "priority" },
                        "right": { "node": "constant", "value": { "type": "int", "value": 1 } }
                    },
                    "right": { "node": "test", "parameter": "t", "name": "open" }
                }
            })
        );
    }

    #[test]
    fn test_tree_round_trips_through_json() {
        let closed = Predicate::<Ticket>::new("t", |t| !t.test("open", |t| t.open));
        let tree = closed.to_tree().unwrap();
        let text = serde_json::to_string(&tree).unwrap();
        let back: ExpressionTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_export_refuses_lambda_with_foreign_parameter() {
        let mine = Predicate::<Ticket>::new("x", |x| x.test("open", |t| t.open));
        let other = Predicate::<Ticket>::new("x", |x| x.test("open", |t| t.open));

        let (parameter, body) = mine.into_parts();
        let mixed = Lambda::from_parts(parameter, body.and(other.body().clone()));

        assert!(!mixed.is_closed());
        let error = mixed.to_tree().unwrap_err();
        assert!(matches!(error, Error::UnboundParameter { ref name } if name == "x"));
    }

    #[test]
    fn test_composite_exports_over_one_parameter() {
        let urgent = ExpressionSpecification::new(
            "urgent",
            Predicate::<Ticket>::new("t", |t| t.member("priority", |t| t.priority).lte(1)),
        );
        let open = ExpressionSpecification::new(
            "open",
            Predicate::<Ticket>::new("u", |u| u.test("open", |t| t.open)),
        );

        let tree = urgent.and_not(open).as_expression().unwrap().to_tree().unwrap();
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "parameter": "candidate",
                "body": {
                    "node": "and",
                    "left": {
                        "node": "compare",
                        "op": "lte",
                        "left": { "node": "member", "parameter": "candidate", "name": "priority" },
                        "right": { "node": "constant", "value": { "type": "int", "value": 1 } }
                    },
                    "right": {
                        "node": "not",
                        "operand": { "node": "test", "parameter": "candidate", "name": "open" }
                    }
                }
            })
        );
    }
}
