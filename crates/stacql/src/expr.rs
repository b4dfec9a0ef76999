//! Expression trees passed to [`QueryBuilder::filter`](crate::QueryBuilder::filter).
//!
//! Leaves come from [`Column`](crate::Column) comparisons. [`Expr::and`] and
//! [`Expr::or`] join them, checking right away that one ungrouped level uses
//! a single combinator. [`filter_grouping`] seals a subtree so it can be
//! combined with the other combinator.
//!
//! ```
//! use stacql::{filter_grouping, QueryBuilder};
//!
//! # fn main() -> stacql::Result<()> {
//! let q = QueryBuilder::new();
//! let cloud = q.column("eo:cloud_cover")?;
//! let gsd = q.column("gsd")?;
//!
//! // (cloud < 10 | cloud > 90) & gsd < 5
//! let expr = filter_grouping(cloud.lt(10)?.or(cloud.gt(90)?)?).and(gsd.lt(5)?)?;
//!
//! // mixing without a grouping fails
//! assert!(cloud.lt(10)?.or(cloud.gt(90)?)?.and(gsd.lt(5)?).is_err());
//! # let _ = expr;
//! # Ok(())
//! # }
//! ```

use crate::cql2::{Arg, Node};
use crate::error::{QueryError, Result};
use crate::op::{Combinator, Op};
use crate::value::Literal;

/// `(property, op, value)`, the leaf of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub property: String,
    pub op: Op,
    pub value: Literal,
}

impl Comparison {
    pub fn to_node(&self) -> Node {
        Node::predicate(self.op, &self.property, Arg::Literal(self.value.clone()))
    }
}

/// A boolean expression over field comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Leaf(Comparison),
    Binary {
        left: Box<Expr>,
        op: Combinator,
        right: Box<Expr>,
    },
    /// Opaque to the enclosing level's combinator check; lowered as one
    /// nested document.
    Grouping(Box<Expr>),
}

impl Expr {
    /// `self & other`.
    pub fn and(self, other: Expr) -> Result<Expr> {
        Expr::combine(self, Combinator::And, other)
    }

    /// `self | other`.
    pub fn or(self, other: Expr) -> Result<Expr> {
        Expr::combine(self, Combinator::Or, other)
    }

    /// Same as [`filter_grouping`].
    pub fn grouped(self) -> Expr {
        Expr::Grouping(Box::new(self))
    }

    /// Top-level combinator, if this is a binary node.
    pub fn combinator(&self) -> Option<Combinator> {
        match self {
            Expr::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    fn combine(left: Expr, op: Combinator, right: Expr) -> Result<Expr> {
        check_uniform(&left, op)?;
        check_uniform(&right, op)?;
        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Lowers the tree to a CQL2 node.
    ///
    /// Leaves on the ungrouped level become siblings under the tree's
    /// combinator; each grouping becomes one nested node. Args keep source
    /// order, so a grouping on the right-hand side stays last rather than
    /// being hoisted to the front. A lone leaf is wrapped in a one-argument
    /// `and`.
    pub fn to_node(&self) -> Node {
        match self {
            Expr::Leaf(comparison) => Node::logical(Op::And, vec![comparison.to_node()]),
            Expr::Grouping(inner) => inner.to_node(),
            Expr::Binary { op, .. } => {
                let mut args = Vec::new();
                self.collect(&mut args);
                Node::new(op.op(), args)
            }
        }
    }

    fn collect(&self, args: &mut Vec<Arg>) {
        match self {
            Expr::Leaf(comparison) => args.push(Arg::Node(comparison.to_node())),
            Expr::Grouping(inner) => args.push(Arg::Node(inner.to_node())),
            Expr::Binary { left, right, .. } => {
                left.collect(args);
                right.collect(args);
            }
        }
    }
}

impl From<Comparison> for Expr {
    fn from(comparison: Comparison) -> Self {
        Expr::Leaf(comparison)
    }
}

/// Marks `expr` as a self-contained group.
pub fn filter_grouping(expr: Expr) -> Expr {
    expr.grouped()
}

fn check_uniform(side: &Expr, op: Combinator) -> Result<()> {
    match side {
        Expr::Leaf(_) | Expr::Grouping(_) => Ok(()),
        Expr::Binary {
            left,
            op: found,
            right,
        } => {
            if *found != op {
                return Err(QueryError::MixedCombinators {
                    attempted: op,
                    found: *found,
                });
            }
            check_uniform(left, op)?;
            check_uniform(right, op)
        }
    }
}
