//! CQL2 operators.
//!
//! [`Op`] is every `op` value this crate writes into a filter document.
//! [`Combinator`] is the subset used to join expressions.

use serde::{Deserialize, Serialize};

/// Operator of a CQL2-JSON node.
///
/// Operators are grouped by what they take:
/// - **Comparison**: `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte` - a property and a scalar
/// - **String**: `Like` - a property and a `%` pattern
/// - **Set**: `In` - a property and a list
/// - **Null**: `IsNull` - a property only
/// - **Spatial**: `Intersects` - a property and a GeoJSON geometry
/// - **Logical**: `And`, `Or`, `Not` - nested nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "isNull")]
    IsNull,
    #[serde(rename = "s_intersects")]
    Intersects,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "not")]
    Not,
}

impl Op {
    /// Returns `true` for `>` and `>=`.
    pub fn is_lower_bound(self) -> bool {
        matches!(self, Op::Gt | Op::Gte)
    }

    /// Returns the CQL2-JSON spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "like",
            Op::In => "in",
            Op::IsNull => "isNull",
            Op::Intersects => "s_intersects",
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean combinator joining two expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// The logical [`Op`] this combinator lowers to.
    pub fn op(self) -> Op {
        match self {
            Combinator::And => Op::And,
            Combinator::Or => Op::Or,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
