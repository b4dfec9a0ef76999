//! Field metadata and per-field predicate state.
//!
//! A [`FieldSpec`] says what a property is (name, [`FieldKind`], bounds or
//! enum members). The mutable side, [`Predicate`], lives inside the
//! [`QueryBuilder`](crate::QueryBuilder) and is only touched through a
//! [`FieldRef`](crate::FieldRef).
//!
//! # Predicate state
//!
//! A field holds at most one predicate. Every setter replaces the state, with
//! one exception: the lower bound, upper bound and not-equal value of a
//! [`Range`] accumulate, so `gt(10)`, `lt(20)` and `not_equals(15)` together
//! express "between 10 and 20, except 15".

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cql2::{Arg, Node};
use crate::error::{QueryError, Result};
use crate::op::Op;
use crate::traits::StacEnum;
use crate::value::{Literal, Number};

static PROPERTY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*([:.][A-Za-z_][A-Za-z0-9_\-]*)*$")
        .expect("property name pattern is valid")
});

/// Returns `true` for dotted/colon-namespaced identifiers such as
/// `eo:cloud_cover` or `proj.epsg`.
pub fn is_valid_property_name(name: &str) -> bool {
    PROPERTY_NAME.is_match(name)
}

/// Inclusive numeric limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        min: None,
        max: None,
    };

    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Bounds { min, max }
    }

    pub const fn at_least(min: f64) -> Self {
        Bounds::new(Some(min), None)
    }

    pub const fn between(min: f64, max: f64) -> Self {
        Bounds::new(Some(min), Some(max))
    }

    /// Fails when `value` falls outside `[min, max]`.
    pub fn check(&self, field: &str, value: f64) -> Result<()> {
        if let Some(min) = self.min {
            if value < min {
                return Err(QueryError::BelowMinimum {
                    field: field.to_string(),
                    value,
                    bound: min,
                });
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(QueryError::AboveMaximum {
                    field: field.to_string(),
                    value,
                    bound: max,
                });
            }
        }
        Ok(())
    }
}

/// What a property holds, and therefore which operations it accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number(Bounds),
    Integer(Bounds),
    Date,
    Boolean,
    /// Closed set of string values.
    Enum(Vec<String>),
    Spatial,
}

impl FieldKind {
    /// Enum kind listing every variant of `E`, in declaration order.
    pub fn of_enum<E: StacEnum>() -> Self {
        FieldKind::Enum(E::VARIANTS.iter().map(|v| v.as_str().to_string()).collect())
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number(_) => "number",
            FieldKind::Integer(_) => "integer",
            FieldKind::Date => "date",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum(_) => "enum",
            FieldKind::Spatial => "spatial",
        }
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        match self {
            FieldKind::Number(b) | FieldKind::Integer(b) => Some(b),
            _ => None,
        }
    }

    /// Members of an enum kind.
    pub fn enum_values(&self) -> Option<&[String]> {
        match self {
            FieldKind::Enum(values) => Some(values),
            _ => None,
        }
    }
}

/// How a value is about to be used; decides which kinds accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Usage {
    Equality,
    Bound,
    Member,
}

/// Declarative description of one filterable property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    description: Option<String>,
}

impl FieldSpec {
    /// Creates a field, checking the name and, for enums, that the value
    /// set has two or more distinct members.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Result<Self> {
        let name = name.into();
        if !is_valid_property_name(&name) {
            return Err(QueryError::InvalidPropertyName(name));
        }
        if let FieldKind::Enum(values) = &kind {
            let mut unique: Vec<&String> = values.iter().collect();
            unique.sort();
            unique.dedup();
            if unique.len() < 2 {
                return Err(QueryError::EnumTooSmall {
                    field: name,
                    values: values.clone(),
                });
            }
        }
        Ok(FieldSpec::unchecked(name, kind))
    }

    /// Built-in declarations are constant and covered by tests.
    pub(crate) fn unchecked(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn invalid_op(&self, op: &'static str) -> QueryError {
        QueryError::InvalidOperatorForKind {
            field: self.name.clone(),
            op,
            kind: self.kind.name(),
        }
    }

    fn mismatch(&self, expected: &'static str, actual: &Literal) -> QueryError {
        QueryError::TypeMismatch {
            field: self.name.clone(),
            expected,
            actual: actual.type_name(),
        }
    }

    /// Validates `value` for use with `op` and returns the form stored in
    /// the predicate.
    pub(crate) fn coerce(&self, op: &'static str, usage: Usage, value: Literal) -> Result<Literal> {
        match (&self.kind, usage) {
            (FieldKind::Spatial, _)
            | (FieldKind::String, Usage::Bound)
            | (FieldKind::Enum(_), Usage::Bound)
            | (FieldKind::Boolean, Usage::Bound | Usage::Member)
            | (FieldKind::Number(_) | FieldKind::Integer(_) | FieldKind::Date, Usage::Member) => {
                Err(self.invalid_op(op))
            }
            (FieldKind::String, _) => Ok(match value {
                Literal::String(_) => value,
                other => Literal::String(other.to_string()),
            }),
            (FieldKind::Boolean, _) => match value {
                Literal::Bool(_) => Ok(value),
                other => Err(self.mismatch("boolean", &other)),
            },
            (FieldKind::Enum(allowed), _) => match value {
                Literal::String(s) if allowed.contains(&s) => Ok(Literal::String(s)),
                Literal::String(s) => Err(QueryError::NotInEnum {
                    field: self.name.clone(),
                    value: s,
                    allowed: allowed.clone(),
                }),
                other => Err(self.mismatch("string", &other)),
            },
            (FieldKind::Number(bounds), _) => {
                let n = self.number(&value)?;
                bounds.check(&self.name, n.to_f64())?;
                Ok(Literal::Number(n))
            }
            (FieldKind::Integer(bounds), _) => {
                let n = self.number(&value)?;
                if !n.is_integral() {
                    return Err(QueryError::NotAnInteger {
                        field: self.name.clone(),
                        value: n.to_f64(),
                    });
                }
                bounds.check(&self.name, n.to_f64())?;
                Ok(Literal::Number(n))
            }
            (FieldKind::Date, _) => match value {
                Literal::Timestamp(_) => Ok(value),
                Literal::NaiveTimestamp(_) => Err(QueryError::TimezoneMissing {
                    field: self.name.clone(),
                    value: value.to_string(),
                }),
                other => Err(self.mismatch("timestamp", &other)),
            },
        }
    }

    fn number(&self, value: &Literal) -> Result<Number> {
        let n = value
            .as_number()
            .ok_or_else(|| self.mismatch("number", value))?;
        if !n.to_f64().is_finite() {
            return Err(QueryError::NotFinite {
                field: self.name.clone(),
                value: n.to_f64(),
            });
        }
        Ok(n)
    }
}

/// Lower bound, upper bound and excluded value of a numeric or date field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Range {
    pub lower: Option<(Op, Literal)>,
    pub upper: Option<(Op, Literal)>,
    pub not_equal: Option<Literal>,
}

impl Range {
    /// `true` when the lower bound is above the upper bound, meaning
    /// "outside the interval".
    pub fn is_inverted(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some((_, low)), Some((_, high))) => low.compare(high) == Some(Ordering::Greater),
            _ => false,
        }
    }

    fn lower_to_node(&self, property: &str) -> Option<Node> {
        let bound = |(op, value): &(Op, Literal)| {
            Node::predicate(*op, property, Arg::Literal(value.clone()))
        };
        let not_equal = self
            .not_equal
            .as_ref()
            .map(|v| Node::predicate(Op::Ne, property, Arg::Literal(v.clone())));

        match (self.lower.as_ref().map(bound), self.upper.as_ref().map(bound)) {
            (Some(low), Some(high)) if self.is_inverted() => {
                let either = Node::logical(Op::Or, vec![low, high]);
                Some(match not_equal {
                    Some(ne) => Node::logical(Op::And, vec![either, ne]),
                    None => either,
                })
            }
            (Some(low), Some(high)) => {
                let mut children = vec![low, high];
                children.extend(not_equal);
                Some(Node::logical(Op::And, children))
            }
            (Some(single), None) | (None, Some(single)) => Some(match not_equal {
                Some(ne) => Node::logical(Op::And, vec![single, ne]),
                None => single,
            }),
            (None, None) => not_equal,
        }
    }
}

/// Current filter state of one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    #[default]
    Empty,
    IsNull,
    Equals(Literal),
    InSet(Vec<Literal>),
    NotInSet(Vec<Literal>),
    Like(String),
    Intersects(geojson::Geometry),
    Range(Range),
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::Empty)
    }

    /// Edits the range, starting a fresh one if the field held anything else.
    pub(crate) fn range_mut(&mut self) -> &mut Range {
        if !matches!(self, Predicate::Range(_)) {
            *self = Predicate::Range(Range::default());
        }
        match self {
            Predicate::Range(range) => range,
            _ => unreachable!("predicate was just set to a range"),
        }
    }

    /// Lowers this predicate to its CQL2 node, or `None` when it contributes
    /// nothing to the document.
    pub fn to_node(&self, property: &str) -> Option<Node> {
        match self {
            Predicate::Empty => None,
            Predicate::IsNull => Some(Node::is_null(property)),
            Predicate::Equals(value) => Some(Node::predicate(
                Op::Eq,
                property,
                Arg::Literal(value.clone()),
            )),
            Predicate::InSet(values) if values.is_empty() => None,
            Predicate::InSet(values) => Some(Node::predicate(
                Op::In,
                property,
                Arg::List(values.clone()),
            )),
            Predicate::NotInSet(values) if values.is_empty() => None,
            Predicate::NotInSet(values) => Some(Node::not(Node::predicate(
                Op::In,
                property,
                Arg::List(values.clone()),
            ))),
            Predicate::Like(pattern) => Some(Node::predicate(
                Op::Like,
                property,
                Arg::Literal(Literal::String(pattern.clone())),
            )),
            Predicate::Intersects(geometry) => Some(Node::predicate(
                Op::Intersects,
                property,
                Arg::Geometry(geometry.clone()),
            )),
            Predicate::Range(range) => range.lower_to_node(property),
        }
    }
}

/// A registered field: shared metadata plus its predicate.
#[derive(Debug, Clone)]
pub(crate) struct Field {
    pub spec: Arc<FieldSpec>,
    pub predicate: Predicate,
}

impl Field {
    pub fn new(spec: Arc<FieldSpec>) -> Self {
        Field {
            spec,
            predicate: Predicate::Empty,
        }
    }

    pub fn to_node(&self) -> Option<Node> {
        self.predicate.to_node(self.spec.name())
    }
}

/// First and last instant of `date` at `offset`. The last instant is
/// `23:59:59.999999`. `None` when either falls outside chrono's range.
pub(crate) fn day_span(
    date: NaiveDate,
    offset: FixedOffset,
) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let start = at_offset(date.and_time(NaiveTime::MIN), offset)?;
    let end = start.checked_add_signed(Duration::days(1) - Duration::microseconds(1))?;
    Some((start, end))
}

fn at_offset(local: chrono::NaiveDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let utc = local.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
    Some(DateTime::from_naive_utc_and_offset(utc, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn number_spec(min: f64, max: f64) -> FieldSpec {
        FieldSpec::new("eo:cloud_cover", FieldKind::Number(Bounds::between(min, max))).unwrap()
    }

    #[test]
    fn property_names() {
        assert!(is_valid_property_name("platform"));
        assert!(is_valid_property_name("sar:frequency_band"));
        assert!(is_valid_property_name("s1:instrument_configuration_ID"));
        assert!(is_valid_property_name("properties.gsd"));
        assert!(!is_valid_property_name(""));
        assert!(!is_valid_property_name("sar:"));
        assert!(!is_valid_property_name("has space"));
        assert!(!is_valid_property_name("9lives"));
    }

    #[test]
    fn enum_needs_two_distinct_values() {
        let err = FieldSpec::new(
            "x:mode",
            FieldKind::Enum(vec!["a".to_string(), "a".to_string()]),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::EnumTooSmall { .. }));

        assert!(FieldSpec::new("x:mode", FieldKind::Enum(vec!["a".into(), "b".into()])).is_ok());
    }

    #[test]
    fn invalid_name_is_rejected() {
        let err = FieldSpec::new("bad name", FieldKind::String).unwrap_err();
        assert!(matches!(err, QueryError::InvalidPropertyName(_)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let spec = number_spec(0.0, 100.0);
        assert!(spec.coerce("=", Usage::Equality, Literal::from(0)).is_ok());
        assert!(spec.coerce("=", Usage::Equality, Literal::from(100)).is_ok());
        assert!(matches!(
            spec.coerce("=", Usage::Equality, Literal::from(101)),
            Err(QueryError::AboveMaximum { .. })
        ));
        assert!(matches!(
            spec.coerce(">", Usage::Bound, Literal::from(-1)),
            Err(QueryError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn integer_rejects_fractions() {
        let spec = FieldSpec::new("sat:absolute_orbit", FieldKind::Integer(Bounds::at_least(1.0)))
            .unwrap();
        assert!(spec.coerce("=", Usage::Equality, Literal::from(4.0)).is_ok());
        assert!(matches!(
            spec.coerce("<", Usage::Bound, Literal::from(4.5)),
            Err(QueryError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn string_stringifies_scalars() {
        let spec = FieldSpec::new("id", FieldKind::String).unwrap();
        assert_eq!(
            spec.coerce("=", Usage::Equality, Literal::from(42)).unwrap(),
            Literal::from("42")
        );
        assert!(matches!(
            spec.coerce(">", Usage::Bound, Literal::from("a")),
            Err(QueryError::InvalidOperatorForKind { op: ">", .. })
        ));
    }

    #[test]
    fn date_requires_zone() {
        let spec = FieldSpec::new("datetime", FieldKind::Date).unwrap();
        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            spec.coerce(">", Usage::Bound, Literal::from(naive)),
            Err(QueryError::TimezoneMissing { .. })
        ));
        let zoned = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(spec.coerce(">", Usage::Bound, Literal::from(zoned)).is_ok());
    }

    #[test]
    fn range_tie_break() {
        let mut p = Predicate::Empty;
        p.range_mut().lower = Some((Op::Gt, Literal::from(90)));
        p.range_mut().upper = Some((Op::Lt, Literal::from(1)));
        assert_eq!(p.to_node("eo:cloud_cover").unwrap().op, Op::Or);

        p.range_mut().upper = Some((Op::Lt, Literal::from(95)));
        assert_eq!(p.to_node("eo:cloud_cover").unwrap().op, Op::And);
    }

    #[test]
    fn equal_bounds_lower_as_and() {
        let mut p = Predicate::Empty;
        p.range_mut().lower = Some((Op::Gte, Literal::from(5)));
        p.range_mut().upper = Some((Op::Lte, Literal::from(5)));
        assert_eq!(p.to_node("gsd").unwrap().op, Op::And);
    }

    #[test]
    fn not_equal_joins_a_closed_range() {
        let mut p = Predicate::Empty;
        let range = p.range_mut();
        range.lower = Some((Op::Gt, Literal::from(1)));
        range.upper = Some((Op::Lt, Literal::from(9)));
        range.not_equal = Some(Literal::from(5));
        let node = p.to_node("gsd").unwrap();
        assert_eq!(node.op, Op::And);
        assert_eq!(node.args.len(), 3);
    }

    #[test]
    fn not_equal_wraps_an_inverted_range() {
        let mut p = Predicate::Empty;
        let range = p.range_mut();
        range.lower = Some((Op::Gt, Literal::from(9)));
        range.upper = Some((Op::Lt, Literal::from(1)));
        range.not_equal = Some(Literal::from(5));
        let node = p.to_node("gsd").unwrap();
        assert_eq!(node.op, Op::And);
        assert_eq!(node.args.len(), 2);
        assert!(matches!(&node.args[0], Arg::Node(inner) if inner.op == Op::Or));
    }

    #[test]
    fn not_equal_alone() {
        let mut p = Predicate::Empty;
        p.range_mut().not_equal = Some(Literal::from("x"));
        assert_eq!(p.to_node("id").unwrap().op, Op::Ne);
    }

    #[test]
    fn empty_sets_contribute_nothing() {
        assert!(Predicate::InSet(Vec::new()).to_node("id").is_none());
        assert!(Predicate::NotInSet(Vec::new()).to_node("id").is_none());
        assert!(Predicate::Empty.to_node("id").is_none());
    }

    #[test]
    fn day_span_covers_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = day_span(date, FixedOffset::east_opt(0).unwrap()).unwrap();
        assert_eq!(Literal::from(start).to_string(), "2024-01-01T00:00:00Z");
        assert_eq!(Literal::from(end).to_string(), "2024-01-01T23:59:59.999999Z");

        let (start, _) = day_span(date, FixedOffset::west_opt(5 * 3600).unwrap()).unwrap();
        assert_eq!(Literal::from(start).to_string(), "2024-01-01T00:00:00-05:00");
    }

    #[test]
    fn day_span_at_the_edges_of_time() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let (_, end) = day_span(NaiveDate::MAX, utc).unwrap();
        let last = NaiveDate::MAX.and_hms_micro_opt(23, 59, 59, 999_999).unwrap();
        assert_eq!(end.naive_utc(), last);

        let west = FixedOffset::west_opt(3600).unwrap();
        assert!(day_span(NaiveDate::MAX, west).is_none());
        let east = FixedOffset::east_opt(3600).unwrap();
        assert!(day_span(NaiveDate::MIN, east).is_none());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let spec = number_spec(0.0, 100.0);
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                spec.coerce("=", Usage::Equality, Literal::from(value)),
                Err(QueryError::NotFinite { .. })
            ));
        }

        let unbounded = FieldSpec::new("gsd", FieldKind::Number(Bounds::UNBOUNDED)).unwrap();
        assert!(unbounded
            .coerce(">", Usage::Bound, Literal::from(f64::INFINITY))
            .is_err());

        let integer = FieldSpec::new("sar:looks_range", FieldKind::Integer(Bounds::UNBOUNDED))
            .unwrap();
        assert!(matches!(
            integer.coerce("=", Usage::Equality, Literal::from(f64::NAN)),
            Err(QueryError::NotFinite { .. })
        ));
    }
}
