//! Field accessors.
//!
//! [`FieldRef`] borrows the [`QueryBuilder`] mutably and hands it back from
//! every setter, so calls chain:
//!
//! ```
//! use stacql::QueryBuilder;
//!
//! # fn main() -> stacql::Result<()> {
//! let mut q = QueryBuilder::new();
//! q.platform().equals("landsat-8")?
//!     .gsd().lt(30)?
//!     .eo().cloud_cover().lte(20)?
//!     .datetime().sort_by_desc();
//! assert!(q.query_dump().is_some());
//! # Ok(())
//! # }
//! ```
//!
//! [`Column`] is the detached counterpart used to build [`Expr`] leaves.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};

use crate::error::{QueryError, Result};
use crate::expr::{Comparison, Expr};
use crate::field::{day_span, FieldKind, FieldSpec, Predicate, Usage};
use crate::geometry::IntoGeometry;
use crate::op::Op;
use crate::query::QueryBuilder;
use crate::sort::SortBy;
use crate::value::Literal;

/// Mutable handle on one field of a [`QueryBuilder`].
///
/// Every fallible setter validates its input before touching any state; on
/// error the field keeps its previous predicate.
pub struct FieldRef<'q> {
    query: &'q mut QueryBuilder,
    slot: usize,
}

impl<'q> FieldRef<'q> {
    pub(crate) fn new(query: &'q mut QueryBuilder, slot: usize) -> Self {
        FieldRef { query, slot }
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.query.fields[self.slot].spec
    }

    pub fn name(&self) -> &str {
        self.spec().name()
    }

    /// The field's current predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.query.fields[self.slot].predicate
    }

    /// Detached handle for building expressions on this field.
    pub fn column(&self) -> Column {
        Column::new(Arc::clone(&self.query.fields[self.slot].spec))
    }

    fn set(self, predicate: Predicate) -> &'q mut QueryBuilder {
        self.query.fields[self.slot].predicate = predicate;
        self.query
    }

    fn edit(self, f: impl FnOnce(&mut Predicate)) -> &'q mut QueryBuilder {
        f(&mut self.query.fields[self.slot].predicate);
        self.query
    }

    /// `property = value`.
    ///
    /// On a date field a bare [`NaiveDate`] becomes the closed range of that
    /// UTC day.
    pub fn equals(self, value: impl Into<Literal>) -> Result<&'q mut QueryBuilder> {
        let value = value.into();
        let is_date = matches!(self.spec().kind(), FieldKind::Date);
        if let (true, Literal::Date(date)) = (is_date, &value) {
            return self.equals_in(*date, utc());
        }
        let value = self.spec().coerce("=", Usage::Equality, value)?;
        Ok(self.set(Predicate::Equals(value)))
    }

    /// Date field: every instant of `date` at `offset`.
    pub fn equals_in(self, date: NaiveDate, offset: FixedOffset) -> Result<&'q mut QueryBuilder> {
        if !matches!(self.spec().kind(), FieldKind::Date) {
            return Err(self.spec().invalid_op("="));
        }
        let (start, end) = self.day(date, offset)?;
        let mut predicate = Predicate::Empty;
        let range = predicate.range_mut();
        range.lower = Some((Op::Gte, Literal::Timestamp(start)));
        range.upper = Some((Op::Lte, Literal::Timestamp(end)));
        Ok(self.set(predicate))
    }

    /// `property != value`. Keeps any range bounds already set.
    ///
    /// On a date field a bare [`NaiveDate`] excludes that UTC day, which
    /// lowers as `> end-of-day or < start-of-day`. That exclusion occupies
    /// both bounds, so it replaces the predicate instead of joining it.
    pub fn not_equals(self, value: impl Into<Literal>) -> Result<&'q mut QueryBuilder> {
        let value = value.into();
        let is_date = matches!(self.spec().kind(), FieldKind::Date);
        if let (true, Literal::Date(date)) = (is_date, &value) {
            let (start, end) = self.day(*date, utc())?;
            let mut predicate = Predicate::Empty;
            let range = predicate.range_mut();
            range.lower = Some((Op::Gt, Literal::Timestamp(end)));
            range.upper = Some((Op::Lt, Literal::Timestamp(start)));
            return Ok(self.set(predicate));
        }
        let value = self.spec().coerce("!=", Usage::Equality, value)?;
        Ok(self.edit(|p| p.range_mut().not_equal = Some(value)))
    }

    /// Sets the lower or upper bound, depending on `op`.
    fn bound(self, op: Op, value: Literal) -> Result<&'q mut QueryBuilder> {
        let value = self.spec().coerce(op.as_str(), Usage::Bound, value)?;
        Ok(self.edit(|p| {
            let range = p.range_mut();
            let slot = if op.is_lower_bound() {
                &mut range.lower
            } else {
                &mut range.upper
            };
            *slot = Some((op, value));
        }))
    }

    fn day(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        day_span(date, offset).ok_or_else(|| self.date_out_of_range(date))
    }

    fn date_out_of_range(&self, date: NaiveDate) -> QueryError {
        QueryError::DateOutOfRange {
            field: self.name().to_string(),
            date: date.to_string(),
        }
    }

    /// `property > value`. Keeps the upper bound.
    pub fn gt(self, value: impl Into<Literal>) -> Result<&'q mut QueryBuilder> {
        self.bound(Op::Gt, value.into())
    }

    /// `property >= value`. Keeps the upper bound.
    pub fn gte(self, value: impl Into<Literal>) -> Result<&'q mut QueryBuilder> {
        self.bound(Op::Gte, value.into())
    }

    /// `property < value`. Keeps the lower bound.
    pub fn lt(self, value: impl Into<Literal>) -> Result<&'q mut QueryBuilder> {
        self.bound(Op::Lt, value.into())
    }

    /// `property <= value`. Keeps the lower bound.
    pub fn lte(self, value: impl Into<Literal>) -> Result<&'q mut QueryBuilder> {
        self.bound(Op::Lte, value.into())
    }

    /// Date field: the span of `duration` from `date`.
    ///
    /// A positive duration runs forward from the start of the day; a zero or
    /// negative one runs backward from the end of the day.
    pub fn delta(
        self,
        date: NaiveDate,
        duration: Duration,
        offset: FixedOffset,
    ) -> Result<&'q mut QueryBuilder> {
        if !matches!(self.spec().kind(), FieldKind::Date) {
            return Err(self.spec().invalid_op("delta"));
        }
        let (day_start, day_end) = self.day(date, offset)?;
        let span = if duration > Duration::zero() {
            day_start
                .checked_add_signed(duration)
                .map(|end| (day_start, end))
        } else {
            day_end
                .checked_add_signed(duration)
                .map(|start| (start, day_end))
        };
        let (start, end) = span.ok_or_else(|| self.date_out_of_range(date))?;
        let mut predicate = Predicate::Empty;
        let range = predicate.range_mut();
        range.lower = Some((Op::Gte, Literal::Timestamp(start)));
        range.upper = Some((Op::Lte, Literal::Timestamp(end)));
        Ok(self.set(predicate))
    }

    fn members<I, V>(&self, op: &'static str, values: I) -> Result<Vec<Literal>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        values
            .into_iter()
            .map(|v| self.spec().coerce(op, Usage::Member, v.into()))
            .collect()
    }

    /// `property in (values...)`, in the order given.
    pub fn in_set<I, V>(self, values: I) -> Result<&'q mut QueryBuilder>
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        let values = self.members("in", values)?;
        Ok(self.set(Predicate::InSet(values)))
    }

    /// `not (property in (values...))`.
    pub fn not_in_set<I, V>(self, values: I) -> Result<&'q mut QueryBuilder>
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        let values = self.members("not in", values)?;
        Ok(self.set(Predicate::NotInSet(values)))
    }

    /// `property like pattern`; `%` is the wildcard.
    pub fn like(self, pattern: impl Into<String>) -> Result<&'q mut QueryBuilder> {
        if !matches!(self.spec().kind(), FieldKind::String) {
            return Err(self.spec().invalid_op("like"));
        }
        Ok(self.set(Predicate::Like(pattern.into())))
    }

    /// `property isNull`.
    pub fn is_null(self) -> &'q mut QueryBuilder {
        self.set(Predicate::IsNull)
    }

    /// Spatial field: `s_intersects(property, geometry)`.
    pub fn intersects(self, geometry: impl IntoGeometry) -> Result<&'q mut QueryBuilder> {
        if !matches!(self.spec().kind(), FieldKind::Spatial) {
            return Err(self.spec().invalid_op("s_intersects"));
        }
        let geometry = geometry.into_geometry()?;
        Ok(self.set(Predicate::Intersects(geometry)))
    }

    /// Drops this field's predicate.
    pub fn clear(self) -> &'q mut QueryBuilder {
        self.set(Predicate::Empty)
    }

    /// Makes this field the query's sort key, ascending.
    pub fn sort_by_asc(self) -> &'q mut QueryBuilder {
        let key = SortBy::asc(self.name());
        let query = self.query;
        query.set_sort(key)
    }

    /// Makes this field the query's sort key, descending.
    pub fn sort_by_desc(self) -> &'q mut QueryBuilder {
        let key = SortBy::desc(self.name());
        let query = self.query;
        query.set_sort(key)
    }
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRef")
            .field("name", &self.name())
            .field("predicate", self.predicate())
            .finish()
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Detached handle on a field's metadata, for building [`Expr`] leaves.
///
/// Values go through the same checks as the [`FieldRef`] setters.
#[derive(Debug, Clone)]
pub struct Column {
    spec: Arc<FieldSpec>,
}

impl Column {
    pub(crate) fn new(spec: Arc<FieldSpec>) -> Self {
        Column { spec }
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    fn compare(&self, op: Op, usage: Usage, value: Literal) -> Result<Expr> {
        let value = self.spec.coerce(op.as_str(), usage, value)?;
        Ok(Expr::Leaf(Comparison {
            property: self.spec.name().to_string(),
            op,
            value,
        }))
    }

    /// `property = value`.
    #[allow(clippy::should_implement_trait)]
    pub fn eq(&self, value: impl Into<Literal>) -> Result<Expr> {
        self.compare(Op::Eq, Usage::Equality, value.into())
    }

    pub fn gt(&self, value: impl Into<Literal>) -> Result<Expr> {
        self.compare(Op::Gt, Usage::Bound, value.into())
    }

    pub fn gte(&self, value: impl Into<Literal>) -> Result<Expr> {
        self.compare(Op::Gte, Usage::Bound, value.into())
    }

    pub fn lt(&self, value: impl Into<Literal>) -> Result<Expr> {
        self.compare(Op::Lt, Usage::Bound, value.into())
    }

    pub fn lte(&self, value: impl Into<Literal>) -> Result<Expr> {
        self.compare(Op::Lte, Usage::Bound, value.into())
    }
}
