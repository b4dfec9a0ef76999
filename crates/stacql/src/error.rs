//! Error types for the stacql crate.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::op::Combinator;

/// Errors raised while building or serializing a query.
///
/// Every error is raised at the call site that caused it, before any state
/// on the [`QueryBuilder`](crate::QueryBuilder) is touched.
#[derive(Debug, Error)]
pub enum QueryError {
    /// `and` and `or` were mixed outside of a [`filter_grouping`](crate::filter_grouping).
    #[error(
        "can't combine with '{attempted}' over an ungrouped '{found}' expression. \
         a filter must be all 'and', or all 'or' (except inside of filter_grouping)"
    )]
    MixedCombinators {
        attempted: Combinator,
        found: Combinator,
    },

    /// Value is smaller than the field's declared minimum.
    #[error("setting value of {value}, can't be less than min value of {bound} for {field}")]
    BelowMinimum {
        field: String,
        value: f64,
        bound: f64,
    },

    /// Value is larger than the field's declared maximum.
    #[error("setting value of {value}, can't be greater than max value of {bound} for {field}")]
    AboveMaximum {
        field: String,
        value: f64,
        bound: f64,
    },

    /// NaN or an infinity on a numeric field.
    #[error("{value} is not a finite number for {field}")]
    NotFinite { field: String, value: f64 },

    /// Date expansion left the representable range of timestamps.
    #[error("date {date} for {field} is out of the supported timestamp range")]
    DateOutOfRange { field: String, date: String },

    /// Non-integral value on an integer field.
    #[error("for integer field {field}, must use integers. {value} is not an integer")]
    NotAnInteger { field: String, value: f64 },

    /// Timestamp without an offset on a date field.
    #[error("datetime {value} for {field} does not have a timezone set")]
    TimezoneMissing { field: String, value: String },

    /// Value outside an enum field's fixed set.
    #[error("'{value}' is not a valid value for {field}. expected one of: {}", allowed.join(", "))]
    NotInEnum {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Operation is not defined for this kind of field.
    #[error("operator '{op}' is not valid for {kind} field {field}")]
    InvalidOperatorForKind {
        field: String,
        op: &'static str,
        kind: &'static str,
    },

    /// Value type does not fit the field kind.
    #[error("type mismatch for {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Malformed geometry handed to `intersects`.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Enum field declared with fewer than two distinct values.
    #[error("enum field {field} must have 2 or more unique values. values are {values:?}")]
    EnumTooSmall { field: String, values: Vec<String> },

    /// Property name is not a dotted/colon-namespaced identifier.
    #[error("invalid property name: '{0}'")]
    InvalidPropertyName(String),

    /// No field with this property name.
    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// No extension namespace with this prefix.
    #[error("unknown extension: '{0}'")]
    UnknownExtension(String),

    /// A field with this property name is already registered.
    #[error("field '{0}' is already registered")]
    DuplicateField(String),

    /// An extension with this prefix is already registered.
    #[error("extension '{0}' is already registered")]
    DuplicateExtension(String),

    /// Extension schema could not be mapped to field metadata.
    #[error("schema error: {0}")]
    Schema(String),

    /// JSON text rendering failed.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Mixed `and`/`or` outside of a grouping.
    Grammar,
    /// Numeric value outside declared bounds, non-finite, or a date
    /// expansion that overflows.
    Range,
    /// Wrong value type, non-integral value, or missing timezone.
    Type,
    /// Value outside an enum's set.
    EnumMembership,
    /// Malformed geometry.
    Geometry,
    /// Field or extension lookup and registration.
    Lookup,
    /// Field metadata could not be built.
    Schema,
    /// JSON rendering.
    Serialization,
}

impl QueryError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::MixedCombinators { .. } => ErrorKind::Grammar,
            QueryError::BelowMinimum { .. }
            | QueryError::AboveMaximum { .. }
            | QueryError::NotFinite { .. }
            | QueryError::DateOutOfRange { .. } => ErrorKind::Range,
            QueryError::NotAnInteger { .. }
            | QueryError::TimezoneMissing { .. }
            | QueryError::InvalidOperatorForKind { .. }
            | QueryError::TypeMismatch { .. } => ErrorKind::Type,
            QueryError::NotInEnum { .. } => ErrorKind::EnumMembership,
            QueryError::Geometry(_) => ErrorKind::Geometry,
            QueryError::UnknownField(_)
            | QueryError::UnknownExtension(_)
            | QueryError::DuplicateField(_)
            | QueryError::DuplicateExtension(_) => ErrorKind::Lookup,
            QueryError::EnumTooSmall { .. }
            | QueryError::InvalidPropertyName(_)
            | QueryError::Schema(_) => ErrorKind::Schema,
            QueryError::Json(_) => ErrorKind::Serialization,
        }
    }
}

/// Result type for stacql operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_message_names_field_value_and_bound() {
        let err = QueryError::AboveMaximum {
            field: "eo:cloud_cover".to_string(),
            value: 101.0,
            bound: 100.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("eo:cloud_cover"));
        assert!(msg.contains("101"));
        assert!(msg.contains("100"));
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn non_finite_and_date_overflow_are_range_errors() {
        let err = QueryError::NotFinite {
            field: "gsd".to_string(),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "NaN is not a finite number for gsd");
        assert_eq!(err.kind(), ErrorKind::Range);

        let err = QueryError::DateOutOfRange {
            field: "datetime".to_string(),
            date: "+262142-12-31".to_string(),
        };
        assert!(err.to_string().contains("+262142-12-31"));
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn enum_message_lists_allowed_values() {
        let err = QueryError::NotInEnum {
            field: "sar:observation_direction".to_string(),
            value: "up".to_string(),
            allowed: vec!["left".to_string(), "right".to_string()],
        };
        assert!(err.to_string().ends_with("left, right"));
        assert_eq!(err.kind(), ErrorKind::EnumMembership);
    }

    #[test]
    fn grammar_kind() {
        let err = QueryError::MixedCombinators {
            attempted: Combinator::And,
            found: Combinator::Or,
        };
        assert_eq!(err.kind(), ErrorKind::Grammar);
        assert!(err.to_string().contains("filter_grouping"));
    }
}
