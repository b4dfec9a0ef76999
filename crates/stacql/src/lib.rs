//! stacql - Typed CQL2-JSON filter builder for STAC APIs.
//!
//! stacql builds the `filter` body of a STAC API item search. It supports:
//!
//! - Typed field accessors for the STAC core properties and the `eo`, `sar`,
//!   `view` and `sat` extensions
//! - Validation at the call site: numeric bounds, integer fields, enum
//!   membership, timezone-aware timestamps, GeoJSON geometries
//! - Compound ranges, including inverted ranges that lower to `or`
//! - Expression trees with `and`/`or` and explicit grouping
//! - Extensions loaded from their JSON Schema at runtime
//!
//! It never talks to a server; the output is a document to send.
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stacql::{QueryBuilder, ObservationDirection};
//!
//! # fn main() -> stacql::Result<()> {
//! let mut q = QueryBuilder::new();
//! q.platform().equals("Landsat8")?;
//!
//! let json = q.query_dump_json()?;
//! assert_eq!(
//!     json,
//!     r#"{"filter-lang":"cql2-json","filter":{"op":"and","args":[{"op":"=","args":[{"property":"platform"},"Landsat8"]}]}}"#
//! );
//!
//! // setters chain through the builder
//! q.datetime().equals(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())?
//!     .sar().observation_direction().equals(ObservationDirection::Left)?
//!     .view().off_nadir().lte(10)?;
//!
//! // values are checked before anything is stored
//! assert!(q.eo().cloud_cover().equals(101).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # Document Assembly
//!
//! ```text
//! filter = and(top-level field predicates...,
//!              attached filter expressions...,
//!              extension member predicates...)
//! ```
//!
//! `or` replaces the top-level `and` with [`DumpOptions::top_level_is_or`].
//! A builder with nothing set dumps to `None` (JSON `null`).
//!
//! # Field Kinds and Operations
//!
//! | Kind | Operations |
//! |------|------------|
//! | String | `equals`, `not_equals`, `in_set`, `not_in_set`, `like`, `is_null` |
//! | Number / Integer | `equals`, `not_equals`, `gt`, `gte`, `lt`, `lte`, `is_null` |
//! | Date | `equals`, `equals_in`, `not_equals`, `gt`, `gte`, `lt`, `lte`, `delta`, `is_null` |
//! | Enum | `equals`, `not_equals`, `in_set`, `not_in_set`, `is_null` |
//! | Boolean | `equals`, `not_equals`, `is_null` |
//! | Spatial | `intersects`, `is_null` |
//!
//! # Logging
//!
//! Registration, schema loading and document assembly emit `tracing` debug
//! events. No subscriber is installed.

extern crate self as stacql;

mod accessor;
mod cql2;
mod error;
mod expr;
mod extension;
mod field;
mod geometry;
mod op;
mod query;
mod schema;
mod sort;
pub mod stac;
mod traits;
mod value;

// Re-export public API
pub use accessor::{Column, FieldRef};
pub use cql2::{Arg, DumpOptions, FilterDocument, FilterLang, Node, PropertyRef};
pub use error::{ErrorKind, QueryError, Result};
pub use expr::{filter_grouping, Comparison, Expr};
pub use extension::{ExtensionRef, ExtensionSpec};
pub use field::{is_valid_property_name, Bounds, FieldKind, FieldSpec, Predicate, Range};
pub use geometry::{GeometryError, IntoGeometry};
pub use op::{Combinator, Op};
pub use query::QueryBuilder;
pub use schema::{extension_from_schema, SchemaOptions};
pub use sort::{Dir, SortBy};
pub use stac::{CommonName, FrequencyBand, ObservationDirection, OrbitState};
pub use traits::StacEnum;
pub use value::{format_timestamp, Literal, Number};

pub use stacql_macros::StacEnum;
