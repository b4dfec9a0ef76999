//! Built-in STAC fields.
//!
//! The core item properties every STAC API understands, plus the `eo`,
//! `sar`, `view` and `sat` extension namespaces.

pub mod eo;
pub mod sar;
pub mod sat;
pub mod view;

use once_cell::sync::Lazy;

use crate::accessor::FieldRef;
use crate::extension::ExtensionSpec;
use crate::field::{Bounds, FieldKind, FieldSpec};
use crate::query::QueryBuilder;

pub use eo::{CommonName, Eo};
pub use sar::{FrequencyBand, ObservationDirection, Sar};
pub use sat::{OrbitState, Sat};
pub use view::View;

/// Slot of each core field; matches the order of [`core_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoreField {
    Id,
    Datetime,
    Geometry,
    Created,
    Updated,
    StartDatetime,
    EndDatetime,
    Platform,
    Constellation,
    Mission,
    Gsd,
}

static CORE_FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::unchecked("id", FieldKind::String),
        FieldSpec::unchecked("datetime", FieldKind::Date),
        FieldSpec::unchecked("geometry", FieldKind::Spatial),
        FieldSpec::unchecked("created", FieldKind::Date),
        FieldSpec::unchecked("updated", FieldKind::Date),
        FieldSpec::unchecked("start_datetime", FieldKind::Date),
        FieldSpec::unchecked("end_datetime", FieldKind::Date),
        FieldSpec::unchecked("platform", FieldKind::String),
        FieldSpec::unchecked("constellation", FieldKind::String),
        FieldSpec::unchecked("mission", FieldKind::String),
        FieldSpec::unchecked("gsd", FieldKind::Number(Bounds::at_least(0.0))),
    ]
});

/// Core item properties, in registration order.
pub fn core_fields() -> &'static [FieldSpec] {
    &CORE_FIELDS
}

/// Built-in namespaces in the order [`QueryBuilder::new`] registers them.
pub fn builtin_extensions() -> [&'static ExtensionSpec; 4] {
    [eo::spec(), sar::spec(), view::spec(), sat::spec()]
}

macro_rules! core_accessors {
    ($($(#[$meta:meta])* $method:ident => $field:ident),+ $(,)?) => {
        impl QueryBuilder {
            $(
                $(#[$meta])*
                pub fn $method(&mut self) -> FieldRef<'_> {
                    self.core(CoreField::$field)
                }
            )+
        }
    };
}

core_accessors! {
    /// Item identifier, unique within a collection.
    id => Id,
    /// Nominal acquisition time.
    datetime => Datetime,
    /// Item footprint. Spatial: use `intersects`.
    geometry => Geometry,
    created => Created,
    updated => Updated,
    start_datetime => StartDatetime,
    end_datetime => EndDatetime,
    platform => Platform,
    constellation => Constellation,
    mission => Mission,
    /// Ground sample distance in meters, never negative.
    gsd => Gsd,
}
