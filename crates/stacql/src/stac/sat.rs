//! Satellite extension (`sat:*`).

use crate::extension::extension;
use crate::field::{Bounds, FieldKind};
use crate::StacEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StacEnum)]
pub enum OrbitState {
    Ascending,
    Descending,
    Geostationary,
}

extension! {
    /// Fields of the Satellite extension.
    handle Sat, accessor sat,
    prefix "sat", title "STAC Satellite Extension for STAC Items and STAC Collections";
    absolute_orbit => FieldKind::Integer(Bounds::at_least(1.0)),
    /// Ascending node crossing time.
    anx_datetime => FieldKind::Date,
    orbit_state => FieldKind::of_enum::<OrbitState>(),
    platform_international_designator => FieldKind::String,
    relative_orbit => FieldKind::Integer(Bounds::at_least(1.0)),
}
