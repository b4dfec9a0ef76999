//! Electro-Optical extension (`eo:*`).

use crate::extension::extension;
use crate::field::{Bounds, FieldKind};
use crate::StacEnum;

/// Common band names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StacEnum)]
#[stac(rename_all = "lowercase")]
pub enum CommonName {
    Pan,
    Coastal,
    Blue,
    Green,
    Green05,
    Yellow,
    Red,
    Rededge,
    Rededge071,
    Rededge075,
    Rededge078,
    Nir,
    Nir08,
    Nir09,
    Cirrus,
    Swir16,
    Swir22,
    Lwir,
    Lwir11,
    Lwir12,
}

extension! {
    /// Fields of the EO extension.
    handle Eo, accessor eo,
    prefix "eo", title "STAC EO Extension for STAC Items and STAC Collections";
    center_wavelength => FieldKind::Number(Bounds::UNBOUNDED),
    /// Percentage, 0 to 100.
    cloud_cover => FieldKind::Number(Bounds::between(0.0, 100.0)),
    common_name => FieldKind::of_enum::<CommonName>(),
    full_width_half_max => FieldKind::Number(Bounds::UNBOUNDED),
    /// Percentage, 0 to 100.
    snow_cover => FieldKind::Number(Bounds::between(0.0, 100.0)),
    solar_illumination => FieldKind::Number(Bounds::at_least(0.0)),
}
