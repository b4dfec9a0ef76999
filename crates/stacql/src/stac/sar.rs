//! Synthetic Aperture Radar extension (`sar:*`).

use crate::extension::extension;
use crate::field::{Bounds, FieldKind};
use crate::StacEnum;

/// Radar frequency band designations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StacEnum)]
#[stac(rename_all = "verbatim")]
pub enum FrequencyBand {
    P,
    L,
    S,
    C,
    X,
    Ku,
    K,
    Ka,
}

/// Antenna pointing direction relative to the flight path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StacEnum)]
pub enum ObservationDirection {
    Left,
    Right,
}

extension! {
    /// Fields of the SAR extension.
    handle Sar, accessor sar,
    prefix "sar", title "STAC SAR Extension for STAC Items and STAC Collections";
    /// Center frequency in gigahertz.
    center_frequency => FieldKind::Number(Bounds::UNBOUNDED),
    frequency_band => FieldKind::of_enum::<FrequencyBand>(),
    instrument_mode => FieldKind::String,
    looks_azimuth => FieldKind::Integer(Bounds::at_least(0.0)),
    looks_equivalent_number => FieldKind::Number(Bounds::at_least(0.0)),
    looks_range => FieldKind::Integer(Bounds::at_least(0.0)),
    observation_direction => FieldKind::of_enum::<ObservationDirection>(),
    pixel_spacing_azimuth => FieldKind::Number(Bounds::at_least(0.0)),
    pixel_spacing_range => FieldKind::Number(Bounds::at_least(0.0)),
    product_type => FieldKind::String,
    resolution_azimuth => FieldKind::Number(Bounds::at_least(0.0)),
    resolution_range => FieldKind::Number(Bounds::at_least(0.0)),
}
