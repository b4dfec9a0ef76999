//! View Geometry extension (`view:*`). All angles are in degrees.

use crate::extension::extension;
use crate::field::{Bounds, FieldKind};

extension! {
    /// Fields of the View Geometry extension.
    handle View, accessor view,
    prefix "view", title "STAC View Geometry Extension for STAC Items and STAC Collections";
    azimuth => FieldKind::Number(Bounds::between(0.0, 360.0)),
    incidence_angle => FieldKind::Number(Bounds::between(0.0, 90.0)),
    off_nadir => FieldKind::Number(Bounds::between(0.0, 90.0)),
    sun_azimuth => FieldKind::Number(Bounds::between(0.0, 360.0)),
    sun_elevation => FieldKind::Number(Bounds::between(-90.0, 90.0)),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_elevation_allows_negative_angles() {
        let field = &spec().fields()[Member::sun_elevation as usize];
        assert!(field.kind().bounds().unwrap().check(field.name(), -45.0).is_ok());
        assert!(field.kind().bounds().unwrap().check(field.name(), -91.0).is_err());
    }
}
