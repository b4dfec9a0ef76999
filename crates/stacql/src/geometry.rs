//! Geometry input for spatial predicates.
//!
//! Geometries are [`geojson`] values. Anything handed to `intersects` goes
//! through [`IntoGeometry`] and is checked by [`validate`] before it is
//! stored.

use geojson::{Geometry, Position, Value};
use thiserror::Error;

/// Structural problems with a geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A position does not have two or three coordinates.
    #[error("position {position:?} must have 2 or 3 coordinates, found {found}")]
    Dimensionality { position: Vec<f64>, found: usize },

    /// A linestring or ring is too short.
    #[error("{shape} requires at least {min} positions, found {found}")]
    TooFewPositions {
        shape: &'static str,
        min: usize,
        found: usize,
    },

    /// First and last position of a polygon ring differ.
    #[error("polygon ring is not closed: first {first:?}, last {last:?}")]
    UnclosedRing { first: Vec<f64>, last: Vec<f64> },

    /// Polygon without any ring.
    #[error("polygon has no exterior ring")]
    EmptyPolygon,

    /// Input was not a GeoJSON geometry object.
    #[error("not a GeoJSON geometry: {0}")]
    Parse(String),
}

/// Conversion into a validated [`Geometry`].
pub trait IntoGeometry {
    fn into_geometry(self) -> Result<Geometry, GeometryError>;
}

impl IntoGeometry for Geometry {
    fn into_geometry(self) -> Result<Geometry, GeometryError> {
        validate(&self.value)?;
        Ok(self)
    }
}

impl IntoGeometry for Value {
    fn into_geometry(self) -> Result<Geometry, GeometryError> {
        Geometry::new(self).into_geometry()
    }
}

impl IntoGeometry for serde_json::Value {
    fn into_geometry(self) -> Result<Geometry, GeometryError> {
        let geometry: Geometry =
            serde_json::from_value(self).map_err(|e| GeometryError::Parse(e.to_string()))?;
        geometry.into_geometry()
    }
}

impl IntoGeometry for &serde_json::Value {
    fn into_geometry(self) -> Result<Geometry, GeometryError> {
        self.clone().into_geometry()
    }
}

/// Checks coordinate arity, minimum lengths and ring closure.
pub fn validate(value: &Value) -> Result<(), GeometryError> {
    match value {
        Value::Point(position) => check_position(position),
        Value::MultiPoint(positions) => positions.iter().try_for_each(|p| check_position(p)),
        Value::LineString(line) => check_line(line),
        Value::MultiLineString(lines) => lines.iter().try_for_each(|l| check_line(l)),
        Value::Polygon(rings) => check_polygon(rings),
        Value::MultiPolygon(polygons) => polygons.iter().try_for_each(|p| check_polygon(p)),
        Value::GeometryCollection(members) => {
            members.iter().try_for_each(|g| validate(&g.value))
        }
    }
}

fn check_position(position: &Position) -> Result<(), GeometryError> {
    match position.len() {
        2 | 3 => Ok(()),
        found => Err(GeometryError::Dimensionality {
            position: position.clone(),
            found,
        }),
    }
}

fn check_line(line: &[Position]) -> Result<(), GeometryError> {
    if line.len() < 2 {
        return Err(GeometryError::TooFewPositions {
            shape: "linestring",
            min: 2,
            found: line.len(),
        });
    }
    line.iter().try_for_each(|p| check_position(p))
}

fn check_polygon(rings: &[Vec<Position>]) -> Result<(), GeometryError> {
    if rings.is_empty() {
        return Err(GeometryError::EmptyPolygon);
    }
    for ring in rings {
        if ring.len() < 4 {
            return Err(GeometryError::TooFewPositions {
                shape: "polygon ring",
                min: 4,
                found: ring.len(),
            });
        }
        ring.iter().try_for_each(|p| check_position(p))?;
        let (first, last) = (&ring[0], &ring[ring.len() - 1]);
        if first != last {
            return Err(GeometryError::UnclosedRing {
                first: first.clone(),
                last: last.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Vec<Vec<Position>> {
        vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]]
    }

    #[test]
    fn accepts_closed_polygon() {
        assert!(Value::Polygon(square()).into_geometry().is_ok());
    }

    #[test]
    fn rejects_open_ring() {
        let mut rings = square();
        rings[0].pop();
        rings[0].push(vec![0.5, 0.5]);
        let err = Value::Polygon(rings).into_geometry().unwrap_err();
        assert!(matches!(err, GeometryError::UnclosedRing { .. }));
    }

    #[test]
    fn rejects_short_ring() {
        let rings = vec![vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]]];
        let err = Value::Polygon(rings).into_geometry().unwrap_err();
        assert!(matches!(
            err,
            GeometryError::TooFewPositions { min: 4, found: 3, .. }
        ));
    }

    #[test]
    fn rejects_bad_dimensionality() {
        let err = Value::Point(vec![1.0]).into_geometry().unwrap_err();
        assert!(matches!(err, GeometryError::Dimensionality { found: 1, .. }));

        let err = Value::Point(vec![1.0, 2.0, 3.0, 4.0])
            .into_geometry()
            .unwrap_err();
        assert!(matches!(err, GeometryError::Dimensionality { found: 4, .. }));
    }

    #[test]
    fn checks_nested_collections() {
        let bad_line = Geometry::new(Value::LineString(vec![vec![0.0, 0.0]]));
        let good_point = Geometry::new(Value::Point(vec![0.0, 0.0, 10.0]));
        let err = Value::GeometryCollection(vec![good_point, bad_line])
            .into_geometry()
            .unwrap_err();
        assert!(matches!(err, GeometryError::TooFewPositions { min: 2, .. }));
    }

    #[test]
    fn parses_geojson_objects() {
        let geometry = json!({"type": "Point", "coordinates": [-122.4, 37.7]})
            .into_geometry()
            .unwrap();
        assert_eq!(geometry.value, Value::Point(vec![-122.4, 37.7]));
    }

    #[test]
    fn rejects_non_geometry_json() {
        let err = json!({"type": "Banana"}).into_geometry().unwrap_err();
        assert!(matches!(err, GeometryError::Parse(_)));
    }
}
