use crate::models::restaurant::Location;

/// Approximate miles per degree of latitude/longitude at the dataset's
/// latitude. Used for the flat-Earth bounding-box search; only reasonable
/// for small radii.
pub const MILES_PER_DEGREE: f64 = 69.0;

pub fn miles_to_degrees(miles: f64) -> f64 {
    miles / MILES_PER_DEGREE
}

/// Rectangular longitude/latitude range standing in for "within radius".
/// Isolated here so the approximation can be swapped for a real geodesic
/// distance without touching the query layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn around(center: Location, radius_miles: f64) -> Self {
        let delta = miles_to_degrees(radius_miles);
        Self {
            west: center.longitude - delta,
            east: center.longitude + delta,
            south: center.latitude - delta,
            north: center.latitude + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miles_to_degrees() {
        assert_eq!(miles_to_degrees(69.0), 1.0);
        assert_eq!(miles_to_degrees(0.0), 0.0);
        assert!((miles_to_degrees(3.0) - 3.0 / 69.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box_around() {
        let center = Location {
            longitude: -79.64,
            latitude: 43.59,
        };
        let bb = BoundingBox::around(center, 3.0);
        let delta = 3.0 / 69.0;
        assert!((bb.west - (-79.64 - delta)).abs() < 1e-12);
        assert!((bb.east - (-79.64 + delta)).abs() < 1e-12);
        assert!((bb.south - (43.59 - delta)).abs() < 1e-12);
        assert!((bb.north - (43.59 + delta)).abs() < 1e-12);
        assert!(bb.west < bb.east && bb.south < bb.north);
    }
}
