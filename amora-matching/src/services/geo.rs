//! Great-circle distance and the rectangular pre-filter used by the
//! suggestion query.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Latitude/longitude rectangle enclosing a circle of `radius_km` around a
/// point. Cheap approximation of the search radius; exact filtering happens
/// on the haversine distance afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = (radius_km / EARTH_RADIUS_KM).to_degrees();
    // Longitude degrees shrink with latitude; guard the cos near the poles.
    let lng_scale = lat.to_radians().cos().abs().max(1e-6);
    let lng_delta = (radius_km / (EARTH_RADIUS_KM * lng_scale)).to_degrees();

    BoundingBox {
        min_lat: (lat - lat_delta).max(-90.0),
        max_lat: (lat + lat_delta).min(90.0),
        min_lng: lng - lng_delta,
        max_lng: lng + lng_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert!(haversine_km(48.85, 2.35, 48.85, 2.35) < 1e-9);
    }

    #[test]
    fn paris_to_london() {
        // Notre-Dame to Big Ben, roughly 341 km.
        let km = haversine_km(48.853, 2.3499, 51.5007, -0.1246);
        assert!((km - 341.0).abs() < 5.0, "got {km}");
    }

    #[test]
    fn box_encloses_radius() {
        let bb = bounding_box(48.85, 2.35, 100.0);
        // Points 100 km due north/south/east/west all land inside the box.
        for bearing_deg in [0.0_f64, 90.0, 180.0, 270.0] {
            let b = bearing_deg.to_radians();
            let d = 100.0 / EARTH_RADIUS_KM;
            let lat1 = 48.85_f64.to_radians();
            let lng1 = 2.35_f64.to_radians();
            let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * b.cos()).asin();
            let lng2 = lng1
                + (b.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
            let (lat2, lng2) = (lat2.to_degrees(), lng2.to_degrees());
            assert!(lat2 >= bb.min_lat - 1e-6 && lat2 <= bb.max_lat + 1e-6);
            assert!(lng2 >= bb.min_lng - 1e-6 && lng2 <= bb.max_lng + 1e-6);
        }
    }

    #[test]
    fn box_is_clamped_at_the_poles() {
        let bb = bounding_box(89.9, 0.0, 500.0);
        assert!(bb.max_lat <= 90.0);
    }
}
