use geo::{HaversineDistance, HaversineLength};
use model::GeoPoint;

use crate::{to_line_string, to_point, KM_PER_DEGREE};

/// Result of projecting a point onto a route polyline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteProximity {
    pub distance_km: f64,
    pub nearest_point: GeoPoint,
    /// 0-100 along the route, measured by cumulative haversine length.
    pub position_percent: f64,
}

/// Total polyline length in kilometers. Zero for degenerate geometry.
#[must_use]
pub fn route_length_km(geometry: &[GeoPoint]) -> f64 {
    if geometry.len() < 2 {
        return 0.0;
    }
    to_line_string(geometry).haversine_length() / 1000.0
}

/// Nearest point on the polyline, its haversine distance and its position
/// along the route. `None` when the polyline has fewer than two points.
#[must_use]
pub fn project_onto_route(point: &GeoPoint, geometry: &[GeoPoint]) -> Option<RouteProximity> {
    if geometry.len() < 2 {
        return None;
    }

    let target = to_point(point);
    let mut best: Option<(f64, GeoPoint, f64)> = None;
    let mut traversed_km = 0.0;

    for pair in geometry.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let segment_km = to_point(&a).haversine_distance(&to_point(&b)) / 1000.0;

        let (candidate, along) = project_onto_segment(point, &a, &b);
        let distance_km = target.haversine_distance(&to_point(&candidate)) / 1000.0;
        let along_route_km = traversed_km + along * segment_km;

        if best.map_or(true, |(d, _, _)| distance_km < d) {
            best = Some((distance_km, candidate, along_route_km));
        }

        traversed_km += segment_km;
    }

    let (distance_km, nearest_point, along_km) = best?;
    let position_percent = if traversed_km > 0.0 {
        (along_km / traversed_km * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    Some(RouteProximity { distance_km, nearest_point, position_percent })
}

/// Shorthand when only the distance matters.
#[must_use]
pub fn distance_to_route_km(point: &GeoPoint, geometry: &[GeoPoint]) -> Option<f64> {
    project_onto_route(point, geometry).map(|p| p.distance_km)
}

/// Projects onto one segment in a local flat frame. Returns the clamped
/// interpolated point and the parameter t in [0, 1].
fn project_onto_segment(point: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> (GeoPoint, f64) {
    let lat_scale = KM_PER_DEGREE;
    let lon_scale = KM_PER_DEGREE * (a.lat.to_radians().cos()).abs().max(0.01);

    let ax = 0.0;
    let ay = 0.0;
    let bx = (b.lon - a.lon) * lon_scale;
    let by = (b.lat - a.lat) * lat_scale;
    let px = (point.lon - a.lon) * lon_scale;
    let py = (point.lat - a.lat) * lat_scale;

    let seg_len_sq = (bx - ax).powi(2) + (by - ay).powi(2);
    let t = if seg_len_sq > 0.0 {
        (((px - ax) * (bx - ax) + (py - ay) * (by - ay)) / seg_len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let nearest = GeoPoint::new(a.lon + (b.lon - a.lon) * t, a.lat + (b.lat - a.lat) * t);
    (nearest, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 km along the equator.
    fn equator_route() -> Vec<GeoPoint> {
        vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0 / KM_PER_DEGREE, 0.0)]
    }

    #[test]
    fn length_of_known_route() {
        let len = route_length_km(&equator_route());
        assert!((len - 10.0).abs() < 0.01, "length was {len}");
    }

    #[test]
    fn degenerate_geometry_has_no_projection() {
        assert!(project_onto_route(&GeoPoint::new(0.0, 0.0), &[]).is_none());
        assert!(project_onto_route(&GeoPoint::new(0.0, 0.0), &[GeoPoint::new(1.0, 1.0)]).is_none());
        assert_eq!(route_length_km(&[GeoPoint::new(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn perpendicular_offset_distance() {
        let route = equator_route();
        // 0.25 km north of the midpoint.
        let point = GeoPoint::new(5.0 / KM_PER_DEGREE, 0.25 / KM_PER_DEGREE);
        let proximity = project_onto_route(&point, &route).unwrap();

        assert!((proximity.distance_km - 0.25).abs() < 0.005);
        assert!((proximity.position_percent - 50.0).abs() < 1.0);
        assert!((proximity.nearest_point.lat).abs() < 1e-9);
    }

    #[test]
    fn point_beyond_endpoint_clamps_to_vertex() {
        let route = equator_route();
        let point = GeoPoint::new(-1.0 / KM_PER_DEGREE, 0.0);
        let proximity = project_onto_route(&point, &route).unwrap();

        assert!((proximity.distance_km - 1.0).abs() < 0.01);
        assert!((proximity.position_percent).abs() < 1e-9);
    }
}
