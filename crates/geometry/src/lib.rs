//! Thin adapter between the domain types and the `geo` crate.
//!
//! Everything here works in kilometers on WGS84 coordinates. Distances are
//! haversine; segment projection uses a local equirectangular
//! approximation, which is accurate at the sub-kilometer scales the
//! detection radius operates on.

pub mod buffer;
pub mod line;

use geo::{Coord, LineString, Point};
use model::GeoPoint;

pub use buffer::{padded_bounds, route_corridor, RouteCorridor};
pub use line::{distance_to_route_km, project_onto_route, route_length_km, RouteProximity};

/// Kilometers per degree of latitude on the mean-radius sphere `geo` uses
/// for haversine math.
pub(crate) const KM_PER_DEGREE: f64 = 111.195;

pub(crate) fn to_point(p: &GeoPoint) -> Point<f64> {
    Point::new(p.lon, p.lat)
}

pub(crate) fn to_line_string(points: &[GeoPoint]) -> LineString<f64> {
    LineString::from(
        points.iter().map(|p| Coord { x: p.lon, y: p.lat }).collect::<Vec<_>>(),
    )
}
