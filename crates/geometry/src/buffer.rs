use geo::{BoundingRect, Contains, Coord, LineString, Polygon};
use model::{GeoBounds, GeoPoint};

use crate::{to_point, KM_PER_DEGREE};

/// Buffer polygon around a route plus its bounding box. The box is what
/// goes to the incident store; the polygon is the coarse containment
/// filter applied to what comes back.
#[derive(Clone, Debug)]
pub struct RouteCorridor {
    polygon: Polygon<f64>,
    pub bounds: GeoBounds,
}

impl RouteCorridor {
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.polygon.contains(&to_point(point))
    }
}

/// Buffers the route into a corridor of the given half-width. `None` for
/// degenerate geometry.
///
/// Offsets are computed per vertex from the adjacent segment directions in
/// a local flat frame; no end caps. Good enough for a containment
/// pre-filter ahead of the exact distance check.
#[must_use]
pub fn route_corridor(geometry: &[GeoPoint], width_km: f64) -> Option<RouteCorridor> {
    if geometry.len() < 2 || width_km <= 0.0 {
        return None;
    }

    let lat_scale = KM_PER_DEGREE;
    let mut left: Vec<Coord<f64>> = Vec::with_capacity(geometry.len());
    let mut right: Vec<Coord<f64>> = Vec::with_capacity(geometry.len());

    for (i, vertex) in geometry.iter().enumerate() {
        let lon_scale = KM_PER_DEGREE * vertex.lat.to_radians().cos().abs().max(0.01);

        // Direction at a vertex: the adjacent segment (first/last) or the
        // mean of both neighbors.
        let (prev, next) = match i {
            0 => (geometry[0], geometry[1]),
            _ if i == geometry.len() - 1 => (geometry[i - 1], geometry[i]),
            _ => (geometry[i - 1], geometry[i + 1]),
        };

        let dx = (next.lon - prev.lon) * lon_scale;
        let dy = (next.lat - prev.lat) * lat_scale;
        let len = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 1.0) };

        let lon_offset = nx * width_km / lon_scale;
        let lat_offset = ny * width_km / lat_scale;

        left.push(Coord { x: vertex.lon + lon_offset, y: vertex.lat + lat_offset });
        right.push(Coord { x: vertex.lon - lon_offset, y: vertex.lat - lat_offset });
    }

    right.reverse();
    left.extend(right);
    let polygon = Polygon::new(LineString::from(left), Vec::new());

    let rect = polygon.bounding_rect()?;
    let bounds = GeoBounds {
        min: GeoPoint::new(rect.min().x, rect.min().y),
        max: GeoPoint::new(rect.max().x, rect.max().y),
    };

    Some(RouteCorridor { polygon, bounds })
}

/// Bounding box around a point set, padded outward by `padding_km`.
/// `None` when the set is empty.
#[must_use]
pub fn padded_bounds<'a, I>(points: I, padding_km: f64) -> Option<GeoBounds>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let (mut min_lon, mut max_lon) = (first.lon, first.lon);
    let (mut min_lat, mut max_lat) = (first.lat, first.lat);

    for p in iter {
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
    }

    let lat_pad = padding_km / KM_PER_DEGREE;
    let mid_lat = (min_lat + max_lat) / 2.0;
    let lon_pad = padding_km / (KM_PER_DEGREE * mid_lat.to_radians().cos().abs().max(0.01));

    Some(GeoBounds {
        min: GeoPoint::new(min_lon - lon_pad, min_lat - lat_pad),
        max: GeoPoint::new(max_lon + lon_pad, max_lat + lat_pad),
    })
}
