use serde::{Deserialize, Serialize};

/// A WGS84 coordinate, longitude first to match provider polylines.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// Axis-aligned query window handed to the incident store.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBounds {
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lon >= self.min.lon
            && point.lon <= self.max.lon
            && point.lat >= self.min.lat
            && point.lat <= self.max.lat
    }
}

/// One candidate path returned by the routing provider. Immutable once
/// received; the engine annotates it via `RouteAnalysis` instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub geometry: Vec<GeoPoint>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub legs: Vec<RouteLeg>,
}

impl Route {
    /// Some providers return degenerate single-point routes for
    /// zero-distance queries; those are scored as "no impact", never an error.
    #[must_use]
    pub fn has_usable_geometry(&self) -> bool {
        self.geometry.len() >= 2
    }
}

/// Turn-by-turn step, passed through unmodified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub instruction: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    pub alternatives: bool,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub options: RouteOptions,
}
