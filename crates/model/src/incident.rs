use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::route::GeoPoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentKind {
    Accident,
    Traffic,
    Closure,
    Police,
    Hazard,
    Other,
}

impl IncidentKind {
    /// Unknown wire strings map to `Other`, which carries the lowest weights.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "accident" => Self::Accident,
            "traffic" => Self::Traffic,
            "closure" => Self::Closure,
            "police" => Self::Police,
            "hazard" => Self::Hazard,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn impact_profile(self) -> ImpactProfile {
        match self {
            Self::Accident => ImpactProfile::new(80.0, 2000.0, 0.4),
            Self::Traffic => ImpactProfile::new(60.0, 1500.0, 0.3),
            Self::Closure => ImpactProfile::new(100.0, 3000.0, 1.0),
            Self::Police => ImpactProfile::new(40.0, 500.0, 0.2),
            Self::Hazard => ImpactProfile::new(70.0, 1000.0, 0.25),
            Self::Other => ImpactProfile::new(20.0, 500.0, 0.1),
        }
    }
}

impl From<String> for IncidentKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<IncidentKind> for String {
    fn from(kind: IncidentKind) -> Self {
        kind.to_string()
    }
}

/// Per-kind weight table used by the incident impact analyzer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImpactProfile {
    /// Raw severity before proximity scaling (0-100 scale).
    pub severity_score: f64,
    /// Length of route assumed slowed by this incident, in meters.
    pub distance_impact_meters: f64,
    /// Fraction of the affected stretch's travel time added as delay.
    pub delay_factor: f64,
}

impl ImpactProfile {
    #[must_use]
    pub const fn new(severity_score: f64, distance_impact_meters: f64, delay_factor: f64) -> Self {
        Self { severity_score, distance_impact_meters, delay_factor }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub up: u32,
    pub down: u32,
}

/// Crowd-reported incident as served by the incident store.
///
/// Reports arrive in several legacy coordinate shapes; `position()` is the
/// single place that resolves them. Everything downstream works with the
/// normalized `GeoPoint` or skips the incident.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    #[serde(flatten)]
    pub coordinates: RawCoordinates,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    #[serde(default)]
    pub votes: Votes,
}

impl Incident {
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        self.coordinates.resolve()
    }
}

/// The three coordinate encodings observed on the wire: a plain
/// `[lng, lat]` array, separate `latitude`/`longitude` fields, and a
/// nested `location.coordinates` array. All fields optional; `resolve`
/// picks the first usable one in that order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawCoordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<NestedLocation>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NestedLocation {
    pub coordinates: [f64; 2],
}

impl RawCoordinates {
    #[must_use]
    pub fn resolve(&self) -> Option<GeoPoint> {
        let candidate = if let Some([lon, lat]) = self.coordinates {
            GeoPoint::new(lon, lat)
        } else if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            GeoPoint::new(lon, lat)
        } else if let Some(nested) = &self.location {
            GeoPoint::new(nested.coordinates[0], nested.coordinates[1])
        } else {
            return None;
        };

        candidate.is_valid().then_some(candidate)
    }

    #[must_use]
    pub fn from_point(point: GeoPoint) -> Self {
        Self { coordinates: Some([point.lon, point.lat]), ..Self::default() }
    }
}
