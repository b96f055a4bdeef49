use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::incident::IncidentKind;
use crate::route::{GeoPoint, Route};

/// Short labels attached to a scored route. The UI renders the display
/// strings directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RouteLabel {
    #[strum(serialize = "few or no incidents")]
    FewIncidents,
    #[strum(serialize = "smooth traffic")]
    SmoothTraffic,
    #[strum(serialize = "fastest")]
    Fastest,
    #[strum(serialize = "incidents reported")]
    IncidentsReported,
    #[strum(serialize = "dense traffic")]
    DenseTraffic,
    #[strum(serialize = "longer route")]
    LongerRoute,
}

/// What produced an affected segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SegmentSource {
    Incident { id: String, kind: IncidentKind },
    Hotspot,
}

/// One (incident or hotspot) x (route) pairing within the detection radius.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffectedSegment {
    pub source: SegmentSource,
    pub distance_from_route_km: f64,
    /// 0-30 points removed from the component score.
    pub impact_points: f64,
    pub delay_minutes: f64,
    /// 0-100, how far along the route the nearest point sits. Used for UI
    /// ordering but computed here.
    pub position_percent: f64,
    pub nearest_point: GeoPoint,
}

/// A candidate route annotated with everything the selector and the UI
/// need: component scores, delay estimate, labels and the recommended flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalysis {
    pub route: Route,
    /// Composite ranking score, 0-100.
    pub score: f64,
    /// 100 = no incident impact.
    pub incident_impact_score: f64,
    /// 100 = no congestion risk.
    pub traffic_impact_score: f64,
    pub estimated_delay_seconds: f64,
    pub estimated_duration_seconds: f64,
    pub estimated_arrival: DateTime<Utc>,
    pub affected_segments: Vec<AffectedSegment>,
    pub strengths: Vec<RouteLabel>,
    pub weaknesses: Vec<RouteLabel>,
    pub recommended: bool,
}
