use geometry::project_onto_route;
use model::config::{DETECTION_RADIUS_KM, MAX_INCIDENT_IMPACT_POINTS};
use model::{AffectedSegment, EngineError, Incident, Route, SegmentSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How much a set of incidents degrades one route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentImpact {
    pub affected_segments: Vec<AffectedSegment>,
    /// 100 = unaffected, 0 = fully degraded.
    pub total_score: f64,
    pub estimated_delay_minutes: f64,
}

impl IncidentImpact {
    fn unaffected() -> Self {
        Self { affected_segments: Vec::new(), total_score: 100.0, estimated_delay_minutes: 0.0 }
    }
}

/// Scores a route against live incidents.
///
/// Never fails: degenerate routes score as unaffected, inactive incidents
/// and incidents without resolvable coordinates are skipped, and the
/// result is clamped to [0, 100] whatever the inputs.
#[must_use]
pub fn analyze_incident_impact(route: &Route, incidents: &[Incident]) -> IncidentImpact {
    if !route.has_usable_geometry() {
        if !incidents.is_empty() {
            debug!("scoring as unaffected: {}", EngineError::MalformedRoute);
        }
        return IncidentImpact::unaffected();
    }
    if incidents.is_empty() {
        return IncidentImpact::unaffected();
    }

    let route_length_km = geometry::route_length_km(&route.geometry);
    if route_length_km <= 0.0 {
        return IncidentImpact::unaffected();
    }

    let mut segments = Vec::new();
    let mut total_score = 100.0;
    let mut delay_minutes = 0.0;

    for incident in incidents {
        if !incident.active {
            continue;
        }

        let Some(position) = incident.position() else {
            debug!(
                "skipping incident: {}",
                EngineError::InvalidIncidentGeometry { id: incident.id.clone() }
            );
            continue;
        };

        let Some(proximity) = project_onto_route(&position, &route.geometry) else {
            continue;
        };

        if proximity.distance_km >= DETECTION_RADIUS_KM {
            continue;
        }

        let profile = incident.kind.impact_profile();
        let proximity_factor = 1.0 - proximity.distance_km / DETECTION_RADIUS_KM;

        let impact_points =
            (profile.severity_score * proximity_factor).min(MAX_INCIDENT_IMPACT_POINTS);
        total_score -= impact_points;

        let segment_km = (profile.distance_impact_meters / 1000.0).min(route_length_km);
        let delay = route.duration_seconds * (segment_km / route_length_km) * profile.delay_factor
            / 60.0;
        delay_minutes += delay;

        segments.push(AffectedSegment {
            source: SegmentSource::Incident { id: incident.id.clone(), kind: incident.kind },
            distance_from_route_km: proximity.distance_km,
            impact_points,
            delay_minutes: delay,
            position_percent: proximity.position_percent,
            nearest_point: proximity.nearest_point,
        });
    }

    IncidentImpact {
        affected_segments: segments,
        total_score: total_score.clamp(0.0, 100.0),
        estimated_delay_minutes: delay_minutes.round(),
    }
}
