use geometry::project_onto_route;
use model::config::{
    DETECTION_RADIUS_KM, HOTSPOT_DELAY_CAP_MINUTES, HOTSPOT_DELAY_SCALE_MINUTES,
    HOTSPOT_IMPACT_SCALE_POINTS, OFF_PEAK_HOUR_FACTOR, WEEKEND_DAY_FACTOR,
};
use model::{AffectedSegment, LocalMoment, Route, SegmentSource, TrafficHotspot};
use serde::{Deserialize, Serialize};

/// Congestion risk of one route against the static hotspot list, at the
/// given moment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HotspotImpact {
    pub hotspots: Vec<AffectedSegment>,
    /// 100 = no congestion risk.
    pub traffic_score: f64,
    pub estimated_delay_minutes: f64,
}

impl HotspotImpact {
    fn unaffected() -> Self {
        Self { hotspots: Vec::new(), traffic_score: 100.0, estimated_delay_minutes: 0.0 }
    }
}

/// Same shape as the incident analyzer, but weighted by time of day and
/// day of week. Pure in `moment`; nothing here reads the wall clock.
#[must_use]
pub fn analyze_traffic_hotspots(
    route: &Route,
    hotspots: &[TrafficHotspot],
    moment: &LocalMoment,
) -> HotspotImpact {
    if !route.has_usable_geometry() || hotspots.is_empty() {
        return HotspotImpact::unaffected();
    }

    let day_factor = if moment.is_weekend() { WEEKEND_DAY_FACTOR } else { 1.0 };

    let mut segments = Vec::new();
    let mut traffic_score = 100.0;
    let mut delay_minutes = 0.0;

    for hotspot in hotspots {
        let Some(proximity) = project_onto_route(&hotspot.coordinates, &route.geometry) else {
            continue;
        };
        if proximity.distance_km >= DETECTION_RADIUS_KM {
            continue;
        }

        let severity = hotspot.severity.clamp(0.0, 1.0);
        let proximity_factor = 1.0 - proximity.distance_km / DETECTION_RADIUS_KM;
        let hour_factor = if hotspot.is_peak(moment.hour) { 1.0 } else { OFF_PEAK_HOUR_FACTOR };

        let weight = severity * proximity_factor * hour_factor * day_factor;
        let impact_points = weight * HOTSPOT_IMPACT_SCALE_POINTS;
        let delay = (weight * HOTSPOT_DELAY_SCALE_MINUTES).min(HOTSPOT_DELAY_CAP_MINUTES);

        traffic_score -= impact_points;
        delay_minutes += delay;

        segments.push(AffectedSegment {
            source: SegmentSource::Hotspot,
            distance_from_route_km: proximity.distance_km,
            impact_points,
            delay_minutes: delay,
            position_percent: proximity.position_percent,
            nearest_point: proximity.nearest_point,
        });
    }

    HotspotImpact {
        hotspots: segments,
        traffic_score: traffic_score.clamp(0.0, 100.0),
        estimated_delay_minutes: delay_minutes.round(),
    }
}
