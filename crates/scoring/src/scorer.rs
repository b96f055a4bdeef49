use chrono::Duration;
use model::config::{
    DURATION_WEIGHT_POINTS, INCIDENT_WEIGHT_POINTS, LABEL_BAD_THRESHOLD, LABEL_GOOD_THRESHOLD,
    LONGER_ROUTE_FACTOR, TRAFFIC_WEIGHT_POINTS,
};
use model::{Incident, LocalMoment, Route, RouteAnalysis, RouteLabel, TrafficHotspot};

use crate::hotspots::analyze_traffic_hotspots;
use crate::incident_impact::analyze_incident_impact;

/// Scores every candidate against the shared incident and hotspot sets.
///
/// Analyses come back in provider order with `recommended` unset; ranking
/// is the selector's job. Pure in its inputs: identical inputs (including
/// the moment) produce identical analyses.
#[must_use]
pub fn score_routes(
    routes: &[Route],
    incidents: &[Incident],
    hotspots: &[TrafficHotspot],
    moment: &LocalMoment,
) -> Vec<RouteAnalysis> {
    let fastest = routes
        .iter()
        .map(|r| r.duration_seconds)
        .fold(f64::INFINITY, f64::min);

    routes
        .iter()
        .map(|route| score_route(route, incidents, hotspots, fastest, moment))
        .collect()
}

/// Scores one candidate. `fastest_duration_seconds` is the minimum
/// duration across the candidate set being ranked.
#[must_use]
pub fn score_route(
    route: &Route,
    incidents: &[Incident],
    hotspots: &[TrafficHotspot],
    fastest_duration_seconds: f64,
    moment: &LocalMoment,
) -> RouteAnalysis {
    let incident_impact = analyze_incident_impact(route, incidents);
    let hotspot_impact = analyze_traffic_hotspots(route, hotspots, moment);

    let score = composite_score(
        route.duration_seconds,
        fastest_duration_seconds,
        incident_impact.total_score,
        hotspot_impact.traffic_score,
    );

    let (strengths, weaknesses) = derive_labels(
        route.duration_seconds,
        fastest_duration_seconds,
        incident_impact.total_score,
        hotspot_impact.traffic_score,
    );

    let delay_seconds =
        (incident_impact.estimated_delay_minutes + hotspot_impact.estimated_delay_minutes) * 60.0;
    let estimated_duration_seconds = route.duration_seconds + delay_seconds;
    let estimated_arrival =
        moment.timestamp + Duration::seconds(estimated_duration_seconds.round() as i64);

    let mut affected_segments = incident_impact.affected_segments;
    affected_segments.extend(hotspot_impact.hotspots);

    RouteAnalysis {
        route: route.clone(),
        score,
        incident_impact_score: incident_impact.total_score,
        traffic_impact_score: hotspot_impact.traffic_score,
        estimated_delay_seconds: delay_seconds,
        estimated_duration_seconds,
        estimated_arrival,
        affected_segments,
        strengths,
        weaknesses,
        recommended: false,
    }
}

/// Fixed 30/40/30 split: a duration component that starts at 30 for the
/// fastest candidate and decays proportionally, plus the incident and
/// traffic components. Incident avoidance outweighs raw speed.
fn composite_score(
    duration_seconds: f64,
    fastest_duration_seconds: f64,
    incident_score: f64,
    traffic_score: f64,
) -> f64 {
    let duration_score = if duration_seconds > 0.0 && fastest_duration_seconds.is_finite() {
        (DURATION_WEIGHT_POINTS * fastest_duration_seconds / duration_seconds)
            .clamp(0.0, DURATION_WEIGHT_POINTS)
    } else {
        DURATION_WEIGHT_POINTS
    };

    let incident_component = incident_score / 100.0 * INCIDENT_WEIGHT_POINTS;
    let traffic_component = traffic_score / 100.0 * TRAFFIC_WEIGHT_POINTS;

    (duration_score + incident_component + traffic_component).clamp(0.0, 100.0)
}

fn derive_labels(
    duration_seconds: f64,
    fastest_duration_seconds: f64,
    incident_score: f64,
    traffic_score: f64,
) -> (Vec<RouteLabel>, Vec<RouteLabel>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if incident_score > LABEL_GOOD_THRESHOLD {
        strengths.push(RouteLabel::FewIncidents);
    }
    if traffic_score > LABEL_GOOD_THRESHOLD {
        strengths.push(RouteLabel::SmoothTraffic);
    }
    if duration_seconds <= fastest_duration_seconds + 1e-9 {
        strengths.push(RouteLabel::Fastest);
    }

    if incident_score < LABEL_BAD_THRESHOLD {
        weaknesses.push(RouteLabel::IncidentsReported);
    }
    if traffic_score < LABEL_BAD_THRESHOLD {
        weaknesses.push(RouteLabel::DenseTraffic);
    }
    if duration_seconds > fastest_duration_seconds * LONGER_ROUTE_FACTOR {
        weaknesses.push(RouteLabel::LongerRoute);
    }

    (strengths, weaknesses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc, Weekday};
    use model::incident::RawCoordinates;
    use model::{GeoPoint, IncidentKind, Votes};

    const KM_PER_DEGREE: f64 = 111.195;

    fn moment() -> LocalMoment {
        LocalMoment::fixed(8, Weekday::Tue, DateTime::<Utc>::UNIX_EPOCH)
    }

    fn straight_route(duration_seconds: f64) -> Route {
        Route {
            geometry: vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0 / KM_PER_DEGREE, 0.0)],
            distance_meters: 10_000.0,
            duration_seconds,
            legs: Vec::new(),
        }
    }

    #[test]
    fn faster_cleaner_route_outscores_slow_congested_one() {
        // A: 600 s, incident 90, traffic 90. B: 900 s, incident 40, traffic 95.
        let a = composite_score(600.0, 600.0, 90.0, 90.0);
        let b = composite_score(900.0, 600.0, 40.0, 95.0);

        assert!((a - 93.0).abs() < 1e-9);
        assert!(a > b, "a={a} b={b}");
    }

    #[test]
    fn composite_is_clamped_for_pathological_components() {
        assert!(composite_score(600.0, 600.0, 1000.0, 1000.0) <= 100.0);
        assert!(composite_score(600.0, 600.0, -500.0, -500.0) >= 0.0);
    }

    #[test]
    fn clean_fast_route_gets_strength_labels() {
        let analysis = score_route(&straight_route(600.0), &[], &[], 600.0, &moment());

        assert!(analysis.strengths.contains(&RouteLabel::FewIncidents));
        assert!(analysis.strengths.contains(&RouteLabel::SmoothTraffic));
        assert!(analysis.strengths.contains(&RouteLabel::Fastest));
        assert!(analysis.weaknesses.is_empty());
        assert!((analysis.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn slow_incident_heavy_route_gets_weakness_labels() {
        let route = straight_route(900.0);
        let incidents: Vec<Incident> = (0..2)
            .map(|i| Incident {
                id: format!("i{i}"),
                kind: IncidentKind::Closure,
                coordinates: RawCoordinates::from_point(GeoPoint::new(
                    (2.0 + f64::from(i)) / KM_PER_DEGREE,
                    0.0,
                )),
                created_at: DateTime::<Utc>::UNIX_EPOCH,
                active: true,
                votes: Votes::default(),
            })
            .collect();

        let analysis = score_route(&route, &incidents, &[], 600.0, &moment());

        // Two closures at zero distance remove 60 points.
        assert!((analysis.incident_impact_score - 40.0).abs() < 1e-9);
        assert!(analysis.weaknesses.contains(&RouteLabel::IncidentsReported));
        assert!(analysis.weaknesses.contains(&RouteLabel::LongerRoute));
        assert!(!analysis.strengths.contains(&RouteLabel::Fastest));
    }

    #[test]
    fn scoring_is_idempotent_for_a_frozen_moment() {
        let routes = vec![straight_route(600.0), straight_route(700.0)];
        let incidents = vec![Incident {
            id: "i".to_owned(),
            kind: IncidentKind::Traffic,
            coordinates: RawCoordinates::from_point(GeoPoint::new(
                5.0 / KM_PER_DEGREE,
                0.2 / KM_PER_DEGREE,
            )),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            active: true,
            votes: Votes::default(),
        }];
        let hotspots = vec![TrafficHotspot {
            coordinates: GeoPoint::new(3.0 / KM_PER_DEGREE, 0.0),
            severity: 0.6,
            peak_hours: vec![8],
        }];
        let at = moment();

        let first = score_routes(&routes, &incidents, &hotspots, &at);
        let second = score_routes(&routes, &incidents, &hotspots, &at);
        assert_eq!(first, second);
    }

    #[test]
    fn delay_extends_estimated_duration_and_arrival() {
        let route = straight_route(600.0);
        let incidents = vec![Incident {
            id: "acc".to_owned(),
            kind: IncidentKind::Closure,
            coordinates: RawCoordinates::from_point(GeoPoint::new(5.0 / KM_PER_DEGREE, 0.0)),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            active: true,
            votes: Votes::default(),
        }];

        let analysis = score_route(&route, &incidents, &[], 600.0, &moment());

        // Closure: 3 km of 10 km at factor 1.0 -> 180 s -> 3 min.
        assert_eq!(analysis.estimated_delay_seconds, 180.0);
        assert_eq!(analysis.estimated_duration_seconds, 780.0);
        assert_eq!(
            analysis.estimated_arrival,
            moment().timestamp + Duration::seconds(780),
        );
    }
}
