use std::collections::HashSet;
use std::sync::Arc;

use geometry::{distance_to_route_km, padded_bounds};
use model::config::{AVOIDANCE_BONUS_POINTS, DETECTION_RADIUS_KM, ROUTE_BUFFER_KM};
use model::{EngineError, Incident, LocalMoment, RouteAnalysis, RouteRequest, TrafficHotspot};
use tracing::{debug, warn};

use crate::providers::{IncidentStore, RoutingProvider};
use crate::scorer::score_routes;

/// Sorts by descending score, ties by ascending duration, further ties by
/// provider order, and marks exactly the top entry as recommended.
/// Touches only the annotation fields, never the underlying routes.
pub fn rank_routes(analyses: &mut [RouteAnalysis]) {
    analyses.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.route.duration_seconds.total_cmp(&b.route.duration_seconds))
    });

    for (i, analysis) in analyses.iter_mut().enumerate() {
        analysis.recommended = i == 0;
    }
}

/// The single recommended route of a ranked set.
#[must_use]
pub fn select_best(analyses: &[RouteAnalysis]) -> Option<&RouteAnalysis> {
    analyses.iter().find(|a| a.recommended).or_else(|| analyses.first())
}

/// Consolidated route calculation: candidate fetch, incident fetch,
/// scoring, avoidance bonus and ranking in one place.
pub struct RoutePlanner {
    provider: Arc<dyn RoutingProvider>,
    store: Arc<dyn IncidentStore>,
    hotspots: Vec<TrafficHotspot>,
}

impl RoutePlanner {
    #[must_use]
    pub fn new(
        provider: Arc<dyn RoutingProvider>,
        store: Arc<dyn IncidentStore>,
        hotspots: Vec<TrafficHotspot>,
    ) -> Self {
        Self { provider, store, hotspots }
    }

    #[must_use]
    pub fn hotspots(&self) -> &[TrafficHotspot] {
        &self.hotspots
    }

    /// Fetches and ranks candidates for a request.
    ///
    /// # Errors
    ///
    /// `NoRouteFound` when the provider has no candidates. An unreachable
    /// incident store degrades to an empty incident set instead.
    pub async fn calculate_routes(
        &self,
        request: &RouteRequest,
        moment: &LocalMoment,
    ) -> Result<Vec<RouteAnalysis>, EngineError> {
        self.plan(request, &[], moment).await
    }

    /// Recomputes candidates while steering around specific incidents.
    ///
    /// The incidents to avoid are merged into the scored set even when the
    /// area query did not return them (e.g. a report the user just filed),
    /// and candidates that already clear every one of them by more than
    /// half the detection radius get a flat bonus. The full ranked list is
    /// always returned, improvement or not.
    ///
    /// # Errors
    ///
    /// `NoRouteFound` when the provider has no candidates.
    pub async fn recalculate_with_avoidance(
        &self,
        request: &RouteRequest,
        incidents_to_avoid: &[Incident],
        moment: &LocalMoment,
    ) -> Result<Vec<RouteAnalysis>, EngineError> {
        self.plan(request, incidents_to_avoid, moment).await
    }

    async fn plan(
        &self,
        request: &RouteRequest,
        incidents_to_avoid: &[Incident],
        moment: &LocalMoment,
    ) -> Result<Vec<RouteAnalysis>, EngineError> {
        let routes = self.provider.fetch_routes(request).await?;
        if routes.is_empty() {
            return Err(EngineError::NoRouteFound);
        }

        let mut incidents = match padded_bounds(
            routes.iter().flat_map(|r| r.geometry.iter()),
            ROUTE_BUFFER_KM,
        ) {
            Some(bounds) => match self.store.incidents_in_area(&bounds).await {
                Ok(incidents) => incidents,
                Err(e) => {
                    warn!("incident fetch failed, scoring without incidents: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let known: HashSet<String> = incidents.iter().map(|i| i.id.clone()).collect();
        for incident in incidents_to_avoid {
            if !known.contains(&incident.id) {
                incidents.push(incident.clone());
            }
        }

        let mut analyses = score_routes(&routes, &incidents, &self.hotspots, moment);
        if !incidents_to_avoid.is_empty() {
            apply_avoidance_bonus(&mut analyses, incidents_to_avoid);
        }

        rank_routes(&mut analyses);
        Ok(analyses)
    }
}

/// Candidates whose geometry clears every avoided incident by more than
/// half the detection radius already steer around the trouble; push them
/// up the ranking.
fn apply_avoidance_bonus(analyses: &mut [RouteAnalysis], incidents_to_avoid: &[Incident]) {
    let clearance_km = DETECTION_RADIUS_KM / 2.0;

    for analysis in analyses.iter_mut() {
        let clears_all = incidents_to_avoid.iter().all(|incident| {
            let Some(position) = incident.position() else {
                return true;
            };
            distance_to_route_km(&position, &analysis.route.geometry)
                .map_or(true, |d| d > clearance_km)
        });

        if clears_all {
            debug!("avoidance bonus applied");
            analysis.score = (analysis.score + AVOIDANCE_BONUS_POINTS).min(100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc, Weekday};
    use model::incident::RawCoordinates;
    use model::{GeoBounds, GeoPoint, IncidentKind, Route, RouteOptions, Votes};

    const KM_PER_DEGREE: f64 = 111.195;

    fn moment() -> LocalMoment {
        LocalMoment::fixed(8, Weekday::Tue, DateTime::<Utc>::UNIX_EPOCH)
    }

    fn route(lat_offset_km: f64, duration_seconds: f64) -> Route {
        let lat = lat_offset_km / KM_PER_DEGREE;
        Route {
            geometry: vec![
                GeoPoint::new(0.0, lat),
                GeoPoint::new(10.0 / KM_PER_DEGREE, lat),
            ],
            distance_meters: 10_000.0,
            duration_seconds,
            legs: Vec::new(),
        }
    }

    fn incident_at(id: &str, point: GeoPoint) -> Incident {
        Incident {
            id: id.to_owned(),
            kind: IncidentKind::Accident,
            coordinates: RawCoordinates::from_point(point),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            active: true,
            votes: Votes::default(),
        }
    }

    fn request() -> RouteRequest {
        RouteRequest {
            origin: GeoPoint::new(0.0, 0.0),
            destination: GeoPoint::new(10.0 / KM_PER_DEGREE, 0.0),
            options: RouteOptions { alternatives: true, ..RouteOptions::default() },
        }
    }

    struct FixedProvider {
        routes: Vec<Route>,
    }

    #[async_trait]
    impl RoutingProvider for FixedProvider {
        async fn fetch_routes(&self, _request: &RouteRequest) -> Result<Vec<Route>, EngineError> {
            if self.routes.is_empty() {
                return Err(EngineError::NoRouteFound);
            }
            Ok(self.routes.clone())
        }
    }

    struct FixedStore {
        incidents: Vec<Incident>,
        fail: bool,
    }

    #[async_trait]
    impl IncidentStore for FixedStore {
        async fn incidents_in_area(
            &self,
            _bounds: &GeoBounds,
        ) -> Result<Vec<Incident>, EngineError> {
            if self.fail {
                return Err(EngineError::IncidentFetchFailed("connection refused".into()));
            }
            Ok(self.incidents.clone())
        }
    }

    fn planner(routes: Vec<Route>, incidents: Vec<Incident>, fail: bool) -> RoutePlanner {
        RoutePlanner::new(
            Arc::new(FixedProvider { routes }),
            Arc::new(FixedStore { incidents, fail }),
            Vec::new(),
        )
    }

    fn analysis_with_score(score: f64, duration_seconds: f64) -> RouteAnalysis {
        let mut a = crate::scorer::score_route(
            &route(0.0, duration_seconds),
            &[],
            &[],
            duration_seconds,
            &moment(),
        );
        a.score = score;
        a
    }

    #[test]
    fn ranking_marks_exactly_one_recommended() {
        let mut analyses = vec![
            analysis_with_score(50.0, 600.0),
            analysis_with_score(90.0, 700.0),
            analysis_with_score(70.0, 650.0),
        ];
        rank_routes(&mut analyses);

        assert_eq!(analyses.iter().filter(|a| a.recommended).count(), 1);
        assert!((analyses[0].score - 90.0).abs() < 1e-9);
        assert!(analyses[0].recommended);
        assert_eq!(select_best(&analyses).unwrap().score, 90.0);
    }

    #[test]
    fn equal_scores_break_ties_by_duration_then_provider_order() {
        let mut analyses = vec![
            analysis_with_score(80.0, 700.0),
            analysis_with_score(80.0, 600.0),
            analysis_with_score(80.0, 600.0),
        ];
        // Tag the first 600 s entry so provider order is observable.
        analyses[1].route.distance_meters = 9_999.0;
        rank_routes(&mut analyses);

        // The 600 s entries win; the first of them (provider order) leads.
        assert_eq!(analyses[0].route.duration_seconds, 600.0);
        assert_eq!(analyses[0].route.distance_meters, 9_999.0);
        assert_eq!(analyses[2].route.duration_seconds, 700.0);
    }

    #[test]
    fn ranking_does_not_touch_route_fields() {
        let original = route(0.0, 600.0);
        let mut analyses =
            vec![analysis_with_score(10.0, 600.0), analysis_with_score(95.0, 900.0)];
        rank_routes(&mut analyses);

        let ranked = analyses.iter().find(|a| a.route.duration_seconds == 600.0).unwrap();
        assert_eq!(ranked.route, original);
    }

    #[tokio::test]
    async fn empty_provider_result_surfaces_no_route_found() {
        let planner = planner(Vec::new(), Vec::new(), false);
        let result = planner.calculate_routes(&request(), &moment()).await;
        assert!(matches!(result, Err(EngineError::NoRouteFound)));
    }

    #[tokio::test]
    async fn store_failure_degrades_to_unaffected_scores() {
        let planner = planner(vec![route(0.0, 600.0)], Vec::new(), true);
        let analyses = planner.calculate_routes(&request(), &moment()).await.unwrap();

        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].incident_impact_score, 100.0);
        assert!(analyses[0].recommended);
    }

    #[tokio::test]
    async fn avoidance_bonus_prefers_the_clearing_candidate() {
        // Two parallel routes, same duration. The incident to avoid sits on
        // route A; route B runs 1 km away and clears it.
        let a = route(0.0, 600.0);
        let b = route(1.0, 600.0);
        let blocker = incident_at("filed-by-user", GeoPoint::new(5.0 / KM_PER_DEGREE, 0.0));

        let planner = planner(vec![a, b], Vec::new(), false);
        let analyses = planner
            .recalculate_with_avoidance(&request(), &[blocker], &moment())
            .await
            .unwrap();

        assert_eq!(analyses.len(), 2);
        let best = select_best(&analyses).unwrap();
        assert!((best.route.geometry[0].lat - 1.0 / KM_PER_DEGREE).abs() < 1e-12);
        assert!(best.score > analyses[1].score);
        // The avoided incident was merged into scoring even though the
        // store never returned it.
        assert!(analyses[1].incident_impact_score < 100.0);
    }

    #[tokio::test]
    async fn no_better_alternative_still_returns_the_full_ranked_list() {
        // Every candidate passes within the clearance distance of the
        // incident; nobody gets the bonus, the list still comes back ranked.
        let a = route(0.0, 600.0);
        let b = route(0.1, 700.0);
        let blocker = incident_at("stuck", GeoPoint::new(5.0 / KM_PER_DEGREE, 0.0));

        let planner = planner(vec![a, b], Vec::new(), false);
        let analyses = planner
            .recalculate_with_avoidance(&request(), &[blocker], &moment())
            .await
            .unwrap();

        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses.iter().filter(|x| x.recommended).count(), 1);
    }
}
