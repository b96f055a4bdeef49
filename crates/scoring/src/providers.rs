use async_trait::async_trait;
use model::{EngineError, GeoBounds, Incident, Route, RouteRequest};

/// External routing service. Must fail with `EngineError::NoRouteFound`
/// when it has no candidates; the planner propagates that unchanged.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn fetch_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, EngineError>;
}

/// External incident service. An empty result is normal; a transport
/// failure is downgraded to an empty set by the callers (fail-open for
/// scoring, never for route presentation).
#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn incidents_in_area(&self, bounds: &GeoBounds) -> Result<Vec<Incident>, EngineError>;
}
