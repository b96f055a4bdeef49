pub mod hotspots;
pub mod incident_impact;
pub mod providers;
pub mod scorer;
pub mod selector;

pub use hotspots::{analyze_traffic_hotspots, HotspotImpact};
pub use incident_impact::{analyze_incident_impact, IncidentImpact};
pub use providers::{IncidentStore, RoutingProvider};
pub use scorer::{score_route, score_routes};
pub use selector::{rank_routes, select_best, RoutePlanner};
